//! Football statistics dashboard: load a table of player records, narrow it
//! with cascading dropdowns, chart field groups and export a PDF report.
//!
//! ```text
//!  loader → RecordStore → filter::cascade → chart::compute_charts
//!                                               │
//!                         chart::write_artifacts → report::export → PDF
//! ```

pub mod cache;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod photo;
pub mod report;
pub mod session;
pub mod state;
