/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / .db
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordStore (normalized columns)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ RecordStore  │  Vec<Record>, column list
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  cascade dimension choices → filtered indices
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
