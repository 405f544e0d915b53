use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Everything that can go wrong between loading a source and writing a report.
///
/// `MissingData` and `MissingAsset` are soft: components absorb them and turn
/// them into a [`Notice`]. `SourceLoad` and `ExportWrite` are hard and reach
/// the shell, which halts only the current operation.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("insufficient data: {0}")]
    MissingData(String),

    #[error("asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    #[error("cannot load {}: {source:#}", path.display())]
    SourceLoad {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    /// Soft errors degrade the pipeline instead of stopping it.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            DashboardError::MissingData(_) | DashboardError::MissingAsset(_)
        )
    }

    pub fn to_notice(&self) -> Notice {
        if self.is_soft() {
            Notice::warning(self.to_string())
        } else {
            Notice::error(self.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Notice – user-visible message produced by a soft (or reported hard) error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}
