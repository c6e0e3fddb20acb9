//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use vocab_core::model::SessionStateError;

/// Errors emitted while turning source files into entries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("could not parse {format} input: {reason}")]
    Parse {
        format: &'static str,
        reason: String,
    },
    #[error("unsupported source: {0}")]
    UnsupportedFormat(String),
    #[error("archive has no collection database")]
    MissingCollection,
    #[error("no valid entries found")]
    Empty,
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ImportError {
    pub(crate) fn parse(format: &'static str, reason: impl ToString) -> Self {
        Self::Parse {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Errors emitted while reading the bundled collection manifest.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestError {
    #[error("invalid manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    #[error("collection {collection} has no run {run}")]
    UnknownRun { collection: String, run: String },
    #[error("archive collection {0} has no file name")]
    MissingFileName(String),
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    State(#[from] SessionStateError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
