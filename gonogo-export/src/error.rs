use std::path::PathBuf;

use thiserror::Error;

/// Errors from the two export sinks.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write data file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected with status {0}")]
    UploadStatus(reqwest::StatusCode),
}
