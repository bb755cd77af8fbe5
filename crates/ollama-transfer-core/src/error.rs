//! Error types for Ollama model transfer.
//!
//! Every fatal condition of an export or import maps to one variant here.
//! A declined overwrite prompt is not an error; see [`crate::TransferOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for export and import operations.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Malformed command-line input, e.g. a model spec without `:`.
    #[error("Usage error: {message}")]
    Usage { message: String },

    /// A required manifest or archive file is absent.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// One or more blobs referenced by a manifest are absent.
    #[error("{} blob file(s) missing: {}", .paths.len(), display_paths(.paths))]
    MissingBlobs { paths: Vec<PathBuf> },

    #[error("Failed to parse manifest {path:?}: {message}")]
    Parse {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The unpacked archive does not have the expected store layout.
    #[error("Unexpected archive layout: {message}")]
    Structural { message: String },

    #[error("Digest mismatch for {path:?}: expected {expected}, got {actual}")]
    DigestMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },
}

/// Result type alias for transfer operations.
pub type Result<T> = std::result::Result<T, TransferError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<std::io::Error> for TransferError {
    fn from(err: std::io::Error) -> Self {
        TransferError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<walkdir::Error> for TransferError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf());
        let message = err.to_string();
        TransferError::Io {
            message,
            path,
            source: err.into_io_error(),
        }
    }
}

impl TransferError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        TransferError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        TransferError::Usage {
            message: message.into(),
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        TransferError::Structural {
            message: message.into(),
        }
    }

    /// Process exit status for this failure.
    ///
    /// All fatal conditions exit with 1. A declined prompt exits with 0 and
    /// never reaches this method.
    pub fn exit_code(&self) -> u8 {
        match self {
            TransferError::Usage { .. }
            | TransferError::NotFound(_)
            | TransferError::MissingBlobs { .. }
            | TransferError::Parse { .. }
            | TransferError::Structural { .. }
            | TransferError::DigestMismatch { .. }
            | TransferError::Io { .. } => 1,
        }
    }

    /// Stable short label for the failure kind, used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::Usage { .. } => "usage",
            TransferError::NotFound(_) | TransferError::MissingBlobs { .. } => "not_found",
            TransferError::Parse { .. } => "parse",
            TransferError::Structural { .. } => "structural",
            TransferError::DigestMismatch { .. } => "digest_mismatch",
            TransferError::Io { .. } => "io",
        }
    }
}
