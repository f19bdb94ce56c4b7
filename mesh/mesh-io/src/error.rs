//! Error types for mesh I/O operations.

use std::path::PathBuf;

use mesh_types::MeshError;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur during mesh I/O operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Unknown file format (unrecognized extension).
    #[error("unknown file format: .{extension}")]
    UnknownFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// The format can be written but not read back.
    #[error("format .{extension} is export only")]
    ExportOnly {
        /// Extension of the format.
        extension: &'static str,
    },

    /// Invalid file content (parse error).
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// A binary header or attribute table does not match the format.
    #[error("format mismatch: {reason}")]
    FormatMismatch {
        /// What did not match.
        reason: String,
    },

    /// Unexpected end of file.
    #[error("unexpected end of file at position {position}")]
    UnexpectedEof {
        /// Position in the file where EOF was encountered.
        position: u64,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The decoded or exported mesh is invalid.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Create a `FormatMismatch` error with the given reason.
    #[must_use]
    pub fn format_mismatch(reason: impl Into<String>) -> Self {
        Self::FormatMismatch {
            reason: reason.into(),
        }
    }
}

/// Open a file for reading, reporting a missing file as
/// [`IoError::FileNotFound`].
pub(crate) fn open(path: &std::path::Path) -> IoResult<std::fs::File> {
    std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })
}
