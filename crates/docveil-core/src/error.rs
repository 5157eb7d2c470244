//! Error types for Docveil Core

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Document lifecycle errors
    #[error("Failed to open document {}: {reason}", .path.display())]
    DocumentOpen { path: PathBuf, reason: String },

    #[error("Failed to write document {}: {reason}", .path.display())]
    DocumentWrite { path: PathBuf, reason: String },

    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("Document handle already closed")]
    DocumentClosed,

    // Detection errors
    #[error("Invalid category pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the input could not be read at all
    pub fn is_open_failure(&self) -> bool {
        matches!(self, Error::DocumentOpen { .. })
    }

    /// Whether this error happened while persisting the output
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Error::DocumentWrite { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
