//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Query errors raised by the tree and its typed views.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("path '{path}' not found in {filename}")]
    PathNotFound { path: String, filename: String },

    #[error("cannot convert '{value}' at '{path}' to {target}: {reason}")]
    Conversion {
        path: String,
        value: String,
        target: &'static str,
        reason: String,
    },
}
