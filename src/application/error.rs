//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// What went wrong while scanning a configuration file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("malformed tag")]
    MalformedTag,

    #[error("malformed tag, tag name empty")]
    EmptyTagName,

    #[error("closing tag '{found}' without opening tag")]
    UnexpectedClosingTag { found: String },

    #[error("closing tag '{found}' does not match opening tag '{expected}'")]
    MismatchedClosingTag { expected: String, found: String },

    #[error("no closing tag found for section '{name}'")]
    UnclosedSection { name: String },
}

/// Parse failure with source position (1-based line and character).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error in {filename}, line {line} character {column}: {kind}")]
pub struct ParseError {
    pub filename: String,
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
}

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// True for a query path that matched nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(DomainError::PathNotFound { .. }))
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
