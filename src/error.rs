//! Error types for hamlize operations.

use thiserror::Error;

/// Errors that can occur while converting a document.
///
/// Every variant aborts the whole conversion; there is no partial output.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid doctype: {0}")]
    InvalidDoctype(String),

    #[error("Line {line}: {message}")]
    InvalidEncoding { line: usize, message: String },

    #[error("Document nesting exceeds {depth} levels")]
    TooDeep { depth: usize },
}

impl Error {
    /// Source line the error refers to, when known (1-based).
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::InvalidEncoding { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
