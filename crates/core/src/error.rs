//! Error types for slide deck analysis and export.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a deck or writing an artifact.
///
/// Classification itself never fails; every variant here comes from the
/// surrounding I/O.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not a presentation package this tool can read.
    #[error("Invalid input format: {0}")]
    InvalidInputFormat(String),

    /// ZIP archive error while reading a package that passed the format check.
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing error inside a package part.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// Writing the spreadsheet or presentation output failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
