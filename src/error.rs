//! Unified error types.
//!
//! Internally every layer is fallible; the public parse entry points are
//! total and convert unrecoverable failures into a diagnostic presentation
//! instead of surfacing these errors.
use thiserror::Error;

/// Main error type for extraction operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data is not an OLE compound file
    #[error("Not a compound file")]
    NotCompound,

    /// A required CFB stream is absent
    #[error("Stream not found: {0}")]
    MissingStream(String),

    /// Corrupted or malformed data
    #[error("Corrupted file: {0}")]
    Corrupted(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<crate::ole::OleError> for Error {
    fn from(err: crate::ole::OleError) -> Self {
        match err {
            crate::ole::OleError::NotOleFile => Error::NotCompound,
            crate::ole::OleError::StreamNotFound(name) => Error::MissingStream(name),
            other => Error::Corrupted(other.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Zip(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
