//! Error types for docxflow operations.

use thiserror::Error;

/// Errors that can occur while converting documents.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A node handed to the style resolver is not an element of the DOM
    /// being converted. Aborts the unit.
    #[error("Cannot resolve style for node {node}")]
    StyleResolution { node: String },

    #[error("Missing resource: {0}")]
    MissingResource(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
