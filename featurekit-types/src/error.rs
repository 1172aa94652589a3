//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypesError {
    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
    /// Malformed well-known-binary buffer.
    #[error("invalid WKB: {0}")]
    Wkb(String),
}

impl From<std::io::Error> for TypesError {
    fn from(value: std::io::Error) -> Self {
        Self::Wkb(format!("unexpected end of data: {value}"))
    }
}
