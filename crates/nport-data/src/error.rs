//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    Http(String),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (including gzip decoding)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid ticker or CIK
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
}

impl From<quick_xml::Error> for DataError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}
