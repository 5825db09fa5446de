//! Error types for the magazine renderer

use thiserror::Error;

/// Result type alias for renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, fitting, or exporting a magazine
#[derive(Error, Debug)]
pub enum Error {
    /// A section carried a type tag with no renderer behind it
    #[error("The '{0}' section renderer is not defined.")]
    UnknownSectionType(String),

    /// A section is missing a payload field its renderer cannot do without
    #[error("The '{section_type}' section requires a '{field}' field")]
    MissingField {
        section_type: String,
        field: &'static str,
    },

    /// Measurement was requested for a node not attached under the output root
    #[error("Node {0} is not attached to the output tree; layout metrics are undefined")]
    DetachedNode(usize),

    /// The document description could not be decoded
    #[error("Invalid document description: {0}")]
    InvalidInput(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Filesystem failure while reading input or writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The print/export driver failed
    #[error("Export failed: {0}")]
    ExportError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(err.to_string())
    }
}
