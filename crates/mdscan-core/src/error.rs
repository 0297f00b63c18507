//! Error types for mdscan

use thiserror::Error;

/// Main error type for mdscan operations.
///
/// Scanning itself never fails; only reading input and loading
/// configuration can.
#[derive(Error, Debug)]
pub enum MdscanError {
    /// IO error while reading a source document or config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for mdscan operations
pub type Result<T> = std::result::Result<T, MdscanError>;
