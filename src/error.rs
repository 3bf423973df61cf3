//! Error types for the MR60BHA2 driver
//!
//! Only transport and configuration failures are errors. Line noise (bad SOF,
//! checksum mismatches, oversized lengths) is absorbed by the synchronizer and
//! never reaches the caller.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Driver error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[cfg(feature = "serial")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Byte source is closed or was never opened
    #[error("Byte source is not open")]
    NotOpen,

    /// Configuration could not be parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
