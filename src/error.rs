//! Error types for keystream verification

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring, reading or decoding a keystream check
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("failed to open serial port {path}")]
    PortOpen {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("failed to enumerate serial ports")]
    Enumerate(#[source] serialport::Error),

    #[error("failed to read from serial port")]
    Read(#[source] std::io::Error),

    #[error("invalid hex vector")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("vector must be {expected} bytes, got {actual}")]
    VectorLength { expected: usize, actual: usize },

    #[error("failed to read config file {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
