//! Process-level error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("config error in '{path}': {message}")]
    Config { path: String, message: String },

    /// Cache service address is not a valid URI
    #[error("invalid cache target '{target}'")]
    InvalidTarget {
        target: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
