//! Error handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Any HTTP failure: transport, non-success status or undecodable body.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The ngrok agent could not be started or refused the tunnel.
    #[error("Tunnel error: {0}")]
    Tunnel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Integrity error: {0}")]
    Integrity(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
