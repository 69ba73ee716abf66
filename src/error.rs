use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnownBeaconsError {
    #[error("SSID source {path} unavailable: {source}")]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("frame construction error: {0}")]
    FrameConstruction(String),

    #[error("invalid MAC address: {0:?}")]
    InvalidMac(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KnownBeaconsError>;
