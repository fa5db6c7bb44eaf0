use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Sheet out of sync: {0}")]
    SyncRequired(String),
}

impl Error {
    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::Delivery(msg) | Error::SyncRequired(msg) | Error::Validation(msg) => {
                msg.clone()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
