use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parsing error: {message}")]
    Parse { message: String },

    #[error("Storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage write failed at {}: {source}", .path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Delivery error: {channel}: {message}")]
    Delivery { channel: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn parse(message: impl Into<String>) -> Self {
        AppError::Parse {
            message: message.into(),
        }
    }

    pub fn delivery(channel: &str, message: impl Into<String>) -> Self {
        AppError::Delivery {
            channel: channel.to_string(),
            message: message.into(),
        }
    }
}

// Connect, timeout and body-read failures all land here
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Network(format!("request timed out: {}", err))
        } else {
            AppError::Network(err.to_string())
        }
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
