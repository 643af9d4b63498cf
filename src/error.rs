use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatWidgetError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for ChatWidgetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatWidgetError::Serialization(err.to_string())
        } else {
            ChatWidgetError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatWidgetError {
    fn from(err: serde_json::Error) -> Self {
        ChatWidgetError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ChatWidgetError {
    fn from(err: std::io::Error) -> Self {
        ChatWidgetError::Storage(err.to_string())
    }
}

pub use crate::Result;
