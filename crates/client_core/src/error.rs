use std::path::PathBuf;

use shared::error::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid image mime type '{mime_type}': {source}")]
    InvalidMimeType {
        mime_type: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Status(#[from] ServiceError),
    #[error("failed to decode answer: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to read image '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image preview task failed: {0}")]
    PreviewTask(#[from] tokio::task::JoinError),
    #[error("speech recognition failed: {0}")]
    Speech(String),
    #[error("audio playback failed: {0}")]
    Playback(String),
}
