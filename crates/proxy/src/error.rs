use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::error::{ErrorBody, MISSING_FIELDS_MESSAGE, PROCESSING_FAILED_MESSAGE};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("image and question are required")]
    MissingFields,
    #[error("failed to reach backend: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("backend responded with status: {0}")]
    UpstreamStatus(u16),
    #[error("asset not found")]
    AssetNotFound,
    #[error("failed to fetch asset from backend: {0}")]
    AssetUnreachable(reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingFields => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) | ProxyError::UpstreamStatus(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::AssetNotFound => StatusCode::NOT_FOUND,
            ProxyError::AssetUnreachable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message exposed to callers. Upstream details stay in the server log.
    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::MissingFields => MISSING_FIELDS_MESSAGE,
            ProxyError::Upstream(_) | ProxyError::UpstreamStatus(_) => PROCESSING_FAILED_MESSAGE,
            ProxyError::AssetNotFound => "Asset not found",
            ProxyError::AssetUnreachable(_) => "Failed to fetch asset",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.public_message()))).into_response()
    }
}
