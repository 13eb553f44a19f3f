use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    error::ServiceError,
    protocol::{AskResponse, IMAGE_FIELD, QUESTION_FIELD},
};
use tracing::{debug, warn};
use url::Url;

use crate::{error::ClientError, image::ImageUpload, ClientConfig};

/// Something that answers questions about an image.
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    async fn ask(&self, image: &ImageUpload, question: &str) -> Result<AskResponse, ClientError>;
}

/// Posts `image` + `question` as multipart form data to the proxy.
pub struct HttpAnswerBackend {
    http: Client,
    ask_url: Url,
}

impl HttpAnswerBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::new(),
            ask_url: config.ask_url()?,
        })
    }

    pub fn ask_url(&self) -> &Url {
        &self.ask_url
    }

    fn transport(&self, source: reqwest::Error) -> ClientError {
        ClientError::Transport {
            url: self.ask_url.to_string(),
            source,
        }
    }
}

#[async_trait]
impl AnswerBackend for HttpAnswerBackend {
    async fn ask(&self, image: &ImageUpload, question: &str) -> Result<AskResponse, ClientError> {
        let image_part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|source| ClientError::InvalidMimeType {
                mime_type: image.mime_type.clone(),
                source,
            })?;
        let form = Form::new()
            .part(IMAGE_FIELD, image_part)
            .text(QUESTION_FIELD, question.to_string());

        debug!(url = %self.ask_url, image = %image.file_name, "sending question");
        let response = self
            .http
            .post(self.ask_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|source| self.transport(source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let error = ServiceError::from_body(status.as_u16(), &body);
            warn!(url = %self.ask_url, %error, "question was rejected");
            return Err(error.into());
        }

        response
            .json::<AskResponse>()
            .await
            .map_err(ClientError::Decode)
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
