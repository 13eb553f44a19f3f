//! Client side of the visual question answering chat: the conversation
//! controller and the HTTP client it talks to the proxy with.

use url::Url;

pub mod backend;
pub mod capabilities;
pub mod error;
pub mod image;
pub mod session;

pub use backend::{AnswerBackend, HttpAnswerBackend};
pub use capabilities::{
    AudioPlayer, CommandAudioPlayer, CommandSpeechRecognizer, ExternalCommand,
    MissingAudioPlayer, MissingSpeechRecognizer, RecognitionOptions, SpeechRecognizer,
};
pub use error::ClientError;
pub use image::ImageUpload;
pub use session::{
    ChatSession, PreviewStatus, SessionEvent, SessionSnapshot, SubmitOutcome, VoiceOutcome,
};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin of the proxy; answer audio paths are resolved against it too.
    pub base_url: Url,
    pub ask_route: String,
    pub recognition: RecognitionOptions,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            ask_route: shared::protocol::ask_question_route().to_string(),
            recognition: RecognitionOptions::default(),
        })
    }

    pub fn ask_url(&self) -> Result<Url, ClientError> {
        Ok(self.base_url.join(&self.ask_route)?)
    }

    /// Resolves a server-relative path such as `/static/audio/answer.mp3`.
    pub fn asset_url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
