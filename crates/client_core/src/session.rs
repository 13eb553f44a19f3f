use std::sync::Arc;

use parking_lot::Mutex;
use shared::domain::Message;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    backend::AnswerBackend,
    capabilities::{AudioPlayer, MissingAudioPlayer, MissingSpeechRecognizer, SpeechRecognizer},
    error::ClientError,
    image::ImageUpload,
    ClientConfig,
};

pub const FALLBACK_ANSWER: &str = "Sorry, I could not process your question.";
pub const ERROR_ANSWER: &str =
    "Sorry, there was an error processing your question. Please try again.";
pub const VOICE_UNSUPPORTED_NOTICE: &str = "Voice input is not supported on this device.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    MessageAppended(Message),
    TranscriptCleared,
    PreviewReady,
    LoadingChanged(bool),
    DraftChanged(String),
    Notice(String),
}

impl SessionEvent {
    /// True for events after which the view should scroll to the latest message.
    pub fn changes_transcript(&self) -> bool {
        matches!(
            self,
            SessionEvent::MessageAppended(_) | SessionEvent::TranscriptCleared
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No image, blank draft, or a submission already loading.
    Skipped,
    Answered,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    Unavailable,
    Transcribed(String),
    NoSpeech,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    Applied,
    /// Another image was selected while this preview was being encoded.
    Superseded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub image_file_name: Option<String>,
    pub preview: Option<String>,
    pub draft: String,
    pub messages: Vec<Message>,
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn can_submit(&self) -> bool {
        self.image_file_name.is_some() && !self.draft.trim().is_empty() && !self.loading
    }
}

#[derive(Default)]
struct SessionState {
    image: Option<Arc<ImageUpload>>,
    image_generation: u64,
    preview: Option<String>,
    draft: String,
    messages: Vec<Message>,
    loading: bool,
}

/// Interactive state of one question/answer conversation about one image.
pub struct ChatSession {
    backend: Arc<dyn AnswerBackend>,
    speech: Arc<dyn SpeechRecognizer>,
    audio: Arc<dyn AudioPlayer>,
    config: ClientConfig,
    state: Mutex<SessionState>,
    playback: Mutex<Vec<JoinHandle<()>>>,
    events: broadcast::Sender<SessionEvent>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn AnswerBackend>, config: ClientConfig) -> Arc<Self> {
        Self::new_with_dependencies(
            backend,
            Arc::new(MissingSpeechRecognizer),
            Arc::new(MissingAudioPlayer),
            config,
        )
    }

    pub fn new_with_dependencies(
        backend: Arc<dyn AnswerBackend>,
        speech: Arc<dyn SpeechRecognizer>,
        audio: Arc<dyn AudioPlayer>,
        config: ClientConfig,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            backend,
            speech,
            audio,
            config,
            state: Mutex::new(SessionState::default()),
            playback: Mutex::new(Vec::new()),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            image_file_name: state.image.as_ref().map(|image| image.file_name.clone()),
            preview: state.preview.clone(),
            draft: state.draft.clone(),
            messages: state.messages.clone(),
            loading: state.loading,
        }
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.lock().draft = text.clone();
        self.emit(SessionEvent::DraftChanged(text));
    }

    /// Replaces the current image and starts a fresh transcript.
    ///
    /// The transcript is cleared immediately; the preview arrives once it has
    /// been encoded, unless a newer selection got there first.
    pub async fn select_image(&self, image: ImageUpload) -> Result<PreviewStatus, ClientError> {
        let image = Arc::new(image);
        let generation = {
            let mut state = self.state.lock();
            state.image_generation += 1;
            state.image = Some(image.clone());
            state.preview = None;
            state.messages.clear();
            state.image_generation
        };
        info!(file = %image.file_name, bytes = image.bytes.len(), "image selected");
        self.emit(SessionEvent::TranscriptCleared);

        let preview = tokio::task::spawn_blocking(move || image.data_url()).await?;

        {
            let mut state = self.state.lock();
            if state.image_generation != generation {
                debug!(generation, current = state.image_generation, "dropping stale preview");
                return Ok(PreviewStatus::Superseded);
            }
            state.preview = Some(preview);
        }
        self.emit(SessionEvent::PreviewReady);
        Ok(PreviewStatus::Applied)
    }

    pub async fn start_voice_capture(&self) -> VoiceOutcome {
        if !self.speech.is_available() {
            info!("speech recognition unavailable");
            self.emit(SessionEvent::Notice(VOICE_UNSUPPORTED_NOTICE.to_string()));
            return VoiceOutcome::Unavailable;
        }

        match self.speech.recognize(&self.config.recognition).await {
            Ok(Some(transcript)) => {
                self.set_draft(transcript.clone());
                VoiceOutcome::Transcribed(transcript)
            }
            Ok(None) => VoiceOutcome::NoSpeech,
            Err(error) => {
                error!(%error, "speech recognition error");
                VoiceOutcome::Failed
            }
        }
    }

    /// Sends the current draft about the current image.
    ///
    /// The question shows up in the transcript before the request is sent.
    /// Loading and draft are reset when this returns or is dropped mid-flight.
    pub async fn submit_question(&self) -> SubmitOutcome {
        let (image, question) = {
            let mut state = self.state.lock();
            let Some(image) = state.image.clone() else {
                debug!("submit ignored: no image selected");
                return SubmitOutcome::Skipped;
            };
            if state.loading || state.draft.trim().is_empty() {
                debug!(loading = state.loading, "submit ignored");
                return SubmitOutcome::Skipped;
            }
            let question = state.draft.clone();
            let message = Message::question(question.clone());
            state.messages.push(message.clone());
            state.loading = true;
            self.emit(SessionEvent::MessageAppended(message));
            self.emit(SessionEvent::LoadingChanged(true));
            (image, question)
        };
        let _scope = SubmissionScope { session: self };

        match self.backend.ask(&image, &question).await {
            Ok(response) => {
                let content = response
                    .answer
                    .filter(|answer| !answer.is_empty())
                    .unwrap_or_else(|| FALLBACK_ANSWER.to_string());
                self.append(Message::answer(content));
                if let Some(path) = response.audio.filter(|path| !path.is_empty()) {
                    self.play_answer_audio(&path);
                }
                SubmitOutcome::Answered
            }
            Err(error) => {
                error!(%error, "failed to get answer");
                self.append(Message::answer(ERROR_ANSWER));
                SubmitOutcome::Failed
            }
        }
    }

    fn append(&self, message: Message) {
        self.state.lock().messages.push(message.clone());
        self.emit(SessionEvent::MessageAppended(message));
    }

    fn play_answer_audio(&self, path: &str) {
        if !self.audio.is_available() {
            debug!(path, "no audio player; skipping answer audio");
            return;
        }
        let url = match self.config.asset_url(path) {
            Ok(url) => url,
            Err(error) => {
                warn!(path, %error, "ignoring unusable audio path");
                return;
            }
        };
        let player = self.audio.clone();
        let handle = tokio::spawn(async move {
            if let Err(error) = player.play(url).await {
                warn!(%error, "answer audio playback failed");
            }
        });
        let mut playback = self.playback.lock();
        playback.retain(|handle| !handle.is_finished());
        playback.push(handle);
    }

    /// Waits for answer audio started so far. Front ends call this before
    /// shutting down their runtime so playback is not cut off.
    pub async fn wait_for_playback(&self) {
        let handles = std::mem::take(&mut *self.playback.lock());
        for handle in handles {
            if let Err(error) = handle.await {
                warn!(%error, "answer audio task did not finish");
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Clears the loading flag and the draft on every exit from a submission.
struct SubmissionScope<'a> {
    session: &'a ChatSession,
}

impl Drop for SubmissionScope<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.session.state.lock();
            state.loading = false;
            state.draft.clear();
        }
        self.session.emit(SessionEvent::LoadingChanged(false));
        self.session.emit(SessionEvent::DraftChanged(String::new()));
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
