//! Optional platform capabilities: speech recognition and audio playback.
//!
//! Either may be missing at runtime. Callers check `is_available` and take an
//! explicit fallback path instead of assuming presence.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use url::Url;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// BCP 47 language tag.
    pub lang: String,
    pub interim_results: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            lang: "en-US".into(),
            interim_results: false,
        }
    }
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    /// Listens once and returns the finalized transcript, or `None` when
    /// nothing was heard.
    async fn recognize(&self, options: &RecognitionOptions)
        -> Result<Option<String>, ClientError>;
}

pub struct MissingSpeechRecognizer;

#[async_trait]
impl SpeechRecognizer for MissingSpeechRecognizer {
    fn is_available(&self) -> bool {
        false
    }

    async fn recognize(
        &self,
        _options: &RecognitionOptions,
    ) -> Result<Option<String>, ClientError> {
        Err(ClientError::Speech("speech recognition is unavailable".into()))
    }
}

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    async fn play(&self, url: Url) -> Result<(), ClientError>;
}

pub struct MissingAudioPlayer;

#[async_trait]
impl AudioPlayer for MissingAudioPlayer {
    fn is_available(&self) -> bool {
        false
    }

    async fn play(&self, url: Url) -> Result<(), ClientError> {
        Err(ClientError::Playback(format!(
            "no audio player available for {url}"
        )))
    }
}

/// An external program plus its leading arguments, parsed from a
/// whitespace-separated command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalCommand {
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut words = command_line.split_whitespace().map(str::to_owned);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

/// Runs a dictation program and takes its trimmed stdout as the transcript.
///
/// The program receives the recognition language in `VQA_SPEECH_LANG` and
/// `VQA_SPEECH_INTERIM` (`0`/`1`).
pub struct CommandSpeechRecognizer {
    command: ExternalCommand,
}

impl CommandSpeechRecognizer {
    pub fn new(command: ExternalCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl SpeechRecognizer for CommandSpeechRecognizer {
    async fn recognize(
        &self,
        options: &RecognitionOptions,
    ) -> Result<Option<String>, ClientError> {
        debug!(program = %self.command.program, lang = %options.lang, "starting dictation");
        let output = self
            .command
            .command()
            .env("VQA_SPEECH_LANG", &options.lang)
            .env(
                "VQA_SPEECH_INTERIM",
                if options.interim_results { "1" } else { "0" },
            )
            .output()
            .await
            .map_err(|err| {
                ClientError::Speech(format!("failed to run {}: {err}", self.command.program))
            })?;

        if !output.status.success() {
            return Err(ClientError::Speech(format!(
                "{} exited with {}: {}",
                self.command.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(transcript).filter(|text| !text.is_empty()))
    }
}

/// Plays audio by handing its URL to an external player (`mpv`, `ffplay -nodisp`, ...).
pub struct CommandAudioPlayer {
    command: ExternalCommand,
}

impl CommandAudioPlayer {
    pub fn new(command: ExternalCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl AudioPlayer for CommandAudioPlayer {
    async fn play(&self, url: Url) -> Result<(), ClientError> {
        let status = self
            .command
            .command()
            .arg(url.as_str())
            .status()
            .await
            .map_err(|err| {
                ClientError::Playback(format!("failed to run {}: {err}", self.command.program))
            })?;
        if !status.success() {
            return Err(ClientError::Playback(format!(
                "{} exited with {status}",
                self.command.program
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/capabilities_tests.rs"]
mod tests;
