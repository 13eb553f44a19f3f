use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    AudioPlayer, ChatSession, ClientConfig, CommandAudioPlayer, CommandSpeechRecognizer,
    ExternalCommand, HttpAnswerBackend, ImageUpload, MissingAudioPlayer, MissingSpeechRecognizer,
    SessionEvent, SpeechRecognizer, DEFAULT_SERVER_URL,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::TryRecvError},
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod render;

const DEFAULT_LOG_FILTER: &str = "info";

/// Ask questions about an image, typed or spoken.
#[derive(Parser, Debug)]
struct Args {
    /// Proxy base URL.
    #[arg(long, env = "VQA_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    #[arg(long)]
    image: PathBuf,
    /// Ask once and exit instead of reading questions from stdin.
    #[arg(long)]
    question: Option<String>,
    /// Dictation program whose stdout becomes the question.
    #[arg(long, env = "VQA_SPEECH_COMMAND")]
    speech_command: Option<String>,
    /// Player invoked with the answer audio URL.
    #[arg(long, env = "VQA_AUDIO_COMMAND")]
    audio_command: Option<String>,
    #[arg(long, default_value = "en-US")]
    lang: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut config = ClientConfig::new(&args.server_url)
        .with_context(|| format!("invalid server url '{}'", args.server_url))?;
    config.recognition.lang = args.lang.clone();

    let backend = Arc::new(HttpAnswerBackend::new(&config)?);
    let speech: Arc<dyn SpeechRecognizer> = match args
        .speech_command
        .as_deref()
        .and_then(ExternalCommand::parse)
    {
        Some(command) => Arc::new(CommandSpeechRecognizer::new(command)),
        None => Arc::new(MissingSpeechRecognizer),
    };
    let audio: Arc<dyn AudioPlayer> = match args
        .audio_command
        .as_deref()
        .and_then(ExternalCommand::parse)
    {
        Some(command) => Arc::new(CommandAudioPlayer::new(command)),
        None => Arc::new(MissingAudioPlayer),
    };

    let session = ChatSession::new_with_dependencies(backend, speech, audio, config);
    let mut events = session.subscribe();

    select_image(&session, &args.image).await?;
    drain_events(&mut events);

    if let Some(question) = args.question {
        session.set_draft(question);
        session.submit_question().await;
        drain_events(&mut events);
        session.wait_for_playback().await;
        return Ok(());
    }

    println!("Ask about the image. Commands: /image <path>, /voice (then Enter to send), /quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        } else if line == "/voice" {
            session.start_voice_capture().await;
        } else if let Some(path) = line.strip_prefix("/image ") {
            if let Err(err) = select_image(&session, Path::new(path.trim())).await {
                eprintln!("! {err:#}");
            }
        } else {
            // an empty line sends whatever the draft holds, e.g. a dictated question
            if !line.is_empty() {
                session.set_draft(line);
            }
            session.submit_question().await;
        }
        drain_events(&mut events);
    }

    session.wait_for_playback().await;
    Ok(())
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

async fn select_image(session: &ChatSession, path: &Path) -> Result<()> {
    let image = ImageUpload::from_path(path).await?;
    session.select_image(image).await?;
    Ok(())
}

fn drain_events(events: &mut broadcast::Receiver<SessionEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => {
                if let Some(line) = render::render_event(&event) {
                    println!("{line}");
                }
            }
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "dropped session events"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_at_info_unless_overridden() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
    }
}
