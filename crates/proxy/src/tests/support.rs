use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;

pub(crate) const BOUNDARY: &str = "vqa-test-boundary";

pub(crate) enum TestPart<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub(crate) fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub(crate) fn multipart_body(parts: &[TestPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            TestPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            TestPart::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ReceivedForm {
    pub(crate) question: Option<String>,
    pub(crate) image: Option<Vec<u8>>,
    pub(crate) image_file_name: Option<String>,
    pub(crate) image_content_type: Option<String>,
}

#[derive(Clone)]
struct BackendState {
    status: StatusCode,
    body: serde_json::Value,
    received: Arc<Mutex<Vec<ReceivedForm>>>,
}

pub(crate) struct FakeBackend {
    pub(crate) base_url: String,
    pub(crate) received: Arc<Mutex<Vec<ReceivedForm>>>,
}

impl FakeBackend {
    pub(crate) fn ask_url(&self) -> url::Url {
        url::Url::parse(&format!("{}/api/ask", self.base_url)).expect("backend url")
    }

    pub(crate) fn received(&self) -> Vec<ReceivedForm> {
        self.received.lock().expect("received lock").clone()
    }
}

async fn handle_ask(State(state): State<BackendState>, mut multipart: Multipart) -> impl IntoResponse {
    let mut form = ReceivedForm::default();
    while let Some(field) = multipart.next_field().await.expect("field") {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("question") => form.question = Some(field.text().await.expect("text")),
            Some("image") => {
                form.image_file_name = field.file_name().map(str::to_owned);
                form.image_content_type = field.content_type().map(str::to_owned);
                form.image = Some(field.bytes().await.expect("bytes").to_vec());
            }
            _ => {}
        }
    }
    state.received.lock().expect("received lock").push(form);
    (state.status, Json(state.body))
}

async fn handle_audio() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "audio/mpeg")], b"ID3-fake-mp3".to_vec())
}

pub(crate) async fn spawn_backend(status: StatusCode, body: serde_json::Value) -> FakeBackend {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = BackendState {
        status,
        body,
        received: received.clone(),
    };
    let app = Router::new()
        .route("/api/ask", post(handle_ask))
        .route("/static/audio/answer.mp3", get(handle_audio))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    FakeBackend {
        base_url: format!("http://{addr}"),
        received,
    }
}

/// Address nothing listens on.
pub(crate) async fn closed_backend_url() -> url::Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    url::Url::parse(&format!("http://{addr}/api/ask")).expect("url")
}
