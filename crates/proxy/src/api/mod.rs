use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::protocol::{AskResponse, IMAGE_FIELD, QUESTION_FIELD};
use tracing::{error, info, warn};
use url::Url;

use crate::{app_state::AppState, error::ProxyError};

/// File name browsers give a blob appended without one.
const DEFAULT_IMAGE_FILE_NAME: &str = "blob";

#[derive(Debug, Clone)]
pub struct ImagePart {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AskForm {
    pub image: ImagePart,
    pub question: String,
}

pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AskResponse>, ProxyError> {
    let multipart = multipart.map_err(|rejection| {
        warn!(%rejection, "rejecting non-multipart request");
        ProxyError::MissingFields
    })?;
    let form = read_ask_form(multipart).await?;
    info!(
        question_len = form.question.len(),
        image_bytes = form.image.bytes.len(),
        "forwarding question to backend"
    );

    let response = forward_question(&state.http, &state.backend_url, form)
        .await
        .map_err(|error| {
            error!(backend_url = %state.backend_url, %error, "error communicating with backend");
            error
        })?;
    Ok(Json(response))
}

/// Collects the `image` and `question` parts. Unknown parts are skipped and
/// only the first of a repeated part counts; a missing part or a blank
/// question is rejected.
pub async fn read_ask_form(mut multipart: Multipart) -> Result<AskForm, ProxyError> {
    let mut image = None;
    let mut question = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == IMAGE_FIELD && image.is_none() {
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await.map_err(malformed)?;
            image = Some(ImagePart {
                bytes,
                file_name,
                content_type,
            });
        } else if name == QUESTION_FIELD && question.is_none() {
            question = Some(field.text().await.map_err(malformed)?);
        }
    }

    match (image, question) {
        (Some(image), Some(question)) if !question.is_empty() => Ok(AskForm { image, question }),
        _ => Err(ProxyError::MissingFields),
    }
}

fn malformed(error: MultipartError) -> ProxyError {
    warn!(%error, "rejecting unreadable multipart body");
    ProxyError::MissingFields
}

pub async fn forward_question(
    http: &Client,
    backend_url: &Url,
    form: AskForm,
) -> Result<AskResponse, ProxyError> {
    let mut image = Part::bytes(form.image.bytes.to_vec()).file_name(
        form.image
            .file_name
            .unwrap_or_else(|| DEFAULT_IMAGE_FILE_NAME.to_string()),
    );
    if let Some(content_type) = form.image.content_type.as_deref() {
        image = image.mime_str(content_type)?;
    }
    let outbound = Form::new()
        .part(IMAGE_FIELD, image)
        .text(QUESTION_FIELD, form.question);

    let response = http
        .post(backend_url.clone())
        .multipart(outbound)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProxyError::UpstreamStatus(status.as_u16()));
    }

    Ok(response.json::<AskResponse>().await?)
}

/// Relays `GET /static/<path>` to the backend origin so clients only ever
/// talk to the proxy.
pub async fn relay_static_asset(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ProxyError> {
    let url = static_asset_url(&state.asset_origin, &path)?;
    let response = state.http.get(url.clone()).send().await.map_err(|error| {
        error!(%url, %error, "failed to fetch static asset");
        ProxyError::AssetUnreachable(error)
    })?;

    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut headers = HeaderMap::new();
    if let Some(content_type) = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| HeaderValue::from_bytes(value.as_bytes()).ok())
    {
        headers.insert(header::CONTENT_TYPE, content_type);
    }
    if !status.is_success() {
        warn!(%url, %status, "backend refused static asset");
        return Ok((status, headers, Bytes::new()));
    }

    let body = response
        .bytes()
        .await
        .map_err(ProxyError::AssetUnreachable)?;
    Ok((status, headers, body))
}

pub fn static_asset_url(asset_origin: &Url, path: &str) -> Result<Url, ProxyError> {
    if path.is_empty() || path.split('/').any(|segment| segment == "..") {
        return Err(ProxyError::AssetNotFound);
    }
    asset_origin
        .join(&format!("static/{path}"))
        .map_err(|_| ProxyError::AssetNotFound)
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
