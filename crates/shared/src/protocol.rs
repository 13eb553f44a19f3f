use serde::{Deserialize, Serialize};

/// Multipart field carrying the image bytes.
pub const IMAGE_FIELD: &str = "image";
/// Multipart field carrying the question text.
pub const QUESTION_FIELD: &str = "question";

pub fn ask_question_route() -> &'static str {
    "/api/ask-question"
}

/// Answer payload returned by the inference backend and relayed by the proxy.
///
/// Both fields are optional on the wire: a backend may answer without
/// synthesized speech, and a malformed backend may omit the answer entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Path of the synthesized answer audio, relative to the serving origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_decode_as_none() {
        let parsed: AskResponse = serde_json::from_str("{}").expect("json");
        assert_eq!(parsed, AskResponse::default());
    }

    #[test]
    fn absent_audio_is_not_serialized() {
        let body = AskResponse {
            answer: Some("It is a cat.".into()),
            audio: None,
        };
        assert_eq!(
            serde_json::to_string(&body).expect("json"),
            r#"{"answer":"It is a cat."}"#
        );
    }
}
