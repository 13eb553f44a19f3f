use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Question,
    Answer,
}

impl MessageKind {
    /// Speaker label shown next to the message.
    pub fn author(self) -> &'static str {
        match self {
            MessageKind::Question => "You",
            MessageKind::Answer => "AI Assistant",
        }
    }
}

/// One transcript entry. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::random(),
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn question(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Question, content)
    }

    pub fn answer(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Answer, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_kind_as_type_field() {
        let message = Message::question("what is this?");
        let value = serde_json::to_value(&message).expect("json");
        assert_eq!(value["type"], "question");
        assert_eq!(value["content"], "what is this?");
        assert_eq!(value["id"], message.id.to_string());
    }

    #[test]
    fn message_ids_do_not_collide_for_back_to_back_messages() {
        let first = Message::question("a");
        let second = Message::answer("b");
        assert_ne!(first.id, second.id);
    }
}
