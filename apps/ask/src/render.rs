use chrono::Local;
use client_core::SessionEvent;
use shared::domain::Message;

pub fn format_message(message: &Message) -> String {
    format!(
        "[{}] {}: {}",
        message.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        message.kind.author(),
        message.content
    )
}

/// Terminal line for an event, if it has one.
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::MessageAppended(message) => Some(format_message(message)),
        SessionEvent::TranscriptCleared => Some("-- new conversation --".to_string()),
        SessionEvent::LoadingChanged(true) => Some("AI Assistant: Thinking...".to_string()),
        SessionEvent::Notice(text) => Some(format!("! {text}")),
        SessionEvent::DraftChanged(text) if !text.is_empty() => Some(format!("> {text}")),
        SessionEvent::PreviewReady
        | SessionEvent::LoadingChanged(false)
        | SessionEvent::DraftChanged(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_labelled_by_author() {
        let line = format_message(&Message::answer("It is a cat."));
        assert!(line.ends_with("AI Assistant: It is a cat."), "{line}");
        let line = format_message(&Message::question("What is it?"));
        assert!(line.ends_with("You: What is it?"), "{line}");
    }

    #[test]
    fn quiet_events_render_nothing() {
        assert!(render_event(&SessionEvent::PreviewReady).is_none());
        assert!(render_event(&SessionEvent::DraftChanged(String::new())).is_none());
        assert_eq!(
            render_event(&SessionEvent::Notice("no mic".into())).as_deref(),
            Some("! no mic")
        );
    }
}
