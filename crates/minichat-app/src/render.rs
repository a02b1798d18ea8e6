//! Terminal rendering of chat events.

use minichat_core::events::ChatEvent;
use minichat_core::types::{format_time_of_day, Message};

pub const TYPING_LINE: &str = "  Bot is typing...";

/// Two-line block: the text, then `you @ HH:MM` / `bot @ HH:MM`.
pub fn render_message(msg: &Message) -> String {
    format!(
        "{}\n  {} @ {}",
        msg.text,
        msg.role.label(),
        format_time_of_day(msg.time)
    )
}

/// Text to print for an event, if any.
pub fn render_event(event: &ChatEvent) -> Option<String> {
    match event {
        // The input line already shows what the user typed.
        ChatEvent::MessageAppended(msg) if msg.is_user() => None,
        ChatEvent::MessageAppended(msg) => Some(render_message(msg)),
        ChatEvent::TypingStarted => Some(TYPING_LINE.to_string()),
        ChatEvent::TypingEnded => None,
        ChatEvent::HistoryCleared => Some("-- history cleared --".to_string()),
    }
}
