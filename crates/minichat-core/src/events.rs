use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Signals emitted by the conversation controller for the rendering layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was appended to the log and persisted.
    MessageAppended(Message),
    /// A reply is being produced. Replaces any indicator already shown.
    TypingStarted,
    /// No reply is outstanding any more.
    TypingEnded,
    /// The log was cleared.
    HistoryCleared,
}

impl ChatEvent {
    /// Event name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::MessageAppended(_) => "message_appended",
            ChatEvent::TypingStarted => "typing_started",
            ChatEvent::TypingEnded => "typing_ended",
            ChatEvent::HistoryCleared => "history_cleared",
        }
    }
}
