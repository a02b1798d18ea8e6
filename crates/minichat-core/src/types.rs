use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Current wall-clock time as epoch milliseconds.
pub fn now_millis() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// Format an epoch-millis timestamp as local `HH:MM`, the way the transcript
/// meta line shows it.
pub fn format_time_of_day(ts: Timestamp) -> String {
    Local
        .timestamp_millis_opt(ts)
        .single()
        .map(|dt: DateTime<Local>| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

// =============================================================================
// Message
// =============================================================================

/// Author of a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    /// Short label used in the transcript meta line.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Bot => "bot",
        }
    }
}

/// One entry of the conversation log.
///
/// Serialized as `{"role": "user"|"bot", "text": ..., "time": <epoch millis>}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub time: Timestamp,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>, time: Timestamp) -> Self {
        Self {
            role,
            text: text.into(),
            time,
        }
    }

    /// A user message stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, now_millis())
    }

    /// A bot message stamped with the current time.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Role::Bot, text, now_millis())
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Reply-routing settings, persisted separately from the message log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversationSettings {
    /// Route replies through the remote completion service.
    pub remote_enabled: bool,
    /// Bearer credential for the completion service.
    pub credential: Option<String>,
}

impl ConversationSettings {
    /// Whether a non-blank credential is stored.
    pub fn has_credential(&self) -> bool {
        self.credential
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    /// Remote mode is in effect only when enabled and a credential is present.
    pub fn uses_remote(&self) -> bool {
        self.remote_enabled && self.has_credential()
    }
}

// Credentials must never end up in logs.
impl std::fmt::Display for ConversationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "remote_enabled={} credential={}",
            self.remote_enabled,
            if self.has_credential() { "set" } else { "unset" }
        )
    }
}
