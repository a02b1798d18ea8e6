//! Error types for the conversation engine.

use minichat_core::error::MinichatError;

/// Maximum number of characters of a response body kept in an error.
const MAX_BODY_DETAIL: usize = 500;

/// Errors returned by the conversation controller.
///
/// Reply failures never show up here; they become a warning bot message.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("storage error: {0}")]
    StorageError(String),
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl From<MinichatError> for ChatError {
    fn from(err: MinichatError) -> Self {
        match err {
            MinichatError::Config(msg) => ChatError::ConfigError(msg),
            other => ChatError::StorageError(other.to_string()),
        }
    }
}

/// Failure of a single remote completion attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    /// No usable credential; raised before any network I/O.
    #[error("no API key set")]
    NoCredential,
    /// The service answered with a non-success status.
    #[error("{}", http_detail(*status, status_text, body.as_deref()))]
    Http {
        status: u16,
        status_text: String,
        body: Option<String>,
    },
    /// Success status, but no completion text in the body.
    #[error("empty response from model")]
    EmptyResponse,
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),
}

impl CompletionError {
    /// Human-readable detail for the warning message, if there is any.
    pub fn detail(&self) -> Option<String> {
        let detail = self.to_string();
        if detail.trim().is_empty() {
            None
        } else {
            Some(detail)
        }
    }
}

fn http_detail(status: u16, status_text: &str, body: Option<&str>) -> String {
    let head = if status_text.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {} {}", status, status_text)
    };
    match body.map(str::trim).filter(|b| !b.is_empty()) {
        Some(body) if body.chars().count() > MAX_BODY_DETAIL => {
            let cut: String = body.chars().take(MAX_BODY_DETAIL).collect();
            format!("{}: {}…", head, cut)
        }
        Some(body) => format!("{}: {}", head, body),
        None => head,
    }
}
