//! Remote chat-completion client.
//!
//! Builds a bounded context (system instruction, trailing history window,
//! current user text), sends one request, and normalizes the outcome to
//! either the completion text or a [`CompletionError`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use minichat_core::config::RemoteConfig;
use minichat_core::error::MinichatError;
use minichat_core::types::{Message, Role};

use crate::error::CompletionError;

// =============================================================================
// Wire types
// =============================================================================

/// One `{role, content}` entry of the outbound message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

impl WireMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f64,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// =============================================================================
// Transport
// =============================================================================

/// Raw HTTP outcome handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    /// Response body, if it could be read.
    pub body: Option<String>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a completion request. Implementations perform exactly one attempt.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn post(
        &self,
        endpoint: &str,
        credential: &str,
        request: &CompletionRequest,
    ) -> Result<TransportResponse, CompletionError>;
}

/// HTTPS transport built on `reqwest`.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport; `timeout` of `None` keeps reqwest's default.
    pub fn new(timeout: Option<Duration>) -> Result<Self, MinichatError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MinichatError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn post(
        &self,
        endpoint: &str,
        credential: &str,
        request: &CompletionRequest,
    ) -> Result<TransportResponse, CompletionError> {
        let response = self
            .client
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", credential))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Transport(format!("request timeout: {}", e))
                } else if e.is_connect() {
                    CompletionError::Transport(format!("connection failed: {}", e))
                } else {
                    CompletionError::Transport(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(error = %e, "Failed to read completion response body");
                None
            }
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

// =============================================================================
// RemoteCompletion
// =============================================================================

/// Remote reply generator.
pub struct RemoteCompletion {
    transport: Arc<dyn CompletionTransport>,
    config: RemoteConfig,
}

impl RemoteCompletion {
    pub fn new(transport: Arc<dyn CompletionTransport>, config: RemoteConfig) -> Self {
        Self { transport, config }
    }

    /// Number of prior messages included as context.
    pub fn context_messages(&self) -> usize {
        self.config.context_messages
    }

    /// Assemble the request for `user_text`.
    ///
    /// `history` must not contain the current user message; only its last
    /// `context_messages` entries are used.
    pub fn build_request(&self, user_text: &str, history: &[Message]) -> CompletionRequest {
        let start = history.len().saturating_sub(self.config.context_messages);
        let window = &history[start..];

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(WireMessage::new("system", self.config.system_prompt.as_str()));
        messages.extend(window.iter().map(|m| {
            let role = match m.role {
                Role::User => "user",
                _ => "assistant",
            };
            WireMessage::new(role, m.text.as_str())
        }));
        messages.push(WireMessage::new("user", user_text));

        CompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
        }
    }

    /// Ask the remote model for a reply. One attempt, no retry.
    pub async fn complete(
        &self,
        user_text: &str,
        history: &[Message],
        credential: Option<&str>,
    ) -> Result<String, CompletionError> {
        let credential = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(CompletionError::NoCredential)?;

        let request = self.build_request(user_text, history);
        debug!(
            model = %request.model,
            context = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .transport
            .post(&self.config.endpoint, credential, &request)
            .await?;

        if !response.is_success() {
            return Err(CompletionError::Http {
                status: response.status,
                status_text: response.status_text,
                body: response.body,
            });
        }

        extract_content(response.body.as_deref()).ok_or(CompletionError::EmptyResponse)
    }
}

/// Pull `choices[0].message.content`, trimmed, out of a success body.
fn extract_content(body: Option<&str>) -> Option<String> {
    let parsed: CompletionResponse = match serde_json::from_str(body?) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Completion response is not valid JSON");
            return None;
        }
    };

    let content = parsed
        .choices
        .into_iter()
        .next()?
        .message?
        .content?
        .trim()
        .to_string();

    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}
