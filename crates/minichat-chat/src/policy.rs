//! Reply strategy: local heuristic with simulated latency, or remote completion.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use minichat_core::config::ReplyConfig;
use minichat_core::types::{ConversationSettings, Message};

use crate::heuristic::LocalHeuristic;
use crate::remote::RemoteCompletion;
use crate::timing::{sample_latency, Delay, TokioDelay};

/// Detail used when a failure carries no description of its own.
const GENERIC_FAILURE: &str = "request failed";

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Local,
    Remote,
    /// The remote call failed; the text is a warning.
    RemoteFailed,
}

/// Final bot text for a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOutcome {
    pub text: String,
    pub source: ReplySource,
}

/// Chooses how to answer a user message and always produces some text.
pub struct ReplyPolicy {
    heuristic: LocalHeuristic,
    remote: RemoteCompletion,
    delay: Arc<dyn Delay>,
    rng: Mutex<StdRng>,
    config: ReplyConfig,
}

impl ReplyPolicy {
    pub fn new(remote: RemoteCompletion, config: ReplyConfig) -> Self {
        Self {
            heuristic: LocalHeuristic::new(),
            remote,
            delay: Arc::new(TokioDelay),
            rng: Mutex::new(StdRng::from_os_rng()),
            config,
        }
    }

    /// Replace the delay primitive.
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Replace the random source used for templates and latency.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Number of prior messages the remote path wants as context.
    pub fn context_messages(&self) -> usize {
        self.remote.context_messages()
    }

    /// Produce the reply text for `text`.
    ///
    /// `history` is the log as it was before `text` was appended.
    pub async fn reply(
        &self,
        text: &str,
        history: &[Message],
        settings: &ConversationSettings,
    ) -> ReplyOutcome {
        if !settings.uses_remote() {
            return self.local_reply(text).await;
        }

        match self
            .remote
            .complete(text, history, settings.credential.as_deref())
            .await
        {
            Ok(reply) => ReplyOutcome {
                text: reply,
                source: ReplySource::Remote,
            },
            Err(e) => {
                warn!(error = %e, "Remote completion failed");
                let detail = e.detail().unwrap_or_else(|| GENERIC_FAILURE.to_string());
                ReplyOutcome {
                    text: format!("{}{}", self.config.warning_prefix, detail),
                    source: ReplySource::RemoteFailed,
                }
            }
        }
    }

    async fn local_reply(&self, text: &str) -> ReplyOutcome {
        // The guard must be gone before the await below.
        let (reply, latency) = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            let reply = self.heuristic.reply(text, &mut *rng);
            let latency = sample_latency(
                self.config.min_delay_ms..self.config.max_delay_ms,
                &mut *rng,
            );
            (reply, latency)
        };

        debug!(latency_ms = latency.as_millis() as u64, "Simulating reply latency");
        self.delay.sleep(latency).await;

        ReplyOutcome {
            text: reply,
            source: ReplySource::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use minichat_core::config::RemoteConfig;

    use crate::error::CompletionError;
    use crate::heuristic::{GREETING_REPLY, WEATHER_REPLY};
    use crate::remote::{CompletionRequest, CompletionTransport, TransportResponse};

    struct RecordingDelay(Mutex<Vec<Duration>>);

    #[async_trait]
    impl Delay for RecordingDelay {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    struct FixedTransport(Result<TransportResponse, CompletionError>);

    #[async_trait]
    impl CompletionTransport for FixedTransport {
        async fn post(
            &self,
            _endpoint: &str,
            _credential: &str,
            _request: &CompletionRequest,
        ) -> Result<TransportResponse, CompletionError> {
            self.0.clone()
        }
    }

    fn ok_body(content: &str) -> Result<TransportResponse, CompletionError> {
        Ok(TransportResponse {
            status: 200,
            status_text: "OK".to_string(),
            body: Some(format!(
                r#"{{"choices":[{{"message":{{"content":"{}"}}}}]}}"#,
                content
            )),
        })
    }

    fn policy(
        transport: Result<TransportResponse, CompletionError>,
    ) -> (ReplyPolicy, Arc<RecordingDelay>) {
        let delay = Arc::new(RecordingDelay(Mutex::new(Vec::new())));
        let remote = RemoteCompletion::new(Arc::new(FixedTransport(transport)), RemoteConfig::default());
        let policy = ReplyPolicy::new(remote, ReplyConfig::default())
            .with_delay(Arc::clone(&delay) as Arc<dyn Delay>)
            .with_rng(StdRng::seed_from_u64(3));
        (policy, delay)
    }

    fn remote_on() -> ConversationSettings {
        ConversationSettings {
            remote_enabled: true,
            credential: Some("sk-test".to_string()),
        }
    }

    #[tokio::test]
    async fn test_local_reply_is_delayed() {
        let (policy, delay) = policy(ok_body("unused"));
        let out = policy
            .reply("hello", &[], &ConversationSettings::default())
            .await;
        assert_eq!(out.text, GREETING_REPLY);
        assert_eq!(out.source, ReplySource::Local);

        let recorded = delay.0.lock().unwrap().clone();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0] >= Duration::from_millis(600));
        assert!(recorded[0] < Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn test_enabled_without_credential_uses_local() {
        let (policy, _) = policy(ok_body("remote"));
        let settings = ConversationSettings {
            remote_enabled: true,
            credential: None,
        };
        let out = policy.reply("the weather", &[], &settings).await;
        assert_eq!(out.text, WEATHER_REPLY);
        assert_eq!(out.source, ReplySource::Local);
    }

    #[tokio::test]
    async fn test_remote_reply_not_delayed() {
        let (policy, delay) = policy(ok_body("From the model"));
        let out = policy.reply("hello", &[], &remote_on()).await;
        assert_eq!(out.text, "From the model");
        assert_eq!(out.source, ReplySource::Remote);
        assert!(delay.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_becomes_warning() {
        let (policy, _) = policy(Ok(TransportResponse {
            status: 429,
            status_text: "Too Many Requests".to_string(),
            body: None,
        }));
        let out = policy.reply("hello", &[], &remote_on()).await;
        assert_eq!(out.source, ReplySource::RemoteFailed);
        assert_eq!(out.text, "⚠️ AI error: HTTP 429 Too Many Requests");
    }

    #[tokio::test]
    async fn test_detailless_failure_uses_generic_text() {
        let (policy, _) = policy(Err(CompletionError::Transport(String::new())));
        let out = policy.reply("hello", &[], &remote_on()).await;
        assert_eq!(out.text, "⚠️ AI error: request failed");
    }

    #[tokio::test]
    async fn test_transport_failure_detail_kept() {
        let (policy, _) = policy(Err(CompletionError::Transport(
            "connection failed: refused".to_string(),
        )));
        let out = policy.reply("hello", &[], &remote_on()).await;
        assert!(out.text.ends_with("connection failed: refused"));
    }
}
