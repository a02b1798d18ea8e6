//! Conversation controller: the turn lifecycle around the message log.
//!
//! A turn goes `Idle -> AwaitingReply -> Idle`. The user message is appended
//! as soon as it is submitted; reply resolution is serialized so replies land
//! in submission order even when a second message arrives mid-turn.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::StdRng;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use minichat_core::config::MinichatConfig;
use minichat_core::events::ChatEvent;
use minichat_core::types::{ConversationSettings, Message};
use minichat_storage::{KeyValueStore, MessageStore, SettingsStore};

use crate::error::ChatError;
use crate::policy::ReplyPolicy;
use crate::remote::{CompletionTransport, RemoteCompletion};
use crate::timing::Delay;

/// Capacity of the event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Owns the message log, the settings, and the reply policy for one conversation.
pub struct ConversationController {
    store: Mutex<MessageStore>,
    settings_store: SettingsStore,
    settings: Mutex<ConversationSettings>,
    policy: ReplyPolicy,
    /// Held while a reply is being resolved.
    reply_lock: tokio::sync::Mutex<()>,
    /// Submitted turns whose reply has not been appended yet.
    pending: AtomicUsize,
    events: broadcast::Sender<ChatEvent>,
}

impl ConversationController {
    /// Build a controller, rehydrating the log and settings from `kv`.
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        transport: Arc<dyn CompletionTransport>,
        config: &MinichatConfig,
    ) -> Result<Self, ChatError> {
        config.validate()?;

        let store = MessageStore::open(Arc::clone(&kv));
        let settings_store = SettingsStore::new(kv);
        let settings = settings_store.load();
        info!(messages = store.len(), settings = %settings, "Conversation loaded");

        let remote = RemoteCompletion::new(transport, config.remote.clone());
        let policy = ReplyPolicy::new(remote, config.reply.clone());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            store: Mutex::new(store),
            settings_store,
            settings: Mutex::new(settings),
            policy,
            reply_lock: tokio::sync::Mutex::new(()),
            pending: AtomicUsize::new(0),
            events,
        })
    }

    /// Replace the delay primitive used for simulated latency.
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.policy = self.policy.with_delay(delay);
        self
    }

    /// Replace the random source.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.policy = self.policy.with_rng(rng);
        self
    }

    /// Receive lifecycle events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Submit user text and wait for its reply.
    ///
    /// Blank input is ignored (`Ok(None)`). Otherwise returns the bot message
    /// appended for this turn. Reply failures are turned into a warning
    /// message; only storage failures surface as errors.
    pub async fn submit(&self, text: &str) -> Result<Option<Message>, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank submission");
            return Ok(None);
        }

        let turn_id = Uuid::new_v4();
        let (history, user_msg) = {
            let mut store = self.lock_store()?;
            let history = store.recent(self.policy.context_messages()).to_vec();
            let user_msg = store.append(Message::user(text))?.clone();
            (history, user_msg)
        };
        debug!(%turn_id, chars = text.chars().count(), "User message appended");
        self.emit(ChatEvent::MessageAppended(user_msg));

        self.pending.fetch_add(1, Ordering::SeqCst);
        self.emit(ChatEvent::TypingStarted);

        let result = self.resolve_reply(turn_id, text, &history).await;

        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.emit(ChatEvent::TypingEnded);
        }

        result.map(Some)
    }

    async fn resolve_reply(
        &self,
        turn_id: Uuid,
        text: &str,
        history: &[Message],
    ) -> Result<Message, ChatError> {
        let _turn = self.reply_lock.lock().await;

        let settings = self.settings();
        let outcome = self.policy.reply(text, history, &settings).await;
        debug!(%turn_id, source = ?outcome.source, "Reply resolved");

        let bot_msg = {
            let mut store = self.lock_store()?;
            store.append(Message::bot(outcome.text))?.clone()
        };
        self.emit(ChatEvent::MessageAppended(bot_msg.clone()));
        Ok(bot_msg)
    }

    /// Store a credential (trimmed). Does not change remote mode.
    pub fn set_credential(&self, credential: &str) -> Result<(), ChatError> {
        let stored = self.settings_store.set_credential(credential)?;
        info!(present = stored.is_some(), "Credential updated");
        self.lock_settings()?.credential = stored;
        Ok(())
    }

    /// Turn remote mode on or off.
    ///
    /// Turning it on needs a non-blank credential, either already stored or
    /// passed as `supplied` (which is then stored). Without one the call is a
    /// no-op. Returns whether remote mode is on afterwards.
    pub fn set_remote_enabled(&self, on: bool, supplied: Option<&str>) -> Result<bool, ChatError> {
        if on {
            if let Some(credential) = supplied.filter(|c| !c.trim().is_empty()) {
                self.set_credential(credential)?;
            }
            let mut settings = self.lock_settings()?;
            if !settings.has_credential() {
                info!("Remote mode not enabled: no credential");
                return Ok(settings.uses_remote());
            }
            self.settings_store.set_remote_enabled(true)?;
            settings.remote_enabled = true;
        } else {
            self.settings_store.set_remote_enabled(false)?;
            self.lock_settings()?.remote_enabled = false;
        }
        info!(remote_enabled = on, "Remote mode toggled");
        Ok(on)
    }

    /// Empty the log. Settings are untouched. A reply still in flight is
    /// appended to the cleared log when it resolves.
    pub fn clear_history(&self) -> Result<(), ChatError> {
        self.lock_store()?.clear()?;
        info!("History cleared");
        self.emit(ChatEvent::HistoryCleared);
        Ok(())
    }

    /// Re-read the log from storage, replacing the in-memory copy.
    pub fn reload(&self) -> Result<Vec<Message>, ChatError> {
        Ok(self.lock_store()?.load().to_vec())
    }

    /// Snapshot of the log.
    pub fn messages(&self) -> Vec<Message> {
        let store = self.store.lock().unwrap_or_else(|e| {
            warn!("Message store lock poisoned, reading last state");
            e.into_inner()
        });
        store.messages().to_vec()
    }

    /// Snapshot of the settings.
    pub fn settings(&self) -> ConversationSettings {
        self.settings
            .lock()
            .unwrap_or_else(|e| {
                warn!("Settings lock poisoned, reading last state");
                e.into_inner()
            })
            .clone()
    }

    /// Whether any submitted turn is still waiting for its reply.
    pub fn is_reply_in_flight(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    // -- Private helpers --

    fn emit(&self, event: ChatEvent) {
        debug!(event = event.name(), "Emitting chat event");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, MessageStore>, ChatError> {
        self.store
            .lock()
            .map_err(|e| ChatError::StorageError(format!("message store lock poisoned: {}", e)))
    }

    fn lock_settings(&self) -> Result<MutexGuard<'_, ConversationSettings>, ChatError> {
        self.settings
            .lock()
            .map_err(|e| ChatError::StorageError(format!("settings lock poisoned: {}", e)))
    }
}

// =============================================================================
// Tests
// =============================================================================
