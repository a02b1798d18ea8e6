//! Append-only conversation log with wholesale persistence.
//!
//! Every mutation rewrites the whole serialized log under [`MESSAGES_KEY`].
//! The log is bounded by a single user's usage, so the O(n) write per append
//! is acceptable.

use std::sync::Arc;

use tracing::{debug, warn};

use minichat_core::error::MinichatError;
use minichat_core::types::Message;

use crate::kv::KeyValueStore;

/// Key holding the JSON array of messages.
pub const MESSAGES_KEY: &str = "messages";

/// Ordered message log mirrored to a [`KeyValueStore`].
pub struct MessageStore {
    kv: Arc<dyn KeyValueStore>,
    messages: Vec<Message>,
}

impl MessageStore {
    /// Create a store and rehydrate it from `kv`.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            kv,
            messages: Vec::new(),
        };
        store.load();
        store
    }

    /// Replace the in-memory log with the persisted one.
    ///
    /// A missing key, a read failure, or unparseable content all yield an
    /// empty log.
    pub fn load(&mut self) -> &[Message] {
        self.messages = read_persisted(self.kv.as_ref());
        debug!(count = self.messages.len(), "Message log loaded");
        &self.messages
    }

    /// Append `msg` and persist the whole log.
    ///
    /// `msg.time` is raised to the previous entry's time if the clock went
    /// backwards. On a persistence failure the message is dropped from memory
    /// again so both copies stay identical.
    pub fn append(&mut self, mut msg: Message) -> Result<&Message, MinichatError> {
        if let Some(last) = self.messages.last() {
            if msg.time < last.time {
                msg.time = last.time;
            }
        }

        self.messages.push(msg);
        if let Err(e) = self.persist() {
            self.messages.pop();
            return Err(e);
        }

        let idx = self.messages.len() - 1;
        Ok(&self.messages[idx])
    }

    /// Empty the log and persist the empty array.
    pub fn clear(&mut self) -> Result<(), MinichatError> {
        let previous = std::mem::take(&mut self.messages);
        if let Err(e) = self.persist() {
            self.messages = previous;
            return Err(e);
        }
        debug!(removed = previous.len(), "Message log cleared");
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn persist(&self) -> Result<(), MinichatError> {
        let json = serde_json::to_string(&self.messages)?;
        self.kv.set(MESSAGES_KEY, &json)
    }
}

/// Parse the persisted log, treating every failure as "no history".
fn read_persisted(kv: &dyn KeyValueStore) -> Vec<Message> {
    let raw = match kv.get(MESSAGES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read message log, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Message>>(&raw) {
        Ok(messages) => messages,
        Err(e) => {
            warn!(error = %e, "Persisted message log is corrupt, starting empty");
            Vec::new()
        }
    }
}
