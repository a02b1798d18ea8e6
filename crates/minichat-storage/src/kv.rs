//! Durable key-value substrate.
//!
//! The conversation log and the settings live under independent string keys,
//! each value written wholesale.

use std::collections::HashMap;
use std::sync::Mutex;

use minichat_core::error::MinichatError;

/// String-keyed storage with whole-value writes.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, MinichatError>;

    /// Overwrite a value.
    fn set(&self, key: &str, value: &str) -> Result<(), MinichatError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), MinichatError>;
}

/// Process-local store, used by tests and as a fallback substrate.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, MinichatError> {
        self.entries
            .lock()
            .map_err(|e| MinichatError::Storage(format!("memory store lock poisoned: {}", e)))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, MinichatError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MinichatError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MinichatError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
