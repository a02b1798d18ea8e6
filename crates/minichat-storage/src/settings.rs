//! Persistence for [`ConversationSettings`].
//!
//! Stored under two keys independent of the message log, so clearing the
//! history never touches them.

use std::sync::Arc;

use tracing::warn;

use minichat_core::error::MinichatError;
use minichat_core::types::ConversationSettings;

use crate::kv::KeyValueStore;

/// `"1"` when remote mode is on, `"0"` (or absent) otherwise.
pub const AI_ENABLED_KEY: &str = "ai_enabled";
/// Trimmed bearer credential. Absent means no credential.
pub const API_KEY_KEY: &str = "api_key";

/// Reads and writes the reply-routing settings.
pub struct SettingsStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Read both settings. Read failures fall back to the defaults.
    pub fn load(&self) -> ConversationSettings {
        let remote_enabled = match self.kv.get(AI_ENABLED_KEY) {
            Ok(value) => value.as_deref() == Some("1"),
            Err(e) => {
                warn!(error = %e, "Failed to read remote-mode flag, assuming off");
                false
            }
        };

        let credential = match self.kv.get(API_KEY_KEY) {
            Ok(value) => value.filter(|k| !k.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read credential, assuming none");
                None
            }
        };

        ConversationSettings {
            remote_enabled,
            credential,
        }
    }

    pub fn set_remote_enabled(&self, on: bool) -> Result<(), MinichatError> {
        self.kv.set(AI_ENABLED_KEY, if on { "1" } else { "0" })
    }

    /// Store the trimmed credential. A blank credential removes the key.
    ///
    /// Returns the value actually stored.
    pub fn set_credential(&self, credential: &str) -> Result<Option<String>, MinichatError> {
        let trimmed = credential.trim();
        if trimmed.is_empty() {
            self.kv.remove(API_KEY_KEY)?;
            Ok(None)
        } else {
            self.kv.set(API_KEY_KEY, trimmed)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    fn store() -> (Arc<dyn KeyValueStore>, SettingsStore) {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        (Arc::clone(&kv), SettingsStore::new(kv))
    }

    #[test]
    fn test_defaults_when_absent() {
        let (_, settings) = store();
        assert_eq!(settings.load(), ConversationSettings::default());
    }

    #[test]
    fn test_flag_encoding() {
        let (kv, settings) = store();
        settings.set_remote_enabled(true).unwrap();
        assert_eq!(kv.get(AI_ENABLED_KEY).unwrap().as_deref(), Some("1"));
        assert!(settings.load().remote_enabled);

        settings.set_remote_enabled(false).unwrap();
        assert_eq!(kv.get(AI_ENABLED_KEY).unwrap().as_deref(), Some("0"));
        assert!(!settings.load().remote_enabled);
    }

    #[test]
    fn test_unexpected_flag_value_is_off() {
        let (kv, settings) = store();
        kv.set(AI_ENABLED_KEY, "true").unwrap();
        assert!(!settings.load().remote_enabled);
    }

    #[test]
    fn test_credential_trimmed() {
        let (kv, settings) = store();
        let stored = settings.set_credential("  sk-abc \n").unwrap();
        assert_eq!(stored.as_deref(), Some("sk-abc"));
        assert_eq!(kv.get(API_KEY_KEY).unwrap().as_deref(), Some("sk-abc"));
        assert_eq!(settings.load().credential.as_deref(), Some("sk-abc"));
    }

    #[test]
    fn test_blank_credential_removes_key() {
        let (kv, settings) = store();
        settings.set_credential("sk-abc").unwrap();
        assert_eq!(settings.set_credential("   ").unwrap(), None);
        assert_eq!(kv.get(API_KEY_KEY).unwrap(), None);
        assert!(settings.load().credential.is_none());
    }

    #[test]
    fn test_setting_credential_does_not_enable_remote() {
        let (_, settings) = store();
        settings.set_credential("sk-abc").unwrap();
        assert!(!settings.load().remote_enabled);
    }
}
