//! minichat storage crate - durable key-value substrate and the stores built on it.
//!
//! Provides a WAL-mode SQLite key-value table with migrations, an in-memory
//! store for tests, the append-only [`MessageStore`], and the
//! [`SettingsStore`] for the reply-routing settings.

pub mod db;
pub mod kv;
pub mod message_store;
pub mod migrations;
pub mod settings;

pub use db::Database;
pub use kv::{KeyValueStore, MemoryStore};
pub use message_store::{MessageStore, MESSAGES_KEY};
pub use settings::{SettingsStore, AI_ENABLED_KEY, API_KEY_KEY};
