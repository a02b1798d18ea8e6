//! Shared types, configuration, events, and errors for minichat.

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::MinichatConfig;
pub use error::{MinichatError, Result};
pub use events::ChatEvent;
pub use types::*;
