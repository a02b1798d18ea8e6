//! Canned replies for when no remote model is in use.
//!
//! Rules are plain case-insensitive substring checks in fixed priority, so
//! "this" counts as a greeting just like "hi".

use chrono::Local;
use rand::Rng;

pub const GREETING_REPLY: &str = "Hi, What can I help you with";
pub const WEATHER_REPLY: &str = "I am a simple bot. I can only talk a little and save the message";
const TIME_REPLY_PREFIX: &str = "Now it is ";

/// Acknowledgment templates; `{q}` is replaced with the user's text.
pub const ACK_TEMPLATES: [&str; 3] = [
    "Interesting! You wrote \"{q}\". Can you tell more?",
    "Understood: \"{q}\". Wanna add something more?",
    "Oke, got it: \"{q}\".",
];

/// Pattern-matched reply generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalHeuristic;

impl LocalHeuristic {
    pub fn new() -> Self {
        Self
    }

    /// Produce a reply for `text`. Only the fallback branch consumes `rng`.
    pub fn reply<R: Rng>(&self, text: &str, rng: &mut R) -> String {
        let lower = text.to_lowercase();

        if lower.contains("hi") || lower.contains("hello") {
            return GREETING_REPLY.to_string();
        }
        if lower.contains("weather") {
            return WEATHER_REPLY.to_string();
        }
        if lower.contains("time") {
            return format!("{}{}", TIME_REPLY_PREFIX, Local::now().format("%H:%M:%S"));
        }

        let template = ACK_TEMPLATES[rng.random_range(0..ACK_TEMPLATES.len())];
        template.replacen("{q}", text, 1)
    }
}
