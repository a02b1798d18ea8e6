//! Reply generation and conversation state for minichat.
//!
//! Owns the turn lifecycle: appending user messages, choosing between the
//! local heuristic and the remote completion service, and delivering the bot
//! reply with lifecycle events for the renderer.

pub mod controller;
pub mod error;
pub mod heuristic;
pub mod policy;
pub mod remote;
pub mod timing;

pub use controller::ConversationController;
pub use error::{ChatError, CompletionError};
pub use heuristic::LocalHeuristic;
pub use policy::{ReplyOutcome, ReplyPolicy, ReplySource};
pub use remote::{
    CompletionRequest, CompletionTransport, HttpTransport, RemoteCompletion, TransportResponse,
    WireMessage,
};
pub use timing::{Delay, TokioDelay};
