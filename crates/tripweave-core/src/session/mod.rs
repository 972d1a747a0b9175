//! Conversation state and the cache that holds it.

pub mod cache;
pub mod context;

pub use cache::{ConversationCache, ConversationHandle};
pub use context::SessionContext;
