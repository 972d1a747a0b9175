//! Conversation identity and snapshot types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::trip::TripRequest;

/// Identifies one conversation of one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationKey {
    pub user_id: String,
    pub conversation_id: String,
}

impl ConversationKey {
    pub fn new(user_id: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            conversation_id: conversation_id.into(),
        }
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.conversation_id)
    }
}

/// A follow-up question and the answer it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpTurn {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// Read-only copy of a conversation's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub key: ConversationKey,
    pub trip: Option<TripRequest>,
    pub plan: Option<String>,
    pub turns: Vec<FollowUpTurn>,
}

impl SessionSnapshot {
    pub fn empty(key: ConversationKey) -> Self {
        Self {
            key,
            trip: None,
            plan: None,
            turns: Vec::new(),
        }
    }
}
