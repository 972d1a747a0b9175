//! Per-conversation state: the trip, its merged plan and follow-up history.

use chrono::Utc;

use tripweave_types::conversation::{ConversationKey, FollowUpTurn, SessionSnapshot};
use tripweave_types::error::{PlannerError, ValidationError};
use tripweave_types::trip::TripRequest;

use crate::agent::prompt::InputBuilder;

/// Default number of recent turns included in follow-up input.
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 6;

/// State for one conversation.
///
/// Owned by a `ConversationHandle`, which serializes access per key.
#[derive(Debug, Clone)]
pub struct SessionContext {
    key: ConversationKey,
    trip: Option<TripRequest>,
    plan: Option<String>,
    turns: Vec<FollowUpTurn>,
    max_history_turns: usize,
}

impl SessionContext {
    pub fn new(key: ConversationKey, max_history_turns: usize) -> Self {
        Self {
            key,
            trip: None,
            plan: None,
            turns: Vec::new(),
            max_history_turns,
        }
    }

    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    pub fn trip(&self) -> Option<&TripRequest> {
        self.trip.as_ref()
    }

    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }

    pub fn turns(&self) -> &[FollowUpTurn] {
        &self.turns
    }

    pub fn has_plan(&self) -> bool {
        self.plan.is_some()
    }

    /// Replace the trip and plan after a planning run. Turns are kept.
    pub fn update_from_pipeline(&mut self, trip: TripRequest, merged_plan: String) {
        self.trip = Some(trip);
        self.plan = Some(merged_plan);
    }

    pub fn append_turn(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(FollowUpTurn {
            question: question.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
        });
    }

    /// Follow-up input: plan, trip basics, recent turns, then the question.
    pub fn build_follow_up_input(&self, question: &str) -> Result<String, PlannerError> {
        if question.trim().is_empty() {
            return Err(ValidationError::BlankQuestion.into());
        }
        let plan = self
            .plan
            .as_deref()
            .ok_or_else(|| ValidationError::NoPlan(self.key.to_string()))?;

        let window_start = self.turns.len().saturating_sub(self.max_history_turns);
        Ok(InputBuilder::follow_up(
            plan,
            self.trip.as_ref(),
            &self.turns[window_start..],
            question,
        ))
    }

    /// Clear plan, trip and turns together.
    pub fn reset(&mut self) {
        self.trip = None;
        self.plan = None;
        self.turns.clear();
    }

    /// Load trip, plan and turns from a snapshot of the same conversation.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.trip = snapshot.trip;
        self.plan = snapshot.plan;
        self.turns = snapshot.turns;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            key: self.key.clone(),
            trip: self.trip.clone(),
            plan: self.plan.clone(),
            turns: self.turns.clone(),
        }
    }
}
