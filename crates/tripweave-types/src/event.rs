//! Event types for the Tripweave planner event bus.
//!
//! `PlannerEvent` is broadcast while a pipeline runs and when follow-ups are
//! answered. All variants are Clone + Send + Sync for use with tokio
//! broadcast channels.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::phase::{PhaseStatus, PipelineStatus};

/// Progress events emitted by the coordinator and the follow-up workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannerEvent {
    PipelineStarted {
        run_id: Uuid,
        conversation: String,
        phase_count: usize,
    },

    PhaseStarted {
        run_id: Uuid,
        phase: String,
        roles: Vec<String>,
    },

    InvocationStarted {
        run_id: Uuid,
        phase: String,
        role: String,
        attempt: u32,
    },

    InvocationCompleted {
        run_id: Uuid,
        phase: String,
        role: String,
        attempt: u32,
        duration_ms: u64,
    },

    InvocationFailed {
        run_id: Uuid,
        phase: String,
        role: String,
        attempt: u32,
        error: String,
        will_retry: bool,
    },

    /// All members of a phase have finished.
    PhaseJoined {
        run_id: Uuid,
        phase: String,
        status: PhaseStatus,
    },

    PipelineFinished {
        run_id: Uuid,
        status: PipelineStatus,
        duration_ms: u64,
    },

    FollowUpAnswered {
        conversation: String,
        role: String,
        used_lookup: bool,
        degraded: bool,
    },
}

impl PlannerEvent {
    /// Returns the run id for pipeline-scoped events, None for follow-ups.
    pub fn run_id(&self) -> Option<Uuid> {
        match self {
            PlannerEvent::PipelineStarted { run_id, .. }
            | PlannerEvent::PhaseStarted { run_id, .. }
            | PlannerEvent::InvocationStarted { run_id, .. }
            | PlannerEvent::InvocationCompleted { run_id, .. }
            | PlannerEvent::InvocationFailed { run_id, .. }
            | PlannerEvent::PhaseJoined { run_id, .. }
            | PlannerEvent::PipelineFinished { run_id, .. } => Some(*run_id),

            PlannerEvent::FollowUpAnswered { .. } => None,
        }
    }
}
