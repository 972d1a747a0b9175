//! Phase and pipeline result types.
//!
//! A `PhaseResult` is created exactly once per role invocation and never
//! mutated afterwards. Phases collect their members' results in declared
//! role order into a `PhaseReport`; a whole run yields a `PipelineOutcome`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InvocationError;

/// Outcome of one role invocation (after retries, if any).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub role: String,
    /// Normalized output. Empty when the invocation failed.
    pub text: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<InvocationError>,
    /// Number of completion attempts made for this result.
    pub attempts: u32,
    pub duration_ms: u64,
}

impl PhaseResult {
    pub fn succeeded(role: impl Into<String>, text: String, attempts: u32, duration_ms: u64) -> Self {
        Self {
            role: role.into(),
            text,
            success: true,
            error: None,
            attempts,
            duration_ms,
        }
    }

    pub fn failed(
        role: impl Into<String>,
        error: InvocationError,
        attempts: u32,
        duration_ms: u64,
    ) -> Self {
        Self {
            role: role.into(),
            text: String::new(),
            success: false,
            error: Some(error),
            attempts,
            duration_ms,
        }
    }

    /// Whether the failure (if any) is worth another attempt.
    pub fn is_retryable_failure(&self) -> bool {
        !self.success && self.error.as_ref().is_some_and(InvocationError::is_retryable)
    }
}

/// Status of a joined phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    /// Every member succeeded.
    Succeeded,
    /// At least one member succeeded and at least one failed.
    Degraded,
    /// No member succeeded.
    Failed,
}

impl PhaseStatus {
    pub fn from_members(members: &[PhaseResult]) -> Self {
        let ok = members.iter().filter(|m| m.success).count();
        if ok == members.len() && ok > 0 {
            PhaseStatus::Succeeded
        } else if ok > 0 {
            PhaseStatus::Degraded
        } else {
            PhaseStatus::Failed
        }
    }
}

/// A phase after its join point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: String,
    /// Member results in declared role order.
    pub members: Vec<PhaseResult>,
    /// Members' texts (or placeholders) concatenated in declared role order.
    pub joined_text: String,
    pub status: PhaseStatus,
}

/// Status of a whole pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Complete,
    /// Every phase produced something but some members failed.
    Degraded,
    /// At least one phase had no successful member.
    PhaseFailed,
}

impl PipelineStatus {
    pub fn from_phases(phases: &[PhaseReport]) -> Self {
        if phases.iter().any(|p| p.status == PhaseStatus::Failed) {
            PipelineStatus::PhaseFailed
        } else if phases.iter().all(|p| p.status == PhaseStatus::Succeeded) {
            PipelineStatus::Complete
        } else {
            PipelineStatus::Degraded
        }
    }
}

/// Result of a planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    /// Never empty.
    pub merged_plan_text: String,
    /// Every member result, phase order then declared role order.
    pub per_phase_results: Vec<PhaseResult>,
    pub phases: Vec<PhaseReport>,
    pub status: PipelineStatus,
    /// True whenever `status` is not `Complete`.
    pub degraded: bool,
}

impl PipelineOutcome {
    pub fn new(run_id: Uuid, merged_plan_text: String, phases: Vec<PhaseReport>) -> Self {
        let status = PipelineStatus::from_phases(&phases);
        let per_phase_results = phases
            .iter()
            .flat_map(|p| p.members.iter().cloned())
            .collect();
        Self {
            run_id,
            merged_plan_text,
            per_phase_results,
            phases,
            status,
            degraded: status != PipelineStatus::Complete,
        }
    }

    /// Whether the merged plan may replace the conversation's current plan.
    pub fn is_usable(&self) -> bool {
        self.status != PipelineStatus::PhaseFailed
    }
}

/// Result of a follow-up question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpOutcome {
    pub answer: String,
    /// Role that answered (or was asked to).
    pub role: String,
    pub used_lookup: bool,
    pub degraded: bool,
}
