//! Error taxonomy for Tripweave.
//!
//! Collaborator and invocation failures degrade a run; validation and
//! configuration failures are returned to the caller before any work starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a collaborator (completion or lookup service).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ServiceError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Only transient failures (network, timeout, rate limiting) are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Transient(_))
    }
}

/// Failure of a single agent role invocation.
///
/// Never escapes the coordinator's join step: it is recorded on the
/// `PhaseResult` and replaced by a placeholder in the joined text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("cancelled")]
    Cancelled,

    #[error("task panicked: {0}")]
    Panicked(String),
}

impl InvocationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            InvocationError::Service(e) => e.is_retryable(),
            InvocationError::Timeout { .. } => true,
            InvocationError::Cancelled | InvocationError::Panicked(_) => false,
        }
    }

    /// Short machine-readable kind, used in logs and API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationError::Service(ServiceError::Auth(_)) => "auth",
            InvocationError::Service(ServiceError::Transient(_)) => "transient",
            InvocationError::Service(ServiceError::Provider(_)) => "provider",
            InvocationError::Service(ServiceError::NotFound(_)) => "not_found",
            InvocationError::Timeout { .. } => "timeout",
            InvocationError::Cancelled => "cancelled",
            InvocationError::Panicked(_) => "panicked",
        }
    }
}

/// Malformed user input, rejected before any phase runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("origin must not be blank")]
    BlankOrigin,

    #[error("at least one destination is required")]
    NoDestination,

    #[error("destination #{0} is blank")]
    BlankDestination(usize),

    #[error("start date {start} is after end date {end}")]
    InvertedDates { start: String, end: String },

    #[error("budget must be a non-negative number, got {0}")]
    InvalidBudget(String),

    #[error("question must not be blank")]
    BlankQuestion,

    #[error("conversation '{0}' has no travel plan yet; start planning first")]
    NoPlan(String),
}

/// Missing or inconsistent configuration. Fatal: no invocation is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing credentials: {}", .0.join(", "))]
    MissingCredential(Vec<String>),

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("workflow has no phases")]
    EmptyWorkflow,

    #[error("phase '{0}' has an empty role group")]
    EmptyParallelGroup(String),

    #[error("role '{role}' appears twice in phase '{phase}'")]
    DuplicateRole { phase: String, role: String },

    #[error("role '{0}' needs external lookups but no lookup service is configured")]
    LookupUnavailable(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors surfaced structurally by the planner entry points.
///
/// Invocation failures are not here: they degrade the outcome instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_retryable() {
        assert!(ServiceError::Transient("reset".into()).is_retryable());
        assert!(!ServiceError::Auth("bad key".into()).is_retryable());
        assert!(!ServiceError::Provider("500".into()).is_retryable());
        assert!(!ServiceError::NotFound("Atlantis".into()).is_retryable());
    }

    #[test]
    fn test_invocation_error_retryable() {
        assert!(InvocationError::Timeout { secs: 45 }.is_retryable());
        assert!(InvocationError::from(ServiceError::Transient("x".into())).is_retryable());
        assert!(!InvocationError::Cancelled.is_retryable());
        assert!(!InvocationError::Panicked("boom".into()).is_retryable());
    }

    #[test]
    fn test_invocation_error_kind() {
        assert_eq!(
            InvocationError::from(ServiceError::NotFound("x".into())).kind(),
            "not_found"
        );
        assert_eq!(InvocationError::Timeout { secs: 1 }.kind(), "timeout");
    }

    #[test]
    fn test_missing_credential_display_lists_all() {
        let err = ConfigError::MissingCredential(vec![
            "OPENAI_API_KEY".to_string(),
            "SEARCHAPI_API_KEY".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "missing credentials: OPENAI_API_KEY, SEARCHAPI_API_KEY"
        );
    }

    #[test]
    fn test_planner_error_from_validation() {
        let err: PlannerError = ValidationError::BlankQuestion.into();
        assert!(matches!(err, PlannerError::Validation(ValidationError::BlankQuestion)));
        assert_eq!(err.to_string(), "validation error: question must not be blank");
    }
}
