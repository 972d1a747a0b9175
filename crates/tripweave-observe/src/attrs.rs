//! Span attribute names for agent invocations and pipeline runs.
//!
//! GenAI names follow the OpenTelemetry GenAI semantic conventions; the
//! `tripweave.*` names are planner-specific. Fields recorded after span
//! creation must be declared on the span as `tracing::field::Empty`.

// --- GenAI conventions ---

/// The name of the operation being performed (e.g., "invoke_agent").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the completion backend (e.g., "openai").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The agent role name (e.g., "weather").
pub const GEN_AI_AGENT_NAME: &str = "gen_ai.agent.name";

/// The model ID requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

// --- Planner attributes ---

/// Number of lookups actually performed before the completion call.
pub const TRIPWEAVE_LOOKUP_COUNT: &str = "tripweave.lookup.count";

/// Number of those lookups that failed.
pub const TRIPWEAVE_LOOKUP_FAILED: &str = "tripweave.lookup.failed";

/// "success" or "failure".
pub const TRIPWEAVE_INVOCATION_OUTCOME: &str = "tripweave.invocation.outcome";

/// Machine-readable failure kind (see `InvocationError::kind`).
pub const TRIPWEAVE_ERROR_KIND: &str = "tripweave.error.kind";

/// Pipeline run identifier.
pub const TRIPWEAVE_RUN_ID: &str = "tripweave.run.id";

/// Final pipeline status.
pub const TRIPWEAVE_PIPELINE_STATUS: &str = "tripweave.pipeline.status";

// --- Operation and outcome values ---

/// Agent invocation operation.
pub const OP_INVOKE_AGENT: &str = "invoke_agent";

/// Whole planning pipeline.
pub const OP_PLAN_TRIP: &str = "plan_trip";

/// Follow-up question answering.
pub const OP_FOLLOW_UP: &str = "follow_up";

pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_FAILURE: &str = "failure";
