//! Coordinator: runs a `WorkflowPlan` phase by phase for one trip request.
//!
//! Each phase receives the trip block plus every prior phase's joined text,
//! runs its members through the tolerant join, and is fully joined before
//! the next phase is dispatched. Member failures become placeholders; the
//! run always continues to the end and always yields a merged plan.

pub mod follow_up;
pub mod join;
pub mod merge;
pub mod plan;

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, field, info, info_span, warn};
use uuid::Uuid;

use tripweave_observe::attrs;
use tripweave_types::conversation::ConversationKey;
use tripweave_types::error::{ConfigError, PlannerError};
use tripweave_types::event::PlannerEvent;
use tripweave_types::phase::{PhaseReport, PhaseStatus, PipelineOutcome, PipelineStatus};
use tripweave_types::trip::TripRequest;

use crate::agent::invoker::AgentInvoker;
use crate::agent::prompt::InputBuilder;
use crate::agent::roles::RoleRegistry;
use crate::agent::tools::ToolBinding;
use crate::event::EventBus;

use self::join::{JoinContext, MemberTask, join_all_tolerant};
use self::plan::WorkflowPlan;

pub use self::follow_up::FollowUpWorkflow;

/// Default number of attempts per member (one retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default bound on concurrently running invocations.
pub const DEFAULT_MAX_PARALLEL: usize = 4;

/// Runs planning pipelines. Cheap to clone; all state is shared.
#[derive(Debug, Clone)]
pub struct Coordinator {
    invoker: AgentInvoker,
    roles: Arc<RoleRegistry>,
    plan: Arc<WorkflowPlan>,
    events: EventBus,
    semaphore: Arc<Semaphore>,
    max_attempts: u32,
}

impl Coordinator {
    /// Build a coordinator, rejecting plans it could not run.
    ///
    /// Fails when the plan is invalid for `roles`, or when a planned role
    /// needs lookups and the invoker has no lookup service.
    pub fn new(
        invoker: AgentInvoker,
        roles: Arc<RoleRegistry>,
        plan: WorkflowPlan,
        events: EventBus,
        max_attempts: u32,
        max_parallel: usize,
    ) -> Result<Self, ConfigError> {
        plan.validate(&roles)?;
        if !invoker.has_lookup() {
            if let Some(role) = plan.lookup_roles(&roles).next() {
                return Err(ConfigError::LookupUnavailable(role.to_string()));
            }
        }
        if max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".to_string()));
        }
        if max_parallel == 0 {
            return Err(ConfigError::Invalid(
                "max_parallel_invocations must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            invoker,
            roles,
            plan: Arc::new(plan),
            events,
            semaphore: Arc::new(Semaphore::new(max_parallel)),
            max_attempts,
        })
    }

    pub fn plan(&self) -> &WorkflowPlan {
        &self.plan
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    /// Run the plan for `trip`.
    pub async fn run(
        &self,
        conversation: &ConversationKey,
        trip: &TripRequest,
    ) -> Result<PipelineOutcome, PlannerError> {
        self.run_with_cancel(conversation, trip, &CancellationToken::new())
            .await
    }

    /// Run the plan; cancelling `cancel` fails every not-yet-finished member.
    ///
    /// Only validation errors are returned as `Err`. Invocation failures
    /// degrade the outcome instead.
    pub async fn run_with_cancel(
        &self,
        conversation: &ConversationKey,
        trip: &TripRequest,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutcome, PlannerError> {
        trip.validate()?;

        let run_id = Uuid::now_v7();
        let span = info_span!(
            "tripweave.plan_trip",
            gen_ai.operation.name = attrs::OP_PLAN_TRIP,
            tripweave.run.id = %run_id,
            conversation = %conversation,
            tripweave.pipeline.status = field::Empty,
        );

        let outcome = self
            .execute(run_id, conversation, trip, cancel)
            .instrument(span.clone())
            .await;

        span.record(attrs::TRIPWEAVE_PIPELINE_STATUS, field::debug(outcome.status));
        Ok(outcome)
    }

    async fn execute(
        &self,
        run_id: Uuid,
        conversation: &ConversationKey,
        trip: &TripRequest,
        cancel: &CancellationToken,
    ) -> PipelineOutcome {
        let start = Instant::now();
        let phases = self.plan.phases();
        self.events.publish(PlannerEvent::PipelineStarted {
            run_id,
            conversation: conversation.to_string(),
            phase_count: phases.len(),
        });
        info!(%run_id, phases = phases.len(), "pipeline started");

        let ctx = JoinContext {
            invoker: self.invoker.clone(),
            events: self.events.clone(),
            semaphore: self.semaphore.clone(),
            cancel: cancel.child_token(),
            max_attempts: self.max_attempts,
        };

        let mut reports: Vec<PhaseReport> = Vec::with_capacity(phases.len());
        for phase in phases {
            let role_names = phase.step.roles();
            self.events.publish(PlannerEvent::PhaseStarted {
                run_id,
                phase: phase.name.clone(),
                roles: role_names.to_vec(),
            });

            let input: Arc<str> = Arc::from(InputBuilder::phase(trip, &reports));
            let members = role_names
                .iter()
                .filter_map(|name| self.roles.get(name))
                .map(|role| MemberTask {
                    run_id,
                    phase: phase.name.clone(),
                    role: role.clone(),
                    input: Arc::clone(&input),
                    binding: ToolBinding::for_member(role, trip),
                })
                .collect();

            let results = join_all_tolerant(&ctx, members).await;
            let status = PhaseStatus::from_members(&results);
            let joined_text = merge::join_members(&self.roles, &results);

            self.events.publish(PlannerEvent::PhaseJoined {
                run_id,
                phase: phase.name.clone(),
                status,
            });
            match status {
                PhaseStatus::Succeeded => info!(phase = %phase.name, "phase joined"),
                PhaseStatus::Degraded | PhaseStatus::Failed => {
                    warn!(phase = %phase.name, ?status, "phase joined with failures")
                }
            }

            reports.push(PhaseReport {
                phase: phase.name.clone(),
                members: results,
                joined_text,
                status,
            });
        }

        let merged = merge::merge_plan(&self.roles, trip, &reports);
        let outcome = PipelineOutcome::new(run_id, merged, reports);
        let duration_ms = start.elapsed().as_millis() as u64;

        self.events.publish(PlannerEvent::PipelineFinished {
            run_id,
            status: outcome.status,
            duration_ms,
        });
        match outcome.status {
            PipelineStatus::Complete => info!(%run_id, duration_ms, "pipeline complete"),
            status => warn!(%run_id, duration_ms, ?status, "pipeline finished degraded"),
        }
        outcome
    }
}
