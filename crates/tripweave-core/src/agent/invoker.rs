//! Agent role invocation wrapper.
//!
//! `AgentInvoker::invoke` runs exactly one completion call for a role,
//! preceded by the role's bound lookups when it has lookup capability.
//! Every failure path ends in a failed `PhaseResult`; nothing is returned
//! as `Err` and nothing is retried here.

use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, field, info_span, warn};

use tripweave_observe::attrs;
use tripweave_types::error::{InvocationError, ServiceError};
use tripweave_types::llm::{CompletionRequest, ToolResult};
use tripweave_types::lookup::LookupRequest;
use tripweave_types::phase::PhaseResult;
use tripweave_types::role::AgentRoleConfig;

use crate::agent::tools::ToolBinding;
use crate::llm::BoxCompletionService;
use crate::lookup::BoxLookupService;

/// Default per-invocation deadline.
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(45);

/// Runs role invocations against the configured collaborators.
///
/// Cheap to clone: both services are `Arc`-backed.
#[derive(Debug, Clone)]
pub struct AgentInvoker {
    completion: BoxCompletionService,
    lookup: Option<BoxLookupService>,
    timeout: Duration,
}

impl AgentInvoker {
    pub fn new(
        completion: BoxCompletionService,
        lookup: Option<BoxLookupService>,
        timeout: Duration,
    ) -> Self {
        Self {
            completion,
            lookup,
            timeout,
        }
    }

    pub fn has_lookup(&self) -> bool {
        self.lookup.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke `role` once with `input`, without external cancellation.
    pub async fn invoke(
        &self,
        role: &AgentRoleConfig,
        input: &str,
        tools: Option<&ToolBinding>,
    ) -> PhaseResult {
        self.invoke_with_cancel(role, input, tools, &CancellationToken::new())
            .await
    }

    /// Invoke `role` once, giving up on timeout or when `cancel` fires.
    pub async fn invoke_with_cancel(
        &self,
        role: &AgentRoleConfig,
        input: &str,
        tools: Option<&ToolBinding>,
        cancel: &CancellationToken,
    ) -> PhaseResult {
        let start = Instant::now();
        let span = info_span!(
            "gen_ai.invoke_agent",
            gen_ai.operation.name = attrs::OP_INVOKE_AGENT,
            gen_ai.provider.name = self.completion.name(),
            gen_ai.agent.name = %role.name,
            tripweave.lookup.count = field::Empty,
            tripweave.lookup.failed = field::Empty,
            tripweave.invocation.outcome = field::Empty,
            tripweave.error.kind = field::Empty,
        );

        let outcome = async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(InvocationError::Cancelled),
                result = tokio::time::timeout(self.timeout, self.run(role, input, tools)) => {
                    result.unwrap_or(Err(InvocationError::Timeout {
                        secs: self.timeout.as_secs(),
                    }))
                }
            }
        }
        .instrument(span.clone())
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(text) => {
                span.record(attrs::TRIPWEAVE_INVOCATION_OUTCOME, attrs::OUTCOME_SUCCESS);
                debug!(role = %role.name, duration_ms, "invocation succeeded");
                PhaseResult::succeeded(role.name.clone(), text, 1, duration_ms)
            }
            Err(error) => {
                span.record(attrs::TRIPWEAVE_INVOCATION_OUTCOME, attrs::OUTCOME_FAILURE);
                span.record(attrs::TRIPWEAVE_ERROR_KIND, error.kind());
                warn!(role = %role.name, duration_ms, error = %error, "invocation failed");
                PhaseResult::failed(role.name.clone(), error, 1, duration_ms)
            }
        }
    }

    async fn run(
        &self,
        role: &AgentRoleConfig,
        input: &str,
        tools: Option<&ToolBinding>,
    ) -> Result<String, InvocationError> {
        let tool_results = match tools {
            Some(binding) if role.capabilities.needs_lookup() => {
                self.run_lookups(role, binding).await?
            }
            _ => Vec::new(),
        };

        let request = CompletionRequest {
            role: role.name.clone(),
            system: role.instructions.clone(),
            goal: role.goal.clone(),
            message: input.to_string(),
            tool_results,
        };

        let output = self.completion.complete(&request).await?;
        Ok(output.normalize())
    }

    /// Run the allowed lookups concurrently.
    ///
    /// Partial failures are kept as failed tool results; if every lookup
    /// fails the first failure becomes the invocation error.
    async fn run_lookups(
        &self,
        role: &AgentRoleConfig,
        binding: &ToolBinding,
    ) -> Result<Vec<ToolResult>, InvocationError> {
        let requests: Vec<&LookupRequest> = binding.allowed_by(&role.capabilities).collect();
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let Some(lookup) = &self.lookup else {
            return Err(ServiceError::Provider(format!(
                "no lookup service configured for role '{}'",
                role.name
            ))
            .into());
        };

        let results = join_all(requests.iter().map(|req| lookup.lookup(req))).await;

        let mut tool_results = Vec::with_capacity(requests.len());
        let mut first_error = None;
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(found) => tool_results.push(ToolResult::from_result(request, found)),
                Err(e) => {
                    warn!(role = %role.name, lookup = %request.describe(), error = %e, "lookup failed");
                    tool_results.push(ToolResult::from_failure(request, &e));
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        let failed = tool_results.iter().filter(|t| t.failed).count();
        let span = tracing::Span::current();
        span.record(attrs::TRIPWEAVE_LOOKUP_COUNT, tool_results.len());
        span.record(attrs::TRIPWEAVE_LOOKUP_FAILED, failed);

        match first_error {
            Some(error) if failed == tool_results.len() => Err(error.into()),
            _ => Ok(tool_results),
        }
    }
}
