//! N-way "join all, tolerate partial failure" over role invocations.
//!
//! Every member is spawned on a `JoinSet` and gated by a shared `Semaphore`.
//! A member's failure never cancels its siblings, the join waits for every
//! member, and results come back in declared order regardless of which
//! member finished first. A panicked member becomes a failed result in its
//! own slot.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use tripweave_types::error::InvocationError;
use tripweave_types::event::PlannerEvent;
use tripweave_types::phase::PhaseResult;
use tripweave_types::role::AgentRoleConfig;

use crate::agent::invoker::AgentInvoker;
use crate::agent::tools::ToolBinding;
use crate::event::EventBus;

/// Everything one member needs, owned so it can move into a spawned task.
#[derive(Debug, Clone)]
pub struct MemberTask {
    pub run_id: Uuid,
    pub phase: String,
    pub role: AgentRoleConfig,
    pub input: Arc<str>,
    pub binding: Option<ToolBinding>,
}

/// Shared execution resources for a join.
#[derive(Debug, Clone)]
pub struct JoinContext {
    pub invoker: AgentInvoker,
    pub events: EventBus,
    pub semaphore: Arc<Semaphore>,
    pub cancel: CancellationToken,
    /// Attempts per member; only retryable failures get another one.
    pub max_attempts: u32,
}

/// Run all members concurrently and return their results in input order.
pub async fn join_all_tolerant(ctx: &JoinContext, members: Vec<MemberTask>) -> Vec<PhaseResult> {
    let roles: Vec<String> = members.iter().map(|m| m.role.name.clone()).collect();
    let mut slots: Vec<Option<PhaseResult>> = vec![None; members.len()];
    let mut set: JoinSet<(usize, PhaseResult)> = JoinSet::new();
    let mut task_slots: HashMap<Id, usize> = HashMap::with_capacity(members.len());

    for (index, member) in members.into_iter().enumerate() {
        let ctx = ctx.clone();
        let handle = set.spawn(async move { (index, run_member(&ctx, member).await) });
        task_slots.insert(handle.id(), index);
    }

    let mut panics: HashMap<usize, String> = HashMap::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(result);
                }
            }
            Err(join_error) => {
                let task = join_error.id();
                let reason = panic_reason(join_error);
                warn!(%task, %reason, "member task panicked");
                if let Some(&index) = task_slots.get(&task) {
                    panics.insert(index, reason);
                }
            }
        }
    }

    slots
        .into_iter()
        .zip(roles)
        .enumerate()
        .map(|(index, (slot, role))| {
            slot.unwrap_or_else(|| {
                let reason = panics
                    .remove(&index)
                    .unwrap_or_else(|| "task did not complete".to_string());
                PhaseResult::failed(role, InvocationError::Panicked(reason), 1, 0)
            })
        })
        .collect()
}

/// Panic message carried by a failed task, when it is a string.
fn panic_reason(join_error: JoinError) -> String {
    if !join_error.is_panic() {
        return join_error.to_string();
    }
    let payload = join_error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "member task panicked".to_string())
}

/// Invoke one member with the retry policy, publishing progress events.
async fn run_member(ctx: &JoinContext, member: MemberTask) -> PhaseResult {
    let mut attempt: u32 = 1;
    let mut total_ms: u64 = 0;

    loop {
        ctx.events.publish(PlannerEvent::InvocationStarted {
            run_id: member.run_id,
            phase: member.phase.clone(),
            role: member.role.name.clone(),
            attempt,
        });

        let result = match ctx.semaphore.acquire().await {
            Ok(_permit) => {
                ctx.invoker
                    .invoke_with_cancel(&member.role, &member.input, member.binding.as_ref(), &ctx.cancel)
                    .await
            }
            Err(_) => PhaseResult::failed(member.role.name.clone(), InvocationError::Cancelled, 1, 0),
        };
        total_ms += result.duration_ms;

        if result.success {
            ctx.events.publish(PlannerEvent::InvocationCompleted {
                run_id: member.run_id,
                phase: member.phase.clone(),
                role: member.role.name.clone(),
                attempt,
                duration_ms: result.duration_ms,
            });
            return PhaseResult {
                attempts: attempt,
                duration_ms: total_ms,
                ..result
            };
        }

        let will_retry = result.is_retryable_failure()
            && attempt < ctx.max_attempts
            && !ctx.cancel.is_cancelled();
        ctx.events.publish(PlannerEvent::InvocationFailed {
            run_id: member.run_id,
            phase: member.phase.clone(),
            role: member.role.name.clone(),
            attempt,
            error: result
                .error
                .as_ref()
                .map_or_else(String::new, ToString::to_string),
            will_retry,
        });

        if !will_retry {
            return PhaseResult {
                attempts: attempt,
                duration_ms: total_ms,
                ..result
            };
        }

        debug!(role = %member.role.name, attempt, "retrying member after retryable failure");
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::agent::roles::RoleRegistry;
    use crate::llm::BoxCompletionService;
    use crate::test_support::{ScriptedCompletion, Step};
    use tripweave_types::error::ServiceError;

    fn ctx(completion: &ScriptedCompletion, max_attempts: u32, permits: usize) -> JoinContext {
        JoinContext {
            invoker: AgentInvoker::new(
                BoxCompletionService::new(completion.clone()),
                None,
                Duration::from_secs(5),
            ),
            events: EventBus::new(64),
            semaphore: Arc::new(Semaphore::new(permits)),
            cancel: CancellationToken::new(),
            max_attempts,
        }
    }

    fn member(name: &str) -> MemberTask {
        let role = RoleRegistry::builtin()
            .get(name)
            .cloned()
            .unwrap_or_else(|| AgentRoleConfig::new(name, name, name, name));
        MemberTask {
            run_id: Uuid::now_v7(),
            phase: "gather".into(),
            role,
            input: Arc::from("shared input"),
            binding: None,
        }
    }

    #[tokio::test]
    async fn results_follow_declared_order_not_completion_order() {
        let completion = ScriptedCompletion::new();
        completion.set("a", Step::ReplyAfter("A".into(), Duration::from_millis(150)));
        completion.set("b", Step::ReplyAfter("B".into(), Duration::from_millis(10)));
        completion.set("c", Step::ReplyAfter("C".into(), Duration::from_millis(80)));

        let results =
            join_all_tolerant(&ctx(&completion, 1, 4), vec![member("a"), member("b"), member("c")]).await;

        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn members_run_concurrently() {
        let completion = ScriptedCompletion::new();
        for role in ["a", "b", "c"] {
            completion.set(role, Step::ReplyAfter(role.into(), Duration::from_millis(200)));
        }

        let start = std::time::Instant::now();
        join_all_tolerant(&ctx(&completion, 1, 4), vec![member("a"), member("b"), member("c")]).await;
        assert!(start.elapsed() < Duration::from_millis(550));
    }

    #[tokio::test]
    async fn semaphore_bounds_concurrency() {
        let completion = ScriptedCompletion::new();
        for role in ["a", "b"] {
            completion.set(role, Step::ReplyAfter(role.into(), Duration::from_millis(100)));
        }

        let start = std::time::Instant::now();
        join_all_tolerant(&ctx(&completion, 1, 1), vec![member("a"), member("b")]).await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn failing_member_does_not_cancel_siblings() {
        let completion = ScriptedCompletion::new();
        completion.fail("a", ServiceError::Auth("bad key".into()));
        completion.set("b", Step::ReplyAfter("B".into(), Duration::from_millis(50)));

        let results = join_all_tolerant(&ctx(&completion, 2, 4), vec![member("a"), member("b")]).await;

        assert!(!results[0].success);
        assert_eq!(results[0].attempts, 1);
        assert!(results[1].success);
        assert_eq!(results[1].text, "B");
    }

    #[tokio::test]
    async fn transient_failure_is_retried_until_success() {
        let completion = ScriptedCompletion::new();
        completion.push("a", Step::Fail(ServiceError::Transient("reset".into())));
        completion.reply("a", "second time lucky");

        let join_ctx = ctx(&completion, 2, 4);
        let mut rx = join_ctx.events.subscribe();
        let results = join_all_tolerant(&join_ctx, vec![member("a")]).await;

        assert!(results[0].success);
        assert_eq!(results[0].attempts, 2);
        assert_eq!(completion.calls_for("a").len(), 2);

        let mut saw_retry = false;
        while let Ok(event) = rx.try_recv() {
            if let PlannerEvent::InvocationFailed { will_retry, .. } = event {
                saw_retry |= will_retry;
            }
        }
        assert!(saw_retry);
    }

    #[tokio::test]
    async fn retries_stop_at_max_attempts() {
        let completion = ScriptedCompletion::new();
        completion.fail("a", ServiceError::Transient("503".into()));

        let results = join_all_tolerant(&ctx(&completion, 3, 4), vec![member("a")]).await;

        assert!(!results[0].success);
        assert_eq!(results[0].attempts, 3);
        assert_eq!(completion.calls_for("a").len(), 3);
    }

    #[tokio::test]
    async fn panicking_member_becomes_failed_slot() {
        let completion = ScriptedCompletion::new();
        completion.set("b", Step::Panic);

        let results =
            join_all_tolerant(&ctx(&completion, 1, 4), vec![member("a"), member("b"), member("c")]).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert_eq!(results[1].role, "b");
        assert!(matches!(results[1].error, Some(InvocationError::Panicked(_))));
        assert!(results[2].success);
    }

    #[tokio::test]
    async fn each_panicked_slot_keeps_its_own_message() {
        let completion = ScriptedCompletion::new();
        completion.set("a", Step::Panic);
        completion.set("c", Step::Panic);

        let results =
            join_all_tolerant(&ctx(&completion, 1, 4), vec![member("a"), member("b"), member("c")]).await;

        let reason = |i: usize| match &results[i].error {
            Some(InvocationError::Panicked(reason)) => reason.clone(),
            other => panic!("expected panic in slot {i}, got {other:?}"),
        };
        assert!(reason(0).ends_with("for role a"));
        assert!(reason(2).ends_with("for role c"));
        assert!(results[1].success);
    }

    #[tokio::test]
    async fn cancelled_join_fails_members_without_retry() {
        let completion = ScriptedCompletion::new();
        completion.set("a", Step::ReplyAfter("late".into(), Duration::from_millis(300)));
        let join_ctx = ctx(&completion, 3, 4);
        join_ctx.cancel.cancel();

        let results = join_all_tolerant(&join_ctx, vec![member("a")]).await;

        assert_eq!(results[0].error, Some(InvocationError::Cancelled));
        assert_eq!(results[0].attempts, 1);
    }
}
