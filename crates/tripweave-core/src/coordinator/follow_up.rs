//! Follow-up questions about an existing plan.
//!
//! One question, one invocation: the classifier picks the search-backed or
//! the text-only follow-up role and nothing is retried.

use std::sync::Arc;

use tracing::{Instrument, info, info_span, warn};

use tripweave_observe::attrs;
use tripweave_types::error::{ConfigError, PlannerError};
use tripweave_types::event::PlannerEvent;
use tripweave_types::phase::FollowUpOutcome;
use tripweave_types::role::{FOLLOW_UP_NO_SEARCH, FOLLOW_UP_WITH_SEARCH};

use crate::agent::invoker::AgentInvoker;
use crate::agent::roles::RoleRegistry;
use crate::agent::tools::ToolBinding;
use crate::classifier::FollowUpClassifier;
use crate::event::EventBus;
use crate::session::SessionContext;

/// Answers follow-up questions against a conversation's session.
#[derive(Debug, Clone)]
pub struct FollowUpWorkflow {
    invoker: AgentInvoker,
    roles: Arc<RoleRegistry>,
    classifier: Arc<dyn FollowUpClassifier>,
    events: EventBus,
}

impl FollowUpWorkflow {
    /// Fails when either follow-up role is missing from `roles`.
    pub fn new(
        invoker: AgentInvoker,
        roles: Arc<RoleRegistry>,
        classifier: Arc<dyn FollowUpClassifier>,
        events: EventBus,
    ) -> Result<Self, ConfigError> {
        roles.require(FOLLOW_UP_WITH_SEARCH)?;
        roles.require(FOLLOW_UP_NO_SEARCH)?;
        Ok(Self {
            invoker,
            roles,
            classifier,
            events,
        })
    }

    /// Answer `question` using the plan held by `session`.
    ///
    /// Validation and configuration problems are returned before any
    /// collaborator is called. An invocation failure is not an error: the
    /// outcome carries an apology with `degraded` set and no turn is recorded.
    pub async fn answer(
        &self,
        session: &mut SessionContext,
        question: &str,
    ) -> Result<FollowUpOutcome, PlannerError> {
        let input = session.build_follow_up_input(question)?;

        let role_name = if self.classifier.needs_lookup(question) {
            FOLLOW_UP_WITH_SEARCH
        } else {
            FOLLOW_UP_NO_SEARCH
        };
        let role = self.roles.require(role_name)?;

        let binding = if role.capabilities.needs_lookup() {
            if !self.invoker.has_lookup() {
                return Err(ConfigError::LookupUnavailable(role.name.clone()).into());
            }
            Some(ToolBinding::for_follow_up(question, session.trip()))
        } else {
            None
        };
        let used_lookup = binding.is_some();

        let span = info_span!(
            "tripweave.follow_up",
            gen_ai.operation.name = attrs::OP_FOLLOW_UP,
            gen_ai.agent.name = %role.name,
            conversation = %session.key(),
        );
        let result = self
            .invoker
            .invoke(role, &input, binding.as_ref())
            .instrument(span)
            .await;

        let outcome = if result.success {
            session.append_turn(question.trim(), result.text.clone());
            info!(conversation = %session.key(), role = %role.name, used_lookup, "follow-up answered");
            FollowUpOutcome {
                answer: result.text,
                role: role.name.clone(),
                used_lookup,
                degraded: false,
            }
        } else {
            let reason = result
                .error
                .as_ref()
                .map_or_else(|| "unknown error".to_string(), ToString::to_string);
            warn!(conversation = %session.key(), role = %role.name, error = %reason, "follow-up failed");
            FollowUpOutcome {
                answer: unavailable_answer(&reason),
                role: role.name.clone(),
                used_lookup,
                degraded: true,
            }
        };

        self.events.publish(PlannerEvent::FollowUpAnswered {
            conversation: session.key().to_string(),
            role: outcome.role.clone(),
            used_lookup,
            degraded: outcome.degraded,
        });
        Ok(outcome)
    }
}

fn unavailable_answer(reason: &str) -> String {
    format!(
        "Sorry, I could not answer that question right now ({reason}). \
         Your travel plan is unchanged; please try asking again."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::classifier::KeywordClassifier;
    use crate::llm::BoxCompletionService;
    use crate::lookup::BoxLookupService;
    use crate::test_support::{ScriptedCompletion, ScriptedLookup, sample_trip};
    use tripweave_types::conversation::ConversationKey;
    use tripweave_types::error::{ServiceError, ValidationError};
    use tripweave_types::lookup::LookupKind;

    fn workflow(completion: &ScriptedCompletion, lookup: Option<&ScriptedLookup>) -> FollowUpWorkflow {
        FollowUpWorkflow::new(
            AgentInvoker::new(
                BoxCompletionService::new(completion.clone()),
                lookup.map(|l| BoxLookupService::new(l.clone())),
                Duration::from_secs(5),
            ),
            Arc::new(RoleRegistry::builtin()),
            Arc::new(KeywordClassifier::default()),
            EventBus::new(16),
        )
        .unwrap()
    }

    fn planned_session() -> SessionContext {
        let mut session = SessionContext::new(ConversationKey::new("u", "c"), 6);
        session.update_from_pipeline(sample_trip(), "# Travel Plan: Taipei -> Kaohsiung".into());
        session
    }

    #[tokio::test]
    async fn comparative_question_uses_search_role() {
        let completion = ScriptedCompletion::new();
        let lookup = ScriptedLookup::new();
        completion.reply(FOLLOW_UP_WITH_SEARCH, "Try Hotel Cozzi.");
        let mut session = planned_session();

        let outcome = workflow(&completion, Some(&lookup))
            .answer(&mut session, "cheaper alternative hotel")
            .await
            .unwrap();

        assert_eq!(outcome.role, FOLLOW_UP_WITH_SEARCH);
        assert!(outcome.used_lookup);
        assert!(!outcome.degraded);
        assert_eq!(outcome.answer, "Try Hotel Cozzi.");
        assert_eq!(completion.call_count(), 1);

        let lookups = lookup.calls();
        assert_eq!(lookups.len(), 1);
        assert_eq!(lookups[0].kind, LookupKind::PlacesSearch);
        assert_eq!(lookups[0].get("query"), Some("cheaper alternative hotel"));
    }

    #[tokio::test]
    async fn summary_question_uses_text_only_role() {
        let completion = ScriptedCompletion::new();
        let lookup = ScriptedLookup::new();
        let mut session = planned_session();

        let outcome = workflow(&completion, Some(&lookup))
            .answer(&mut session, "summarize the itinerary")
            .await
            .unwrap();

        assert_eq!(outcome.role, FOLLOW_UP_NO_SEARCH);
        assert!(!outcome.used_lookup);
        assert!(lookup.calls().is_empty());
        let calls = completion.calls_for(FOLLOW_UP_NO_SEARCH);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].request.message.contains("# Travel Plan: Taipei -> Kaohsiung"));
        assert!(calls[0].request.message.contains("summarize the itinerary"));
    }

    #[tokio::test]
    async fn success_appends_turn() {
        let completion = ScriptedCompletion::new();
        let mut session = planned_session();
        let workflow = workflow(&completion, None);

        workflow.answer(&mut session, "summarize the itinerary").await.unwrap();
        workflow.answer(&mut session, "what about day 2?").await.unwrap();

        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns()[0].answer, "follow-up-no-search output");
        let second_input = &completion.calls()[1].request.message;
        assert!(second_input.contains("Q: summarize the itinerary"));
    }

    #[tokio::test]
    async fn failure_returns_prose_without_turn() {
        let completion = ScriptedCompletion::new();
        completion.fail(FOLLOW_UP_NO_SEARCH, ServiceError::Transient("503".into()));
        let mut session = planned_session();

        let outcome = workflow(&completion, None)
            .answer(&mut session, "summarize the itinerary")
            .await
            .unwrap();

        assert!(outcome.degraded);
        assert!(outcome.answer.contains("could not answer"));
        assert!(session.turns().is_empty());
        assert_eq!(completion.call_count(), 1);
    }

    #[tokio::test]
    async fn no_plan_is_rejected_without_calls() {
        let completion = ScriptedCompletion::new();
        let lookup = ScriptedLookup::new();
        let mut session = SessionContext::new(ConversationKey::new("u", "c"), 6);

        let err = workflow(&completion, Some(&lookup))
            .answer(&mut session, "cheaper alternative hotel")
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::Validation(ValidationError::NoPlan(_))));
        assert_eq!(completion.call_count(), 0);
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn search_question_without_lookup_service_is_config_error() {
        let completion = ScriptedCompletion::new();
        let mut session = planned_session();

        let err = workflow(&completion, None)
            .answer(&mut session, "find a cheaper hotel")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PlannerError::Config(ConfigError::LookupUnavailable(FOLLOW_UP_WITH_SEARCH.into()))
        );
        assert_eq!(completion.call_count(), 0);
    }

    #[test]
    fn missing_follow_up_role_rejected() {
        let completion = ScriptedCompletion::new();
        let err = FollowUpWorkflow::new(
            AgentInvoker::new(BoxCompletionService::new(completion), None, Duration::from_secs(5)),
            Arc::new(RoleRegistry::empty()),
            Arc::new(KeywordClassifier::default()),
            EventBus::new(16),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::UnknownRole(FOLLOW_UP_WITH_SEARCH.into()));
    }
}
