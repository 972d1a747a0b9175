//! PlannerService: the conversation entry points used by the CLI and HTTP API.
//!
//! Ties the coordinator, the follow-up workflow and the conversation cache
//! together. Every operation on a conversation holds that conversation's
//! lock, so a planning run, a follow-up and a reset for the same key never
//! interleave. Different conversations proceed independently.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use tripweave_types::config::PlannerConfig;
use tripweave_types::conversation::{ConversationKey, SessionSnapshot};
use tripweave_types::error::{ConfigError, PlannerError, ValidationError};
use tripweave_types::phase::{FollowUpOutcome, PipelineOutcome};
use tripweave_types::trip::TripRequest;

use crate::agent::invoker::{AgentInvoker, DEFAULT_INVOCATION_TIMEOUT};
use crate::agent::roles::RoleRegistry;
use crate::classifier::{FollowUpClassifier, KeywordClassifier};
use crate::coordinator::plan::WorkflowPlan;
use crate::coordinator::{Coordinator, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_PARALLEL, FollowUpWorkflow};
use crate::event::EventBus;
use crate::llm::BoxCompletionService;
use crate::lookup::BoxLookupService;
use crate::session::ConversationCache;
use crate::session::context::DEFAULT_MAX_HISTORY_TURNS;

/// Tunables for a `PlannerService`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSettings {
    pub invocation_timeout: Duration,
    pub max_attempts: u32,
    pub max_parallel_invocations: usize,
    pub max_history_turns: usize,
    pub cache_capacity: usize,
    pub cache_ttl: Duration,
}

impl PlannerSettings {
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            invocation_timeout: Duration::from_secs(config.invocation_timeout_secs),
            max_attempts: config.max_attempts,
            max_parallel_invocations: config.max_parallel_invocations,
            max_history_turns: config.max_history_turns,
            cache_capacity: config.cache.capacity,
            cache_ttl: Duration::from_secs(config.cache.ttl_secs),
        }
    }
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            invocation_timeout: DEFAULT_INVOCATION_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_parallel_invocations: DEFAULT_MAX_PARALLEL,
            max_history_turns: DEFAULT_MAX_HISTORY_TURNS,
            cache_capacity: 1024,
            cache_ttl: Duration::from_secs(86_400),
        }
    }
}

/// Conversation-level planning service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PlannerService {
    coordinator: Coordinator,
    follow_up: FollowUpWorkflow,
    cache: Arc<ConversationCache>,
    roles: Arc<RoleRegistry>,
    events: EventBus,
}

impl PlannerService {
    pub fn builder(completion: BoxCompletionService) -> PlannerServiceBuilder {
        PlannerServiceBuilder::new(completion)
    }

    /// Build from a loaded configuration: role overrides, workflow choice,
    /// follow-up keywords and tunables all come from `config`.
    pub fn from_config(
        config: &PlannerConfig,
        completion: BoxCompletionService,
        lookup: Option<BoxLookupService>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::builder(completion)
            .roles(RoleRegistry::with_overrides(&config.roles)?)
            .workflow(WorkflowPlan::from_config(config)?)
            .classifier(KeywordClassifier::from_config(
                config.follow_up_keywords.as_deref(),
            ))
            .settings(PlannerSettings::from_config(config));
        if let Some(lookup) = lookup {
            builder = builder.lookup(lookup);
        }
        builder.build()
    }

    /// Run the workflow for `trip` in conversation `key`.
    ///
    /// The session's plan is replaced unless some phase produced nothing;
    /// in that case the previous plan stays and the outcome still carries
    /// the partial merged text.
    pub async fn start_planning(
        &self,
        key: &ConversationKey,
        trip: TripRequest,
    ) -> Result<PipelineOutcome, PlannerError> {
        trip.validate()?;

        let handle = self.cache.get_or_create(key);
        let mut session = handle.lock().await;

        let outcome = self.coordinator.run(key, &trip).await?;
        if outcome.is_usable() {
            session.update_from_pipeline(trip, outcome.merged_plan_text.clone());
            info!(conversation = %key, run_id = %outcome.run_id, "plan stored");
        } else {
            warn!(
                conversation = %key,
                run_id = %outcome.run_id,
                "pipeline had a failed phase, keeping previous plan"
            );
        }
        Ok(outcome)
    }

    /// Answer a follow-up question about the conversation's current plan.
    pub async fn ask_follow_up(
        &self,
        key: &ConversationKey,
        question: &str,
    ) -> Result<FollowUpOutcome, PlannerError> {
        if question.trim().is_empty() {
            return Err(ValidationError::BlankQuestion.into());
        }
        let Some(handle) = self.cache.get(key) else {
            return Err(ValidationError::NoPlan(key.to_string()).into());
        };

        let mut session = handle.lock().await;
        self.follow_up.answer(&mut session, question).await
    }

    /// Clear the conversation's trip, plan and turns.
    pub async fn reset_conversation(&self, key: &ConversationKey) {
        if let Some(handle) = self.cache.get(key) {
            handle.lock().await.reset();
            info!(conversation = %key, "conversation reset");
        }
    }

    /// Seed a conversation from a saved snapshot, replacing whatever it held.
    pub async fn restore_session(&self, snapshot: SessionSnapshot) {
        let key = snapshot.key.clone();
        let handle = self.cache.get_or_create(&key);
        handle.lock().await.restore(snapshot);
        info!(conversation = %key, "conversation restored");
    }

    /// Current state of a conversation; empty when it is unknown or expired.
    pub async fn session_snapshot(&self, key: &ConversationKey) -> SessionSnapshot {
        match self.cache.get(key) {
            Some(handle) => handle.lock().await.snapshot(),
            None => SessionSnapshot::empty(key.clone()),
        }
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn workflow(&self) -> &WorkflowPlan {
        self.coordinator.plan()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn cache(&self) -> &ConversationCache {
        &self.cache
    }
}

/// Assembles a `PlannerService`; everything but the completion service is optional.
pub struct PlannerServiceBuilder {
    completion: BoxCompletionService,
    lookup: Option<BoxLookupService>,
    roles: Option<RoleRegistry>,
    workflow: Option<WorkflowPlan>,
    classifier: Option<Arc<dyn FollowUpClassifier>>,
    settings: PlannerSettings,
    events: Option<EventBus>,
}

impl PlannerServiceBuilder {
    fn new(completion: BoxCompletionService) -> Self {
        Self {
            completion,
            lookup: None,
            roles: None,
            workflow: None,
            classifier: None,
            settings: PlannerSettings::default(),
            events: None,
        }
    }

    pub fn lookup(mut self, lookup: BoxLookupService) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn roles(mut self, roles: RoleRegistry) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn workflow(mut self, workflow: WorkflowPlan) -> Self {
        self.workflow = Some(workflow);
        self
    }

    pub fn classifier<C: FollowUpClassifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    pub fn settings(mut self, settings: PlannerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Validate the workflow against the roles and wire everything up.
    pub fn build(self) -> Result<PlannerService, ConfigError> {
        let roles = Arc::new(self.roles.unwrap_or_else(RoleRegistry::builtin));
        let events = self.events.unwrap_or_default();
        let invoker = AgentInvoker::new(
            self.completion,
            self.lookup,
            self.settings.invocation_timeout,
        );

        let coordinator = Coordinator::new(
            invoker.clone(),
            Arc::clone(&roles),
            self.workflow.unwrap_or_default(),
            events.clone(),
            self.settings.max_attempts,
            self.settings.max_parallel_invocations,
        )?;
        let follow_up = FollowUpWorkflow::new(
            invoker,
            Arc::clone(&roles),
            self.classifier
                .unwrap_or_else(|| Arc::new(KeywordClassifier::default())),
            events.clone(),
        )?;
        let cache = Arc::new(ConversationCache::new(
            self.settings.cache_capacity,
            self.settings.cache_ttl,
            self.settings.max_history_turns,
        ));

        Ok(PlannerService {
            coordinator,
            follow_up,
            cache,
            roles,
            events,
        })
    }
}
