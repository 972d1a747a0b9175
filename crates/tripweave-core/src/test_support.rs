//! Shared mocks for core tests: scripted completion and lookup services
//! with failure injection, delays and request capture.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use tripweave_types::error::ServiceError;
use tripweave_types::llm::{CompletionOutput, CompletionRequest};
use tripweave_types::lookup::{LookupKind, LookupRequest, LookupResult};
use tripweave_types::trip::TripRequest;

use crate::llm::service::TextCompletionService;
use crate::lookup::service::ExternalLookupService;

/// Scenario A trip: Taipei -> Kaohsiung, 2025-03-01..03, budget 500, food.
pub fn sample_trip() -> TripRequest {
    TripRequest::new(
        "Taipei",
        vec!["Kaohsiung".to_string()],
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        500.0,
    )
    .with_preferences(["food"])
}

/// What a scripted call does.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    ReplyAfter(String, Duration),
    Output(CompletionOutput),
    Fail(ServiceError),
    FailAfter(ServiceError, Duration),
    Panic,
}

/// A completion request as seen by the mock, with when it arrived.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: CompletionRequest,
    pub at: Instant,
}

#[derive(Default)]
struct CompletionState {
    queued: HashMap<String, VecDeque<Step>>,
    defaults: HashMap<String, Step>,
    calls: Vec<RecordedCall>,
}

/// Completion service whose behavior is scripted per role.
///
/// Queued steps are consumed first, then the role's default step, then a
/// reply of `"<role> output"`.
#[derive(Clone, Default)]
pub struct ScriptedCompletion {
    state: Arc<Mutex<CompletionState>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, role: &str, step: Step) -> &Self {
        self.state.lock().unwrap().defaults.insert(role.to_string(), step);
        self
    }

    pub fn reply(&self, role: &str, text: &str) -> &Self {
        self.set(role, Step::Reply(text.to_string()))
    }

    pub fn fail(&self, role: &str, error: ServiceError) -> &Self {
        self.set(role, Step::Fail(error))
    }

    pub fn push(&self, role: &str, step: Step) -> &Self {
        self.state
            .lock()
            .unwrap()
            .queued
            .entry(role.to_string())
            .or_default()
            .push_back(step);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn calls_for(&self, role: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.request.role == role)
            .collect()
    }
}

impl TextCompletionService for ScriptedCompletion {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionOutput, ServiceError>> + Send {
        let step = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(RecordedCall {
                request: request.clone(),
                at: Instant::now(),
            });
            let queued = state
                .queued
                .get_mut(&request.role)
                .and_then(VecDeque::pop_front);
            queued
                .or_else(|| state.defaults.get(&request.role).cloned())
                .unwrap_or_else(|| Step::Reply(format!("{} output", request.role)))
        };

        let role = request.role.clone();
        async move {
            match step {
                Step::Reply(text) => Ok(CompletionOutput::Text(text)),
                Step::ReplyAfter(text, delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(CompletionOutput::Text(text))
                }
                Step::Output(output) => Ok(output),
                Step::Fail(error) => Err(error),
                Step::FailAfter(error, delay) => {
                    tokio::time::sleep(delay).await;
                    Err(error)
                }
                Step::Panic => panic!("scripted completion panic for role {role}"),
            }
        }
    }
}

#[derive(Default)]
struct LookupState {
    failures: HashMap<LookupKind, ServiceError>,
    calls: Vec<LookupRequest>,
}

/// Lookup service that answers every kind unless a failure is injected.
#[derive(Clone, Default)]
pub struct ScriptedLookup {
    state: Arc<Mutex<LookupState>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, kind: LookupKind, error: ServiceError) -> &Self {
        self.state.lock().unwrap().failures.insert(kind, error);
        self
    }

    pub fn calls(&self) -> Vec<LookupRequest> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl ExternalLookupService for ScriptedLookup {
    fn name(&self) -> &str {
        "scripted-lookup"
    }

    fn lookup(
        &self,
        request: &LookupRequest,
    ) -> impl Future<Output = Result<LookupResult, ServiceError>> + Send {
        let result = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(request.clone());
            match state.failures.get(&request.kind) {
                Some(error) => Err(error.clone()),
                None => Ok(LookupResult {
                    kind: request.kind,
                    summary: format!("{} data", request.describe()),
                    data: serde_json::Value::Null,
                }),
            }
        };
        async move { result }
    }
}
