//! Planner wired to an echoing completion stub, for handler tests.

use std::path::PathBuf;

use chrono::NaiveDate;

use tripweave_core::PlannerService;
use tripweave_core::coordinator::plan::{Phase, WorkflowPlan};
use tripweave_core::llm::{BoxCompletionService, TextCompletionService};
use tripweave_types::config::PlannerConfig;
use tripweave_types::error::ServiceError;
use tripweave_types::llm::{CompletionOutput, CompletionRequest};
use tripweave_types::role::PLANNER;
use tripweave_types::trip::TripRequest;

use crate::state::AppState;

/// Replies `[role] ok` to every call.
pub struct EchoCompletion;

impl TextCompletionService for EchoCompletion {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionOutput, ServiceError> {
        Ok(CompletionOutput::Text(format!("[{}] ok", request.role)))
    }
}

/// Text-only single-phase planner, so no lookup service is needed.
pub fn state() -> AppState {
    let planner = PlannerService::builder(BoxCompletionService::new(EchoCompletion))
        .workflow(WorkflowPlan::new(vec![Phase::single("plan", PLANNER)]))
        .build()
        .unwrap();
    AppState::new(planner, PlannerConfig::default(), PathBuf::from("/tmp/tripweave-test"))
}

pub fn trip() -> TripRequest {
    TripRequest::new(
        "Taipei",
        vec!["Kaohsiung".into()],
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        500.0,
    )
    .with_preferences(["food"])
}
