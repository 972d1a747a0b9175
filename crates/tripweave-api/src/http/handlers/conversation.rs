//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/conversations/{id}/plan      - Run the workflow for a trip
//! - POST   /api/v1/conversations/{id}/follow-up - Ask about the current plan
//! - GET    /api/v1/conversations/{id}           - Current trip, plan and turns
//! - DELETE /api/v1/conversations/{id}           - Reset the conversation

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tripweave_types::conversation::{ConversationKey, SessionSnapshot};
use tripweave_types::phase::{FollowUpOutcome, PipelineOutcome};
use tripweave_types::trip::TripRequest;

use crate::http::error::AppError;
use crate::http::extractors::user::UserId;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FollowUpBody {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub conversation_id: String,
    pub reset: bool,
}

fn conversation_path(id: &str) -> String {
    format!("/api/v1/conversations/{id}")
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// POST /api/v1/conversations/{id}/plan - Run the planning workflow.
pub async fn plan_trip(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(conversation_id): Path<String>,
    payload: Result<Json<TripRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PipelineOutcome>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();
    let trip = body(payload)?;

    let key = ConversationKey::new(user, conversation_id.as_str());
    let outcome = state.planner.start_planning(&key, trip).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let path = conversation_path(&conversation_id);
    let resp = ApiResponse::success(outcome, request_id, elapsed)
        .with_link("self", &format!("{path}/plan"))
        .with_link("conversation", &path)
        .with_link("follow_up", &format!("{path}/follow-up"));

    Ok(Json(resp))
}

/// POST /api/v1/conversations/{id}/follow-up - Answer a question about the plan.
pub async fn follow_up(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(conversation_id): Path<String>,
    payload: Result<Json<FollowUpBody>, JsonRejection>,
) -> Result<Json<ApiResponse<FollowUpOutcome>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();
    let FollowUpBody { question } = body(payload)?;

    let key = ConversationKey::new(user, conversation_id.as_str());
    let outcome = state.planner.ask_follow_up(&key, &question).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(outcome, request_id, elapsed)
        .with_link("conversation", &conversation_path(&conversation_id));

    Ok(Json(resp))
}

/// GET /api/v1/conversations/{id} - Snapshot of the conversation.
pub async fn get_conversation(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(conversation_id): Path<String>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let key = ConversationKey::new(user, conversation_id.as_str());
    let snapshot = state.planner.session_snapshot(&key).await;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(snapshot, request_id, elapsed)
        .with_link("self", &conversation_path(&conversation_id));

    Ok(Json(resp))
}

/// DELETE /api/v1/conversations/{id} - Clear trip, plan and history.
pub async fn reset_conversation(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(conversation_id): Path<String>,
) -> Result<Json<ApiResponse<ResetResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let key = ConversationKey::new(user, conversation_id.as_str());
    state.planner.reset_conversation(&key).await;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        ResetResponse {
            conversation_id,
            reset: true,
        },
        request_id,
        elapsed,
    );

    Ok(Json(resp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handlers::test_support::{state, trip};
    use tripweave_types::error::{PlannerError, ValidationError};
    use tripweave_types::phase::PipelineStatus;

    fn user(name: &str) -> UserId {
        UserId(name.to_string())
    }

    #[tokio::test]
    async fn plan_then_follow_up_then_reset() {
        let state = state();

        let Json(resp) = plan_trip(State(state.clone()), user("alice"), Path("c1".into()), Ok(Json(trip())))
            .await
            .unwrap();
        let outcome = resp.data.unwrap();
        assert_eq!(outcome.status, PipelineStatus::Complete);
        assert!(outcome.merged_plan_text.contains("[planner]"));

        let Json(resp) = follow_up(
            State(state.clone()),
            user("alice"),
            Path("c1".into()),
            Ok(Json(FollowUpBody {
                question: "summarize day one".into(),
            })),
        )
        .await
        .unwrap();
        assert!(resp.data.unwrap().answer.contains("[follow-up-no-search]"));

        let Json(resp) = get_conversation(State(state.clone()), user("alice"), Path("c1".into()))
            .await
            .unwrap();
        let snapshot = resp.data.unwrap();
        assert!(snapshot.plan.is_some());
        assert_eq!(snapshot.turns.len(), 1);

        reset_conversation(State(state.clone()), user("alice"), Path("c1".into()))
            .await
            .unwrap();
        let err = follow_up(
            State(state),
            user("alice"),
            Path("c1".into()),
            Ok(Json(FollowUpBody {
                question: "summarize day one".into(),
            })),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Planner(PlannerError::Validation(ValidationError::NoPlan(_)))
        ));
    }

    #[tokio::test]
    async fn conversations_are_scoped_by_user() {
        let state = state();
        plan_trip(State(state.clone()), user("alice"), Path("c1".into()), Ok(Json(trip())))
            .await
            .unwrap();

        let Json(resp) = get_conversation(State(state), user("bob"), Path("c1".into()))
            .await
            .unwrap();
        assert!(resp.data.unwrap().plan.is_none());
    }

    #[tokio::test]
    async fn invalid_trip_is_rejected() {
        let mut bad = trip();
        bad.origin = "  ".into();
        let err = plan_trip(State(state()), user("alice"), Path("c1".into()), Ok(Json(bad)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Planner(PlannerError::Validation(ValidationError::BlankOrigin))
        ));
    }
}
