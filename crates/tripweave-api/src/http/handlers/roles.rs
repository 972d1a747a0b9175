//! Role registry and health endpoints.
//!
//! - GET /api/v1/roles  - Configured roles and the workflow phases
//! - GET /api/v1/health - Liveness plus cache occupancy

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use tripweave_core::coordinator::plan::WorkflowPlan;
use tripweave_types::role::AgentRoleConfig;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<AgentRoleConfig>,
    pub workflow: WorkflowPlan,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub conversations: usize,
    pub cache_capacity: usize,
}

/// GET /api/v1/roles
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<ApiResponse<RolesResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let data = RolesResponse {
        roles: state.planner.roles().iter().cloned().collect(),
        workflow: state.planner.workflow().clone(),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(data, request_id, elapsed).with_link("self", "/api/v1/roles")))
}

/// GET /api/v1/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let cache = state.planner.cache();
    let data = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        conversations: cache.len(),
        cache_capacity: cache.capacity(),
    };
    Json(ApiResponse::success(data, Uuid::now_v7().to_string(), 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handlers::test_support::state;

    #[tokio::test]
    async fn roles_include_builtins_and_workflow() {
        let Json(resp) = list_roles(State(state())).await.unwrap();
        let data = resp.data.unwrap();
        assert!(data.roles.iter().any(|r| r.name == "weather"));
        assert_eq!(data.workflow.phases().len(), 1);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(resp) = health(State(state())).await;
        let data = resp.data.unwrap();
        assert_eq!(data.status, "ok");
        assert_eq!(data.conversations, 0);
    }
}
