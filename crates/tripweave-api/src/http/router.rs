//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation)
                .delete(handlers::conversation::reset_conversation),
        )
        .route("/conversations/{id}/plan", post(handlers::conversation::plan_trip))
        .route("/conversations/{id}/follow-up", post(handlers::conversation::follow_up))
        .route("/roles", get(handlers::roles::list_roles))
        .route("/health", get(handlers::roles::health));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
