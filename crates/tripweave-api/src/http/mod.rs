//! HTTP/REST API layer for Tripweave.
//!
//! Axum-based REST API at `/api/v1/` with the envelope response format and
//! CORS support. Conversations are scoped by the `x-user-id` header.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
