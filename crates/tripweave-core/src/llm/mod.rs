//! Text completion abstractions for Tripweave.
//!
//! - `TextCompletionService`: RPITIT trait for concrete backends
//! - `BoxCompletionService`: object-safe, cloneable wrapper for dynamic dispatch

pub mod box_service;
pub mod service;

pub use box_service::BoxCompletionService;
pub use service::TextCompletionService;
