//! Event bus for planner progress.
//!
//! Provides an `EventBus` that distributes `PlannerEvent` messages to all
//! subscribers via a `tokio::sync::broadcast` channel.

pub mod bus;

pub use bus::EventBus;
