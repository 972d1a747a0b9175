//! Agent coordination and service trait definitions for Tripweave.
//!
//! This crate defines the "ports" (completion and lookup service traits) that
//! the infrastructure layer implements, plus everything that decides which
//! agent runs when: the coordinator, the follow-up workflow, per-conversation
//! session state and the conversation cache. It depends on `tripweave-types`
//! and the span attribute names in `tripweave-observe`, never on
//! `tripweave-infra` or any network crate.

pub mod agent;
pub mod classifier;
pub mod coordinator;
pub mod event;
pub mod llm;
pub mod lookup;
pub mod service;
pub mod session;

pub use service::{PlannerService, PlannerServiceBuilder, PlannerSettings};

#[cfg(test)]
pub(crate) mod test_support;
