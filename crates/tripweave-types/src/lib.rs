//! Shared domain types for Tripweave.
//!
//! This crate contains the domain types used across the Tripweave planner:
//! trip requests, agent roles, phase results, conversation snapshots,
//! planner configuration, progress events and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod llm;
pub mod lookup;
pub mod phase;
pub mod role;
pub mod trip;
