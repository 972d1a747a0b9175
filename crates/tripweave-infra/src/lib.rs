//! Infrastructure layer for Tripweave.
//!
//! Contains implementations of the service traits defined in `tripweave-core`:
//! an OpenAI-compatible completion service and an HTTP lookup service for the
//! Google Maps and SearchAPI endpoints. Also loads `config.toml` and the API
//! credentials the adapters need.

pub mod config;
pub mod llm;
pub mod lookup;
pub mod secret;
