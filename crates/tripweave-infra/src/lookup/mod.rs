//! Lookup service adapters.

pub mod http;

pub use http::{HttpLookupConfig, HttpLookupService};
