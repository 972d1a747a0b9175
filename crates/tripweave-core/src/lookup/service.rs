//! ExternalLookupService trait definition.

use tripweave_types::error::ServiceError;
use tripweave_types::lookup::{LookupRequest, LookupResult};

/// Trait for geolocation and search backends.
///
/// Implementations live in tripweave-infra (e.g., `HttpLookupService`).
/// A backend that cannot serve a `LookupKind` returns `ServiceError::Provider`.
pub trait ExternalLookupService: Send + Sync {
    fn name(&self) -> &str;

    fn lookup(
        &self,
        request: &LookupRequest,
    ) -> impl std::future::Future<Output = Result<LookupResult, ServiceError>> + Send;
}
