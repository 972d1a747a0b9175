//! BoxLookupService -- object-safe dynamic dispatch wrapper for
//! `ExternalLookupService`, same blanket-impl pattern as `BoxCompletionService`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tripweave_types::error::ServiceError;
use tripweave_types::lookup::{LookupRequest, LookupResult};

use super::service::ExternalLookupService;

/// Object-safe version of [`ExternalLookupService`] with boxed futures.
pub trait ExternalLookupServiceDyn: Send + Sync {
    fn name(&self) -> &str;

    fn lookup_boxed<'a>(
        &'a self,
        request: &'a LookupRequest,
    ) -> Pin<Box<dyn Future<Output = Result<LookupResult, ServiceError>> + Send + 'a>>;
}

impl<T: ExternalLookupService> ExternalLookupServiceDyn for T {
    fn name(&self) -> &str {
        ExternalLookupService::name(self)
    }

    fn lookup_boxed<'a>(
        &'a self,
        request: &'a LookupRequest,
    ) -> Pin<Box<dyn Future<Output = Result<LookupResult, ServiceError>> + Send + 'a>> {
        Box::pin(self.lookup(request))
    }
}

/// Type-erased, cloneable lookup service.
#[derive(Clone)]
pub struct BoxLookupService {
    inner: Arc<dyn ExternalLookupServiceDyn>,
}

impl BoxLookupService {
    pub fn new<T: ExternalLookupService + 'static>(service: T) -> Self {
        Self {
            inner: Arc::new(service),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult, ServiceError> {
        self.inner.lookup_boxed(request).await
    }
}

impl std::fmt::Debug for BoxLookupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxLookupService")
            .field("name", &self.name())
            .finish()
    }
}
