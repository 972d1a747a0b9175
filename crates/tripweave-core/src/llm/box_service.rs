//! BoxCompletionService -- object-safe dynamic dispatch wrapper for
//! `TextCompletionService`.
//!
//! 1. Define an object-safe `TextCompletionServiceDyn` trait with boxed futures
//! 2. Blanket-impl it for all `T: TextCompletionService`
//! 3. `BoxCompletionService` wraps `Arc<dyn TextCompletionServiceDyn>` and delegates
//!
//! The wrapper is `Arc`-backed so it can be cloned into `JoinSet` tasks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tripweave_types::error::ServiceError;
use tripweave_types::llm::{CompletionOutput, CompletionRequest};

use super::service::TextCompletionService;

/// Object-safe version of [`TextCompletionService`] with boxed futures.
pub trait TextCompletionServiceDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionOutput, ServiceError>> + Send + 'a>>;
}

impl<T: TextCompletionService> TextCompletionServiceDyn for T {
    fn name(&self) -> &str {
        TextCompletionService::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionOutput, ServiceError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased completion service for runtime backend selection.
///
/// Since `TextCompletionService` uses RPITIT, it cannot be used as a trait
/// object directly. Cloning shares the underlying service.
#[derive(Clone)]
pub struct BoxCompletionService {
    inner: Arc<dyn TextCompletionServiceDyn>,
}

impl BoxCompletionService {
    /// Wrap a concrete `TextCompletionService` in a type-erased box.
    pub fn new<T: TextCompletionService + 'static>(service: T) -> Self {
        Self {
            inner: Arc::new(service),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionOutput, ServiceError> {
        self.inner.complete_boxed(request).await
    }
}

impl std::fmt::Debug for BoxCompletionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxCompletionService")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    struct Echo;

    impl TextCompletionService for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn complete(
            &self,
            request: &CompletionRequest,
        ) -> impl Future<Output = Result<CompletionOutput, ServiceError>> + Send {
            let message = request.message.clone();
            async move { Ok(CompletionOutput::Text(message)) }
        }
    }

    #[tokio::test]
    async fn boxed_service_delegates_and_clones_share_inner() {
        let boxed = BoxCompletionService::new(Echo);
        let clone = boxed.clone();
        assert_eq!(clone.name(), "echo");

        let request = CompletionRequest {
            role: "planner".into(),
            system: "plan".into(),
            goal: "a plan".into(),
            message: "hello".into(),
            tool_results: vec![],
        };
        let out = clone.complete(&request).await.unwrap();
        assert_eq!(out, CompletionOutput::Text("hello".into()));
        assert!(format!("{boxed:?}").contains("echo"));
    }
}
