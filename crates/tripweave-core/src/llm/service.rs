//! TextCompletionService trait definition.
//!
//! This is the abstraction every completion backend implements. Uses RPITIT
//! for `complete`; `BoxCompletionService` provides dynamic dispatch.

use tripweave_types::error::ServiceError;
use tripweave_types::llm::{CompletionOutput, CompletionRequest};

/// Trait for text completion backends (OpenAI, OpenAI-compatible servers, mocks).
///
/// Implementations live in tripweave-infra (e.g., `OpenAiCompatibleService`).
pub trait TextCompletionService: Send + Sync {
    /// Human-readable service name (e.g., "openai").
    fn name(&self) -> &str;

    /// Run one completion on behalf of an agent role.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionOutput, ServiceError>> + Send;
}
