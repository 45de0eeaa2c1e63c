use async_trait::async_trait;

use crate::domain::errors::EcoResult;

/// Port for the external text generation service
///
/// One call is one HTTP request: the credential travels in a header, the
/// prompt in the body, and the first text payload of the reply comes back
/// untouched. The reply is untrusted and must go through the validator.
///
/// # Errors
///
/// - `AuthError` when the service rejects the credential (401/403)
/// - `TransportError` for network failures, timeouts and any other non-2xx status
///
/// Implementations must not retry; retry policy belongs to the orchestrator.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, credential: &str, prompt: &str) -> EcoResult<String>;
}
