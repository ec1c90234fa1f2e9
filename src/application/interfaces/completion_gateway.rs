use async_trait::async_trait;

use crate::domain::GatewayError;

/// Sends a single prompt to a text-generation provider and returns its reply.
///
/// Implementors encapsulate transport, serialization and vendor-specific API
/// details. Each call is independent: no conversation context beyond `prompt`
/// reaches the provider.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;

    /// Human-readable name of the backing provider/model, for logs and banners.
    fn describe(&self) -> String;
}
