use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::application::CompletionGateway;
use crate::domain::GatewayError;

#[derive(Debug, Clone)]
enum Behavior {
    Echo,
    Fixed(String),
    Failing(String),
}

/// Offline [`CompletionGateway`] for development (`--mock-gateway`) and tests.
pub struct MockGateway {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockGateway {
    /// Replies with the prompt itself.
    pub fn echo() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    pub fn fixed(reply: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fixed(reply.into()))
    }

    /// Fails every call with a provider error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Failing(message.into()))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::echo()
    }
}

#[async_trait]
impl CompletionGateway for MockGateway {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!("MockGateway answering prompt ({} chars)", prompt.len());

        match &self.behavior {
            Behavior::Echo => Ok(prompt.to_string()),
            Behavior::Fixed(reply) => Ok(reply.clone()),
            Behavior::Failing(message) => Err(GatewayError::provider(503, message.clone())),
        }
    }

    fn describe(&self) -> String {
        match &self.behavior {
            Behavior::Echo => "mock (echo)".to_string(),
            Behavior::Fixed(_) => "mock (fixed)".to_string(),
            Behavior::Failing(_) => "mock (failing)".to_string(),
        }
    }
}
