use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::{CompletionGateway, SessionStore};
use crate::domain::{DomainError, GatewayError, Turn};

/// Result of one user turn.
///
/// A gateway failure is not an `Err`: the user's turn is kept, the failure is
/// handed back for display and the session goes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Replied(Turn),
    Failed(GatewayError),
}

impl TurnOutcome {
    pub fn reply(&self) -> Option<&Turn> {
        match self {
            TurnOutcome::Replied(turn) => Some(turn),
            TurnOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match self {
            TurnOutcome::Replied(_) => None,
            TurnOutcome::Failed(e) => Some(e),
        }
    }
}

/// Records a user prompt, asks the gateway for a reply and records the reply.
pub struct SubmitPromptUseCase {
    store: Arc<dyn SessionStore>,
    gateway: Arc<dyn CompletionGateway>,
}

impl SubmitPromptUseCase {
    pub fn new(store: Arc<dyn SessionStore>, gateway: Arc<dyn CompletionGateway>) -> Self {
        Self { store, gateway }
    }

    /// Empty or whitespace-only prompts are rejected with
    /// [`DomainError::InvalidInput`] and leave the transcript untouched.
    pub async fn execute(&self, prompt: &str) -> Result<TurnOutcome, DomainError> {
        if prompt.trim().is_empty() {
            return Err(DomainError::invalid_input("prompt is empty"));
        }

        self.store.append(Turn::user(prompt)).await;
        debug!("Forwarding prompt ({} chars) to {}", prompt.len(), self.gateway.describe());

        let start_time = Instant::now();
        match self.gateway.complete(prompt).await {
            Ok(text) => {
                let reply = Turn::assistant(text);
                self.store.append(reply.clone()).await;
                info!(
                    "Completion received in {:.2}s ({} turns in transcript)",
                    start_time.elapsed().as_secs_f64(),
                    self.store.len().await
                );
                Ok(TurnOutcome::Replied(reply))
            }
            Err(e) => {
                warn!("Completion failed after {:.2}s: {}", start_time.elapsed().as_secs_f64(), e);
                Ok(TurnOutcome::Failed(e))
            }
        }
    }
}
