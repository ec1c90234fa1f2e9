use std::sync::Arc;

use anyhow::{bail, Result};

use crate::application::TurnOutcome;
use crate::connector::adapter::InMemorySessionStore;

use super::super::Container;

/// One-shot prompt: a throwaway session holding a single exchange.
pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(&self, prompt: String) -> Result<String> {
        let store = Arc::new(InMemorySessionStore::new());
        let use_case = self.container.submit_use_case(store);

        match use_case.execute(&prompt).await? {
            TurnOutcome::Replied(turn) => Ok(turn.content().to_string()),
            TurnOutcome::Failed(e) => bail!("{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::adapter::MockGateway;

    #[tokio::test]
    async fn test_ask_returns_reply_text() {
        let container = Container::with_gateway(Arc::new(MockGateway::fixed("OK")));
        let reply = AskController::new(&container).ask("Hi".to_string()).await.unwrap();
        assert_eq!(reply, "OK");
    }

    #[tokio::test]
    async fn test_ask_surfaces_gateway_error() {
        let container = Container::with_gateway(Arc::new(MockGateway::failing("down")));
        let err = AskController::new(&container).ask("Hi".to_string()).await.unwrap_err();
        // The binary adds the "Error:" prefix when it reports this.
        assert_eq!(err.to_string(), "provider returned 503: down");
    }
}
