use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::application::{
    CompletionGateway, SessionStore, SubmitPromptUseCase, ViewTranscriptUseCase,
};
use crate::connector::adapter::{resolve_api_key, GeminiClient, MockGateway};
use crate::domain::DomainError;

#[derive(Default)]
pub struct ContainerConfig {
    /// Use the offline echo gateway; no credential is needed.
    pub mock_gateway: bool,
    /// Optional TOML file holding `GOOGLE_API_KEY`.
    pub secrets_file: Option<PathBuf>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Per-request timeout for the provider. `None` keeps the client default.
    pub request_timeout: Option<Duration>,
}

/// Process-wide wiring: owns the completion gateway and hands out use cases
/// bound to a caller-supplied session store.
pub struct Container {
    gateway: Arc<dyn CompletionGateway>,
}

impl Container {
    /// Build the gateway, failing with a configuration error when the
    /// credential is missing or invalid. Nothing else is started before this
    /// succeeds.
    pub fn new(config: ContainerConfig) -> Result<Self, DomainError> {
        Self::with_env(config, |name| std::env::var(name).ok())
    }

    /// [`Container::new`] with an explicit environment lookup.
    pub fn with_env<F>(config: ContainerConfig, env: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gateway: Arc<dyn CompletionGateway> = if config.mock_gateway {
            debug!("Using mock completion gateway");
            Arc::new(MockGateway::echo())
        } else {
            let api_key = resolve_api_key(env, config.secrets_file.as_deref())?;
            let client = GeminiClient::from_env(
                api_key,
                config.model.as_deref(),
                config.base_url.as_deref(),
                config.request_timeout,
            );
            info!("Completion gateway: {} at {}", client.describe(), client.url());
            Arc::new(client)
        };

        Ok(Self { gateway })
    }

    pub fn with_gateway(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self { gateway }
    }

    pub fn submit_use_case(&self, store: Arc<dyn SessionStore>) -> SubmitPromptUseCase {
        SubmitPromptUseCase::new(store, self.gateway.clone())
    }

    pub fn transcript_use_case(&self, store: Arc<dyn SessionStore>) -> ViewTranscriptUseCase {
        ViewTranscriptUseCase::new(store)
    }

    pub fn gateway_name(&self) -> String {
        self.gateway.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::adapter::InMemorySessionStore;
    use crate::domain::ConfigurationError;

    #[tokio::test]
    async fn test_mock_container_needs_no_credential() {
        let container = Container::new(ContainerConfig {
            mock_gateway: true,
            ..Default::default()
        })
        .unwrap();

        let store = Arc::new(InMemorySessionStore::new());
        let outcome = container.submit_use_case(store.clone()).execute("ping").await.unwrap();

        assert_eq!(outcome.reply().map(|t| t.content()), Some("ping"));
        assert_eq!(container.transcript_use_case(store).execute().await.len(), 2);
        assert_eq!(container.gateway_name(), "mock (echo)");
    }

    #[test]
    fn test_missing_credential_fails_before_any_turn() {
        let result = Container::with_env(ContainerConfig::default(), |_| None);

        assert!(matches!(
            result,
            Err(DomainError::Configuration(ConfigurationError::MissingCredential))
        ));
    }

    #[test]
    fn test_credential_from_env_builds_gemini_gateway() {
        let container = Container::with_env(ContainerConfig::default(), |name| {
            (name == "GEMINI_API_KEY").then(|| "test-key".to_string())
        })
        .unwrap();

        assert!(container.gateway_name().starts_with("Gemini"));
    }
}
