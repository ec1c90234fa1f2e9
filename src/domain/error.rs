use std::path::PathBuf;

use thiserror::Error;

/// Startup failures that make the process unusable.
///
/// These are fatal: the binary reports them and exits before any input is
/// accepted, so no turn is ever recorded.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("missing API key: set GOOGLE_API_KEY (or GEMINI_API_KEY) or add it to a secrets file")]
    MissingCredential,

    #[error("invalid API key: {0}")]
    InvalidCredential(String),

    #[error("secrets file {}: {reason}", .path.display())]
    SecretsFile { path: PathBuf, reason: String },
}

/// Failure of a single completion call.
///
/// Recovered locally by callers: the error is surfaced to the user and the
/// session stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("response blocked: {0}")]
    Blocked(String),
}

impl GatewayError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn provider(status: u16, msg: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: msg.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked(reason.into())
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
