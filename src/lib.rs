pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    CompletionGateway, SessionStore, SubmitPromptUseCase, TurnOutcome, ViewTranscriptUseCase,
};

pub use cli::Commands;

pub use connector::{
    resolve_api_key, ApiKey, Container, ContainerConfig, GeminiClient,
    InMemorySessionStore, MockGateway, Router,
};

pub use domain::{
    ChatSession, ConfigurationError, DomainError, GatewayError, Role, Transcript, Turn,
};
