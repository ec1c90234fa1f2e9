use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::CompletionGateway;
use crate::connector::adapter::ApiKey;
use crate::domain::GatewayError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const API_VERSION_PATH: &str = "/v1beta/models";
const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// HTTP client for the Gemini `generateContent` endpoint.
///
/// Sends exactly one user turn per call; earlier turns of the conversation
/// are not replayed to the model.
///
/// Endpoint and model can be overridden through the environment:
///
/// ```text
/// GEMINI_BASE_URL=http://localhost:8080
/// GEMINI_MODEL=gemini-1.5-pro
/// ```
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: ApiKey,
    model: String,
    /// Full endpoint URL (base + version path + model + method).
    url: String,
}

impl GeminiClient {
    pub fn new(api_key: ApiKey, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_timeout(api_key, model, base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: ApiKey,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let model: String = model.into();
        let base: String = base_url.into();
        let model_name = model.strip_prefix("models/").unwrap_or(&model);
        let url = format!(
            "{}{API_VERSION_PATH}/{model_name}:generateContent",
            base.trim_end_matches('/')
        );
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key,
            model: model_name.to_string(),
            url,
        }
    }

    /// Construct with endpoint settings taken from the environment:
    ///
    /// | Variable          | Default                                       |
    /// |-------------------|-----------------------------------------------|
    /// | `GEMINI_BASE_URL` | `https://generativelanguage.googleapis.com`   |
    /// | `GEMINI_MODEL`    | `gemini-1.5-flash`                            |
    ///
    /// Explicit `model` / `base_url` arguments win over the environment.
    pub fn from_env(
        api_key: ApiKey,
        model: Option<&str>,
        base_url: Option<&str>,
        timeout: Option<Duration>,
    ) -> Self {
        let model = model
            .map(str::to_string)
            .or_else(|| std::env::var("GEMINI_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base = base_url
            .map(str::to_string)
            .or_else(|| std::env::var("GEMINI_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::with_timeout(api_key, model, base, timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Pull the provider's message out of an error body, falling back to the
    /// raw body when it is not the usual `{"error": {...}}` envelope.
    fn error_message(body: &str) -> String {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => envelope.error.message,
            Err(_) if body.trim().is_empty() => "empty error body".to_string(),
            Err(_) => body.trim().to_string(),
        }
    }

    fn extract_text(response: GenerateContentResponse) -> Result<String, GatewayError> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            return match response.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => Err(GatewayError::blocked(format!("prompt blocked ({reason})"))),
                None => Err(GatewayError::malformed("response has no candidates")),
            };
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if !text.is_empty() {
            return Ok(text);
        }

        match candidate.finish_reason.as_deref() {
            Some(reason) if reason != "STOP" => {
                Err(GatewayError::blocked(format!("generation stopped ({reason})")))
            }
            _ => Err(GatewayError::malformed("candidate has no text")),
        }
    }
}

#[async_trait]
impl CompletionGateway for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!("POST {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::transport(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            warn!("GeminiClient: API returned {status}: {body}");
            return Err(GatewayError::provider(
                status.as_u16(),
                Self::error_message(&body),
            ));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::malformed(format!("failed to parse response: {e}")))?;

        Self::extract_text(parsed)
    }

    fn describe(&self) -> String {
        format!("Gemini ({})", self.model)
    }
}
