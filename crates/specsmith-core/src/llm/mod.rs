//! The `ModelClient` trait and its production implementation.
//!
//! The pipeline talks to the generative model through an object-safe
//! trait so the serving layer can inject a fake client in tests. The
//! production implementation speaks the OpenAI-compatible chat
//! completions wire format against a hosted endpoint (by default the
//! Gemini compatibility surface).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Fixed sampling temperature for every completion request.
pub const TEMPERATURE: f32 = 0.7;

/// Output-length ceiling for every completion request.
pub const MAX_TOKENS: u32 = 3000;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Model endpoint configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer credential for the endpoint. `None` means unconfigured;
    /// every call fails with an upstream error before any request is sent.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API, without a trailing slash.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
}

impl LlmConfig {
    /// Default endpoint: Gemini's OpenAI-compatibility surface.
    pub const DEFAULT_BASE_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/openai";

    /// Default model identifier.
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

    /// Build a config from the environment.
    ///
    /// Credential: `SPECSMITH_LLM_API_KEY`, falling back to
    /// `GEMINI_API_KEY`. Endpoint and model: `SPECSMITH_LLM_BASE_URL`
    /// and `SPECSMITH_LLM_MODEL`, falling back to the Gemini defaults.
    pub fn from_env() -> Self {
        let api_key = std::env::var("SPECSMITH_LLM_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok();
        let base_url = std::env::var("SPECSMITH_LLM_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());
        let model = std::env::var("SPECSMITH_LLM_MODEL")
            .unwrap_or_else(|_| Self::DEFAULT_MODEL.to_owned());
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
            model,
        }
    }

    /// Build a config from explicit values (useful for tests).
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
            model: model.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Client interface for the hosted generative model.
///
/// # Object Safety
///
/// This trait is object-safe so the serving layer can hold an
/// `Arc<dyn ModelClient>` and tests can substitute fakes.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Human-readable name for this client (e.g. "openai-compat").
    fn name(&self) -> &str;

    /// Send a two-message exchange (system framing plus the rendered
    /// prompt) and return the raw completion text.
    ///
    /// The call blocks its task for the full round trip; there is no
    /// retry and no timeout beyond the transport default.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ApiError>;

    /// Cheap reachability check against the endpoint, used by the
    /// health probe. Must not consume completion quota.
    async fn probe(&self) -> Result<(), ApiError>;
}

// Compile-time assertion: ModelClient must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ModelClient) {}
};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Production client
// ---------------------------------------------------------------------------

/// `ModelClient` backed by an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiCompatClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::Upstream("API key not configured".into()))
    }
}

#[async_trait]
impl ModelClient for OpenAiCompatClient {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ApiError> {
        let api_key = self.api_key()?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "completion request failed with status {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("unreadable completion response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ApiError::Upstream("completion response contained no text".into()))
    }

    async fn probe(&self) -> Result<(), ApiError> {
        let api_key = self.api_key()?;

        let url = format!("{}/models", self.config.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Upstream(format!(
                "model endpoint probe failed with status {status}"
            )));
        }

        Ok(())
    }
}
