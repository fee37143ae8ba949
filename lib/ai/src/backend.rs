//! Completion provider abstraction.
//!
//! Provides a single interface over remote chat-completion services. A
//! provider receives the full role-tagged message sequence together with
//! the generation settings and returns one assistant message.

use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base URL of Groq's OpenAI-compatible API.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Model used when the deployment does not name one.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Available completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Groq cloud API.
    Groq,
    /// Any other service speaking the OpenAI chat completions protocol.
    OpenAiCompatible,
}

impl LlmProvider {
    /// Returns the provider name used in logs and error messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAiCompatible => "openai_compatible",
        }
    }
}

/// Connection settings for a completion backend.
#[derive(Clone)]
pub struct LlmBackendConfig {
    /// The provider type.
    pub provider: LlmProvider,
    /// Base URL for the API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Maximum time to establish a connection.
    pub connect_timeout: Duration,
    /// Upper bound on a whole request, if any.
    pub request_timeout: Option<Duration>,
}

impl LlmBackendConfig {
    /// Creates a Groq backend configuration.
    #[must_use]
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Groq,
            base_url: GROQ_BASE_URL.to_string(),
            api_key: api_key.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }

    /// Creates a configuration for an arbitrary OpenAI-compatible endpoint.
    #[must_use]
    pub fn openai_compatible(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAiCompatible,
            base_url: base_url.into(),
            api_key: api_key.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }

    /// Bounds every request, including reading the response body.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl std::fmt::Debug for LlmBackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmBackendConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Sampling settings sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier.
    pub model: String,
    /// Temperature for sampling.
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Nucleus sampling probability mass.
    pub top_p: f64,
    /// Whether the provider should stream the reply.
    pub stream: bool,
}

impl GenerationConfig {
    /// Creates the fixed relay configuration for the given model.
    #[must_use]
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            max_tokens: 2048,
            top_p: 1.0,
            stream: false,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::for_model(DEFAULT_MODEL)
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instruction prepended by the relay.
    System,
    /// User/human message.
    User,
    /// Assistant/AI message.
    Assistant,
}

/// A message as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Creates a message with the given role.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// A request to a completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The full outbound message sequence, system prompt first.
    pub messages: Vec<ChatMessage>,
    /// Sampling settings.
    pub generation: GenerationConfig,
}

impl CompletionRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>, generation: GenerationConfig) -> Self {
        Self {
            messages,
            generation,
        }
    }
}

/// A response from a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated content.
    pub content: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Returns the total number of tokens, saturating at `u32::MAX`.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Trait for completion backends.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produces one assistant message for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached, rejects the
    /// request, or answers with something that is not a completion.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Returns the provider type.
    fn provider(&self) -> LlmProvider;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_config_uses_relay_constants() {
        let config = GenerationConfig::for_model("some-model");
        assert_eq!(config.model, "some-model");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.top_p, 1.0);
        assert!(!config.stream);
    }

    #[test]
    fn default_generation_config_uses_default_model() {
        assert_eq!(GenerationConfig::default().model, DEFAULT_MODEL);
    }

    #[test]
    fn chat_message_roles_serialize_lowercase() {
        let json = serde_json::to_value(ChatMessage::assistant("hi")).expect("serialize");
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));

        let json = serde_json::to_value(ChatMessage::system("be brief")).expect("serialize");
        assert_eq!(json["role"], "system");
    }

    #[test]
    fn token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn token_usage_total_saturates() {
        let usage = TokenUsage {
            input_tokens: u32::MAX,
            output_tokens: 1,
        };
        assert_eq!(usage.total(), u32::MAX);
    }

    #[test]
    fn backend_config_debug_hides_api_key() {
        let config = LlmBackendConfig::groq("gsk_secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn constructors_set_provider_and_base_url() {
        let groq = LlmBackendConfig::groq("key");
        assert_eq!(groq.provider, LlmProvider::Groq);
        assert_eq!(groq.base_url, GROQ_BASE_URL);
        assert_eq!(groq.request_timeout, None);

        let local = LlmBackendConfig::openai_compatible("http://localhost:9999", "key")
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(local.provider, LlmProvider::OpenAiCompatible);
        assert_eq!(local.base_url, "http://localhost:9999");
        assert_eq!(local.request_timeout, Some(Duration::from_secs(5)));
    }
}
