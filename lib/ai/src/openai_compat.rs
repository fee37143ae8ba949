//! Client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Groq exposes this protocol under `https://api.groq.com/openai/v1`.

use crate::backend::{
    ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, LlmBackendConfig,
    LlmProvider, TokenUsage,
};
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Completion provider backed by an OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    config: LlmBackendConfig,
}

impl OpenAiCompatClient {
    /// Creates a client from a backend configuration.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::InvalidConfig` if the credential is empty or the
    /// HTTP client cannot be constructed.
    pub fn new(config: LlmBackendConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "API key is empty".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| LlmError::InvalidConfig {
            reason: e.to_string(),
        })?;

        Ok(Self { http, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn classify_send_error(&self, error: &reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::ProviderUnavailable {
                provider: self.config.provider.as_str().to_string(),
                reason: error.to_string(),
            }
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    stream: bool,
}

impl<'a> From<&'a CompletionRequest> for ChatCompletionBody<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.generation.model,
            messages: &request.messages,
            temperature: request.generation.temperature,
            max_tokens: request.generation.max_tokens,
            top_p: request.generation.top_p,
            stream: request.generation.stream,
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionReply {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[async_trait]
impl CompletionProvider for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = self.completions_url();

        debug!(
            endpoint = %url,
            model = %request.generation.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&ChatCompletionBody::from(request))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, endpoint = %url, "Chat completion request did not complete");
                self.classify_send_error(&e)
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(LlmError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                endpoint = %url,
                status = %status,
                body = %body,
                "Chat completion endpoint returned error"
            );
            return Err(LlmError::RequestFailed {
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let reply: ChatCompletionReply =
            response.json().await.map_err(|e| LlmError::ResponseParseFailed {
                reason: e.to_string(),
            })?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::ResponseParseFailed {
                reason: "response contained no message content".to_string(),
            })?;

        let usage = reply
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage,
            model: reply
                .model
                .unwrap_or_else(|| request.generation.model.clone()),
        })
    }

    fn provider(&self) -> LlmProvider {
        self.config.provider
    }
}
