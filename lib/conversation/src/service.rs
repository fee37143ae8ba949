//! The conversation service.
//!
//! One `ConversationService` owns the single shared transcript. Submits and
//! clears are serialized by an exchange lock held across the upstream call,
//! so pairs are never interleaved. The transcript itself sits behind a
//! separate read/write lock, which lets health checks read it while an
//! exchange is waiting on the provider.

use crate::error::ConversationError;
use crate::message::Message;
use crate::transcript::Transcript;
use parley_ai::{CompletionProvider, CompletionRequest, GenerationConfig, LlmError};
use parley_core::ExchangeId;
use rootcause::Report;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{Instrument, debug, info, info_span, warn};

/// Instruction prepended to every outbound request.
pub const SYSTEM_PROMPT: &str = "You are a helpful and friendly AI assistant. Provide concise, \
accurate, and engaging responses. Use markdown formatting when appropriate for better \
readability (e.g., **bold**, *italic*, `code`, lists, etc.).";

/// Number of messages retained when not configured otherwise.
pub const DEFAULT_MAX_HISTORY: usize = 20;

/// Settings for a conversation service.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Maximum transcript length after an exchange.
    pub max_history: usize,
    /// Sampling settings sent with every request.
    pub generation: GenerationConfig,
    /// Instruction prepended to every request.
    pub system_prompt: String,
    /// How long to wait for the provider before giving up.
    pub upstream_timeout: Duration,
    /// Remove the user message again when the provider fails.
    pub rollback_on_failure: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            generation: GenerationConfig::default(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            upstream_timeout: Duration::from_secs(60),
            rollback_on_failure: false,
        }
    }
}

impl ConversationConfig {
    /// Sets the window size.
    #[must_use]
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Sets the sampling settings.
    #[must_use]
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Sets the upstream timeout.
    #[must_use]
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Enables or disables rollback of the user message on failure.
    #[must_use]
    pub fn with_rollback_on_failure(mut self, rollback: bool) -> Self {
        self.rollback_on_failure = rollback;
        self
    }
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantReply {
    /// The assistant's reply text.
    pub response: String,
    /// Transcript length after the window was applied.
    pub conversation_length: usize,
}

/// Snapshot returned by a health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Always `"healthy"` while the process is serving.
    pub status: &'static str,
    /// Current transcript length.
    pub conversation_length: usize,
    /// Configured window size.
    pub max_history: usize,
}

/// Owns the transcript and relays exchanges to a completion provider.
pub struct ConversationService {
    provider: Arc<dyn CompletionProvider>,
    config: ConversationConfig,
    exchange_lock: Mutex<()>,
    transcript: RwLock<Transcript>,
}

impl ConversationService {
    /// Creates a service with an empty transcript.
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>, config: ConversationConfig) -> Self {
        let transcript = Transcript::new(config.max_history);
        Self {
            provider,
            config,
            exchange_lock: Mutex::new(()),
            transcript: RwLock::new(transcript),
        }
    }

    /// Sends a user message and records the assistant's reply.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the text is empty or whitespace, without
    /// touching the transcript. Returns `UpstreamFailure` if the provider
    /// fails or exceeds the configured timeout; the user message stays in
    /// the transcript unless rollback is enabled.
    pub async fn submit(
        &self,
        user_text: &str,
    ) -> parley_core::Result<AssistantReply, ConversationError> {
        if user_text.trim().is_empty() {
            return Err(ConversationError::invalid_request("No message provided").into());
        }

        let exchange_id = ExchangeId::new();
        self.run_exchange(user_text)
            .instrument(info_span!("exchange", id = %exchange_id))
            .await
    }

    async fn run_exchange(
        &self,
        user_text: &str,
    ) -> parley_core::Result<AssistantReply, ConversationError> {
        let _exchange = self.exchange_lock.lock().await;

        let request = {
            let mut transcript = self.transcript.write().await;
            transcript.push(Message::user(user_text));
            CompletionRequest::new(
                transcript.to_request_messages(&self.config.system_prompt),
                self.config.generation.clone(),
            )
        };

        let outcome = tokio::time::timeout(
            self.config.upstream_timeout,
            self.provider.complete(&request),
        )
        .await
        .unwrap_or(Err(LlmError::Timeout));

        let completion = match outcome {
            Ok(completion) => completion,
            Err(e) => return Err(self.record_failure(&e).await),
        };

        let conversation_length = {
            let mut transcript = self.transcript.write().await;
            transcript.push(Message::assistant(completion.content.clone()));
            let evicted = transcript.enforce_window();
            if evicted > 0 {
                debug!(evicted, "Evicted oldest turns from transcript");
            }
            transcript.len()
        };

        debug!(user_message = %user_text, "User message");
        debug!(assistant_message = %completion.content, "Assistant reply");
        info!(
            conversation_length,
            model = %completion.model,
            tokens = completion.usage.total(),
            "Exchange completed"
        );

        Ok(AssistantReply {
            response: completion.content,
            conversation_length,
        })
    }

    async fn record_failure(&self, error: &LlmError) -> Report<ConversationError> {
        warn!(
            error = %error,
            provider = self.provider.provider().as_str(),
            "Completion provider failed"
        );

        if self.config.rollback_on_failure {
            let mut transcript = self.transcript.write().await;
            if transcript.discard_pending_user().is_some() {
                debug!("Rolled back unanswered user message");
            }
        }

        ConversationError::UpstreamFailure {
            reason: error.to_string(),
        }
        .into()
    }

    /// Empties the transcript.
    ///
    /// Waits for any in-flight exchange so a late reply cannot land in the
    /// cleared transcript.
    pub async fn clear(&self) {
        let _exchange = self.exchange_lock.lock().await;
        self.transcript.write().await.clear();
        info!("Conversation history cleared");
    }

    /// Reports the current transcript length and window size.
    pub async fn health(&self) -> HealthStatus {
        let transcript = self.transcript.read().await;
        HealthStatus {
            status: "healthy",
            conversation_length: transcript.len(),
            max_history: transcript.max_history(),
        }
    }

    /// Returns a copy of the transcript, oldest first.
    pub async fn history(&self) -> Vec<Message> {
        self.transcript.read().await.iter().cloned().collect()
    }
}
