//! Centralized server configuration.
//!
//! Configuration is loaded via the `config` crate from environment
//! variables. Nested settings use `__` as separator, so the model is set
//! with `COMPLETION__MODEL`.

use crate::error::ConfigurationError;
use parley_ai::{DEFAULT_MODEL, GROQ_BASE_URL, GenerationConfig, LlmBackendConfig};
use parley_conversation::{ConversationConfig, DEFAULT_MAX_HISTORY};
use rootcause::Report;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// Environment variable holding the completion API credential.
pub const API_KEY_VARIABLE: &str = "GROQ_API_KEY";

/// Server configuration.
#[derive(Deserialize)]
pub struct ServerConfig {
    /// Credential for the completion API. Required.
    #[serde(default)]
    pub groq_api_key: String,

    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Maximum number of messages kept in the transcript.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Drop the user message again when the completion call fails.
    #[serde(default)]
    pub rollback_on_failure: bool,

    /// Completion API settings.
    #[serde(default)]
    pub completion: CompletionConfig,
}

/// Completion API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on a single completion call, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    GROQ_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("groq_api_key", &"<redacted>")
            .field("bind_address", &self.bind_address)
            .field("max_history", &self.max_history)
            .field("rollback_on_failure", &self.rollback_on_failure)
            .field("completion", &self.completion)
            .finish()
    }
}

impl ServerConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is missing or a value is invalid.
    pub fn from_env() -> Result<Self, Report<ConfigurationError>> {
        Self::from_source(config::Environment::default())
    }

    /// Loads configuration from an explicit environment source.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is missing or a value is invalid.
    pub fn from_source(
        environment: config::Environment,
    ) -> Result<Self, Report<ConfigurationError>> {
        let config: Self = config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| ConfigurationError::Load {
                reason: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Report<ConfigurationError>> {
        if self.groq_api_key.trim().is_empty() {
            return Err(ConfigurationError::MissingCredential {
                variable: API_KEY_VARIABLE,
            }
            .into());
        }

        if self.max_history < 2 {
            return Err(ConfigurationError::Invalid {
                field: "max_history",
                reason: format!("must be at least 2, got {}", self.max_history),
            }
            .into());
        }

        if self.completion.timeout_seconds == 0 {
            return Err(ConfigurationError::Invalid {
                field: "completion.timeout_seconds",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Builds the completion backend settings.
    ///
    /// Any base URL other than Groq's is treated as a generic
    /// OpenAI-compatible endpoint.
    #[must_use]
    pub fn backend_config(&self) -> LlmBackendConfig {
        let api_key = self.groq_api_key.clone();
        let backend = if self.completion.base_url.trim_end_matches('/') == GROQ_BASE_URL {
            LlmBackendConfig::groq(api_key)
        } else {
            LlmBackendConfig::openai_compatible(&self.completion.base_url, api_key)
        };
        backend.with_request_timeout(self.upstream_timeout())
    }

    fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.completion.timeout_seconds)
    }

    /// Builds the conversation service settings.
    #[must_use]
    pub fn conversation_config(&self) -> ConversationConfig {
        ConversationConfig::default()
            .with_max_history(self.max_history)
            .with_generation(GenerationConfig::for_model(&self.completion.model))
            .with_upstream_timeout(self.upstream_timeout())
            .with_rollback_on_failure(self.rollback_on_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_ai::LlmProvider;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, Report<ConfigurationError>> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_source(config::Environment::default().source(Some(source)))
    }

    #[test]
    fn defaults_apply_when_only_credential_is_set() {
        let config = load(&[("GROQ_API_KEY", "gsk_test")]).expect("config");

        assert_eq!(config.groq_api_key, "gsk_test");
        assert_eq!(config.bind_address, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.max_history, 20);
        assert!(!config.rollback_on_failure);
        assert_eq!(config.completion.model, "llama-3.3-70b-versatile");
        assert_eq!(config.completion.base_url, GROQ_BASE_URL);
        assert_eq!(config.completion.timeout_seconds, 60);
    }

    #[test]
    fn missing_credential_is_rejected() {
        let err = load(&[("MAX_HISTORY", "10")]).expect_err("should fail");
        assert_eq!(
            err.current_context(),
            &ConfigurationError::MissingCredential {
                variable: "GROQ_API_KEY"
            }
        );
    }

    #[test]
    fn blank_credential_is_rejected() {
        let err = load(&[("GROQ_API_KEY", "   ")]).expect_err("should fail");
        assert!(matches!(
            err.current_context(),
            ConfigurationError::MissingCredential { .. }
        ));
    }

    #[test]
    fn overrides_are_read_from_environment() {
        let config = load(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("MAX_HISTORY", "4"),
            ("ROLLBACK_ON_FAILURE", "true"),
            ("COMPLETION__MODEL", "llama-3.1-8b-instant"),
            ("COMPLETION__TIMEOUT_SECONDS", "5"),
        ])
        .expect("config");

        assert_eq!(config.bind_address, "127.0.0.1:8080".parse().unwrap());
        assert!(config.rollback_on_failure);

        let conversation = config.conversation_config();
        assert_eq!(conversation.max_history, 4);
        assert_eq!(conversation.generation.model, "llama-3.1-8b-instant");
        assert_eq!(conversation.upstream_timeout, Duration::from_secs(5));
        assert!(conversation.rollback_on_failure);
    }

    #[test]
    fn tiny_window_is_rejected() {
        let err = load(&[("GROQ_API_KEY", "gsk_test"), ("MAX_HISTORY", "1")])
            .expect_err("should fail");
        assert!(matches!(
            err.current_context(),
            ConfigurationError::Invalid { field: "max_history", .. }
        ));
    }

    #[test]
    fn debug_output_hides_credential() {
        let config = load(&[("GROQ_API_KEY", "gsk_secret")]).expect("config");
        assert!(!format!("{config:?}").contains("gsk_secret"));
    }

    #[test]
    fn backend_config_uses_configured_base_url() {
        let config = load(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("COMPLETION__BASE_URL", "http://localhost:9000/v1"),
        ])
        .expect("config");

        let backend = config.backend_config();
        assert_eq!(backend.provider, LlmProvider::OpenAiCompatible);
        assert_eq!(backend.base_url, "http://localhost:9000/v1");
        assert_eq!(backend.api_key, "gsk_test");
    }

    #[test]
    fn default_backend_is_groq_with_request_timeout() {
        let config = load(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("COMPLETION__TIMEOUT_SECONDS", "15"),
        ])
        .expect("config");

        let backend = config.backend_config();
        assert_eq!(backend.provider, LlmProvider::Groq);
        assert_eq!(backend.base_url, GROQ_BASE_URL);
        assert_eq!(backend.request_timeout, Some(Duration::from_secs(15)));
    }
}
