//! Chat completion primitives for parley.
//!
//! This crate provides:
//!
//! - **Backend**: the [`CompletionProvider`] trait and the request/response
//!   types exchanged with a remote model
//! - **OpenAI-compatible client**: an HTTP implementation speaking the
//!   `/chat/completions` protocol used by Groq and similar services

pub mod backend;
pub mod error;
pub mod openai_compat;

pub use backend::{
    ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, DEFAULT_MODEL,
    GROQ_BASE_URL, GenerationConfig, LlmBackendConfig, LlmProvider, MessageRole, TokenUsage,
};
pub use error::LlmError;
pub use openai_compat::OpenAiCompatClient;
