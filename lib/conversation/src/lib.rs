//! Conversation service for parley.
//!
//! This crate provides:
//!
//! - **Transcript**: the bounded, ordered user/assistant history
//! - **Conversation Service**: submit, clear and health over one shared
//!   transcript, delegating replies to a completion provider

pub mod error;
pub mod message;
pub mod service;
pub mod transcript;

pub use error::ConversationError;
pub use message::Message;
pub use service::{
    AssistantReply, ConversationConfig, ConversationService, DEFAULT_MAX_HISTORY, HealthStatus,
    SYSTEM_PROMPT,
};
pub use transcript::Transcript;
