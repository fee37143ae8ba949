//! Error types for the conversation crate.
//!
//! Service operations return `Report<ConversationError>` so the transport
//! can pick a status code from the variant and log the full report.

use std::fmt;

/// Errors from conversation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// The caller supplied a missing, empty or malformed message.
    ///
    /// Raised before any state is touched.
    InvalidRequest { reason: String },
    /// The completion provider failed or timed out.
    ///
    /// The user message may remain in the transcript.
    UpstreamFailure { reason: String },
}

impl ConversationError {
    /// Creates an `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Returns true if the caller is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. })
    }
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest { reason } => write!(f, "{reason}"),
            Self::UpstreamFailure { reason } => {
                write!(f, "upstream completion failed: {reason}")
            }
        }
    }
}

impl std::error::Error for ConversationError {}
