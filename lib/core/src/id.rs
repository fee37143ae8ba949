//! Identifiers for relay activity.
//!
//! IDs use ULIDs so that log lines sort by creation time.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifies one submit exchange (user message in, assistant reply out).
///
/// Attached to the tracing span of every submit so that the request,
/// the upstream call and the transcript update can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeId(Ulid);

impl ExchangeId {
    /// Creates a new exchange ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xchg_{}", self.0)
    }
}
