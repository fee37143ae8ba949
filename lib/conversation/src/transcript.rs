//! Bounded conversation history.
//!
//! The transcript keeps user/assistant messages in dialogue order and
//! enforces a sliding window: once it grows past `max_history`, the oldest
//! turn (a user message and the reply that answered it) is dropped as a
//! unit until it fits again.

use crate::message::Message;
use parley_ai::{ChatMessage, MessageRole};
use std::collections::VecDeque;

/// Ordered user/assistant history, excluding the system prompt.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: VecDeque<Message>,
    max_history: usize,
}

impl Transcript {
    /// Creates an empty transcript with the given window size.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_history + 1),
            max_history,
        }
    }

    /// Returns the window size.
    #[must_use]
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Returns the number of retained messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no messages are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates messages oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Appends a message without applying the window.
    pub fn push(&mut self, message: Message) {
        self.messages.push_back(message);
    }

    /// Removes the newest message if it is an unanswered user message.
    pub fn discard_pending_user(&mut self) -> Option<Message> {
        match self.messages.back() {
            Some(last) if last.role() == MessageRole::User => self.messages.pop_back(),
            _ => None,
        }
    }

    /// Drops every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Evicts oldest turns until the window fits, returning how many
    /// messages were removed.
    ///
    /// An unanswered user message at the front is evicted alone instead of
    /// taking the next turn's user message with it, so the transcript always
    /// starts on a user message.
    pub fn enforce_window(&mut self) -> usize {
        let before = self.messages.len();
        while self.messages.len() > self.max_history {
            if !self.evict_oldest_turn() {
                break;
            }
        }
        before - self.messages.len()
    }

    /// Removes the oldest message together with the assistant reply that
    /// follows it. A user message that never got a reply goes alone.
    fn evict_oldest_turn(&mut self) -> bool {
        let Some(first) = self.messages.pop_front() else {
            return false;
        };

        if first.role() == MessageRole::User
            && self
                .messages
                .front()
                .is_some_and(|next| next.role() == MessageRole::Assistant)
        {
            self.messages.pop_front();
        }
        true
    }

    /// Builds the outbound sequence: system prompt followed by the history.
    #[must_use]
    pub fn to_request_messages(&self, system_prompt: &str) -> Vec<ChatMessage> {
        std::iter::once(ChatMessage::system(system_prompt))
            .chain(self.messages.iter().map(ChatMessage::from))
            .collect()
    }
}
