//! Message types for conversations.

use parley_ai::{ChatMessage, MessageRole};

/// A message in the transcript.
///
/// Messages are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: MessageRole,
    content: String,
}

impl Message {
    /// Creates a new message.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
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

    /// Returns the sender role.
    #[must_use]
    pub fn role(&self) -> MessageRole {
        self.role
    }

    /// Returns the message text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        ChatMessage::new(message.role, message.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_role() {
        assert_eq!(Message::user("a").role(), MessageRole::User);
        assert_eq!(Message::assistant("b").role(), MessageRole::Assistant);
    }

    #[test]
    fn converts_to_wire_message() {
        let message = Message::user("What's the weather today?");
        let wire = ChatMessage::from(&message);

        assert_eq!(wire.role, MessageRole::User);
        assert_eq!(wire.content, "What's the weather today?");
    }
}
