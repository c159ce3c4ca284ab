//! Conversation turns and role vocabularies.
//!
//! Messages are stored in the client-facing vocabulary ([`Role`]) and
//! translated to the generator-facing vocabulary ([`GeneratorRole`]) only at
//! the generator call boundary. The translated form is never persisted.

use serde::{Deserialize, Serialize};

/// Role of a turn's author, in the client-facing vocabulary.
///
/// This enum is closed: a role string outside the vocabulary fails
/// deserialization instead of being silently dropped from context later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A turn written by the person chatting.
    User,
    /// A generated reply. Older frontends still send the `"ai"` spelling.
    #[serde(alias = "ai")]
    Assistant,
}

impl Role {
    /// String form used on the client-facing wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Translate into the generator vocabulary.
    ///
    /// Total over the closed vocabulary: adding a role without an image here
    /// is a compile error, so no turn can fall out of context unmapped.
    #[must_use]
    pub const fn normalized(self) -> GeneratorRole {
        match self {
            Self::User => GeneratorRole::User,
            Self::Assistant => GeneratorRole::Model,
        }
    }
}

/// Role vocabulary understood by the text-generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorRole {
    /// Human turn.
    User,
    /// Model turn.
    Model,
}

impl GeneratorRole {
    /// String form used on the provider wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// A single immutable turn in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author role, client vocabulary.
    pub role: Role,
    /// Turn text.
    pub content: String,
}

impl Message {
    /// Create a message.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Project this turn into the generator vocabulary for a provider call.
    #[must_use]
    pub fn normalized(&self) -> ContextMessage {
        ContextMessage {
            role: self.role.normalized(),
            content: self.content.clone(),
        }
    }
}

/// A turn translated for the generator boundary.
///
/// Exists only inside a single generator call; the store never sees one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMessage {
    /// Author role, generator vocabulary.
    pub role: GeneratorRole,
    /// Turn text.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_is_total() {
        assert_eq!(Role::User.normalized(), GeneratorRole::User);
        assert_eq!(Role::Assistant.normalized(), GeneratorRole::Model);
    }

    #[test]
    fn test_role_wire_forms() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(GeneratorRole::Model.as_str(), "model");
    }

    #[test]
    fn test_role_serde_accepts_legacy_ai_alias() {
        let role: Role = serde_json::from_str("\"ai\"").unwrap();
        assert_eq!(role, Role::Assistant);

        let role: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, Role::Assistant);

        // Closed vocabulary: anything else is an error, never a dropped turn.
        assert!(serde_json::from_str::<Role>("\"system\"").is_err());
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");

        let normalized = Message::assistant("Hi!").normalized();
        assert_eq!(normalized.role, GeneratorRole::Model);
        assert_eq!(normalized.content, "Hi!");
    }
}
