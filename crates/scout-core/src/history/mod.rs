//! Conversation history.
//!
//! History is a long-lived, append-only store keyed by session id. Turns are
//! never edited in place; reading returns the most recent turns oldest first.

mod memory;

use derive_more::{AsRef, Deref, From};
use jiff::Timestamp;
pub use memory::InMemoryConversationStore;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

pub use crate::{Error, Result};

/// Tracing target for conversation history operations.
pub const TRACING_TARGET: &str = "scout_core::history";

/// Identifier of a conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(AsRef, Deref, From, derive_more::Display)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new time-ordered session id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Role of a turn in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Message written by the user.
    User,
    /// Message produced by the assistant.
    Assistant,
}

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
    created_at: Timestamp,
}

impl Turn {
    /// Creates a turn stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Timestamp::now(),
        }
    }

    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Returns the turn role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the turn content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns when the turn was recorded.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Append-only conversation storage keyed by session.
///
/// Implementations must accept concurrent appends for different sessions
/// without losing updates.
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    /// Appends a turn to the session, creating the session if needed.
    async fn append(&self, session_id: SessionId, role: Role, content: &str) -> Result<()>;

    /// Returns up to `max` most recent turns of the session, oldest first.
    ///
    /// Unknown sessions have an empty history.
    async fn read(&self, session_id: SessionId, max: usize) -> Result<Vec<Turn>>;

    /// Removes all turns of the session.
    async fn clear(&self, session_id: SessionId) -> Result<()>;
}

/// Renders turns as a `Human:`/`Assistant:` transcript for prompts.
pub fn format_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| {
            let speaker = match turn.role() {
                Role::User => "Human",
                Role::Assistant => "Assistant",
            };
            format!("{speaker}: {}", turn.content())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
