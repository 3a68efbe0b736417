//! UI-agnostic chat state types
//!
//! These are shared by the controller and the chat client and don't depend on
//! any specific UI framework.

use serde::{Deserialize, Serialize};

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: ChatRole,
    content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Label shown above the message in the transcript
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "Assistant",
        }
    }
}

/// Ordered conversation history, sent verbatim as the request payload.
///
/// Appends are transactional: a user message is staged before the request
/// goes out, then either committed with the assistant reply or rolled back
/// so a failed turn never reaches a later request.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
    staged: Option<usize>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message and remember it as the open turn.
    pub fn stage_user(&mut self, content: impl Into<String>) {
        self.staged = Some(self.messages.len());
        self.messages.push(ChatMessage::user(content));
    }

    /// Close the open turn by appending the assistant reply.
    pub fn commit(&mut self, reply: impl Into<String>) {
        self.staged = None;
        self.messages.push(ChatMessage::assistant(reply));
    }

    /// Drop the staged user message. Returns it, or `None` when no turn is open.
    pub fn rollback(&mut self) -> Option<ChatMessage> {
        let index = self.staged.take()?;
        if index >= self.messages.len() {
            return None;
        }
        let removed = self.messages.remove(index);
        self.messages.truncate(index);
        Some(removed)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }
}
