//! Conversation log types.
//!
//! A [`Message`] is one bubble in the transcript. The [`ConversationLog`] is
//! append-only except for the single in-place reconciliation of a pending
//! bot placeholder; its mutators are crate-private so only the conversation
//! controller can change it.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single bubble in the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text. Empty while a bot reply is pending.
    pub text: String,
    /// Whether the user authored this message.
    pub is_user: bool,
    /// True only for a bot placeholder awaiting its response.
    pub is_pending: bool,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a finalized user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
            is_pending: false,
            created_at: Utc::now(),
        }
    }

    /// Create a finalized bot message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
            is_pending: false,
            created_at: Utc::now(),
        }
    }

    /// Create a pending bot placeholder.
    pub fn placeholder() -> Self {
        Self {
            text: String::new(),
            is_user: false,
            is_pending: true,
            created_at: Utc::now(),
        }
    }
}

/// Ordered message log; insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    revision: u64,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recently appended message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Counter bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Index of the pending placeholder, if one exists.
    pub fn pending_index(&self) -> Option<usize> {
        self.messages.iter().position(|m| m.is_pending)
    }

    /// Append a message, returning its index.
    pub(crate) fn push(&mut self, message: Message) -> usize {
        debug_assert!(
            !(message.is_pending && self.pending_index().is_some()),
            "at most one pending placeholder"
        );
        self.messages.push(message);
        self.revision += 1;
        self.messages.len() - 1
    }

    /// Settle the placeholder at `slot` with its final text.
    ///
    /// Returns `false` (and changes nothing) if `slot` is not a pending
    /// placeholder.
    pub(crate) fn reconcile(&mut self, slot: usize, text: impl Into<String>) -> bool {
        match self.messages.get_mut(slot) {
            Some(message) if message.is_pending => {
                message.text = text.into();
                message.is_pending = false;
                self.revision += 1;
                true
            }
            _ => false,
        }
    }
}
