//! bubble-engine: Headless conversation engine for the bubble chat client
//!
//! This crate provides the state machines behind the chat UI, including:
//! - The session gate that must open before chatting
//! - The conversation controller (message log, input buffer, in-flight flags)
//! - The HTTP backend for the chat-start, chat-completion and upload endpoints
//! - Configuration loading

pub mod backend;
pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod input;
pub mod message;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use backend::{BackendError, ChatBackend, ChatPayload, HttpBackend, UploadAck};
pub use config::{Config, ConfigError, UploadPolicy};
pub use conversation::{
    has_upload_extension, ChatTicket, Conversation, ConversationSnapshot, FileSource,
    SubmitOutcome, UploadFile, UploadStart, UploadTicket, CHAT_ERROR_TEXT, UPLOAD_ERROR_TEXT,
    UPLOAD_REJECTED_TEXT,
};
pub use dispatch::{run_chat, run_start, run_upload};
pub use input::InputBuffer;
pub use message::{ConversationLog, Message};
pub use session::{SessionGate, SessionState, StartTicket};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
