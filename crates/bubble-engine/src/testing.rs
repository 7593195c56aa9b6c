//! In-memory [`ChatBackend`] for tests.
//!
//! Records every call and answers with canned replies, or fails every call
//! when built with [`MockBackend::failing`].

use crate::backend::{BackendError, ChatBackend, UploadAck};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Canned-response backend that records its calls.
#[derive(Debug)]
pub struct MockBackend {
    fail: bool,
    reply: String,
    upload_reply: String,
    start_calls: AtomicUsize,
    chat_messages: Mutex<Vec<String>>,
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            fail: false,
            reply: "ok".into(),
            upload_reply: "received".into(),
            start_calls: AtomicUsize::new(0),
            chat_messages: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }
}

impl MockBackend {
    /// Backend whose chat replies are `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            ..Self::default()
        }
    }

    /// Backend where every call fails with HTTP 503.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of session starts requested.
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// Chat messages received, in call order.
    pub fn chat_messages(&self) -> Vec<String> {
        self.chat_messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Uploads received as `(file_name, bytes)`.
    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }

    fn outcome(&self) -> Result<(), BackendError> {
        if self.fail {
            Err(BackendError::Status(503))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn start_session(&self) -> Result<(), BackendError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.outcome()
    }

    async fn complete(&self, message: &str) -> Result<String, BackendError> {
        if let Ok(mut messages) = self.chat_messages.lock() {
            messages.push(message.to_string());
        }
        self.outcome().map(|()| self.reply.clone())
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadAck, BackendError> {
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push((file_name.to_string(), bytes));
        }
        self.outcome().map(|()| UploadAck {
            message: self.upload_reply.clone(),
            file_id: serde_json::json!("abc"),
        })
    }
}
