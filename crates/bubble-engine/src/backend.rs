//! Chat backend collaborators.
//!
//! The backend exposes three plain request/response endpoints: chat-start,
//! chat-completion and file-upload. [`ChatBackend`] is the seam the
//! controllers talk through; [`HttpBackend`] implements it over HTTP.

use crate::config::Config;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Path of the chat-start endpoint.
pub const START_PATH: &str = "/chat/start";

/// Path of the chat-completion endpoint.
pub const CHAT_PATH: &str = "/chat";

/// Path of the file-upload endpoint.
pub const UPLOAD_PATH: &str = "/upload";

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Body of a chat-completion request and response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    /// Message text.
    pub message: String,
}

/// Server acknowledgment of an upload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadAck {
    /// Text to show in the conversation.
    pub message: String,
    /// Opaque file identifier; logged, never stored.
    #[serde(rename = "fileId", default)]
    pub file_id: serde_json::Value,
}

/// The remote collaborators used by the session gate and the conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Begin a chat session (POST, empty body).
    async fn start_session(&self) -> Result<(), BackendError>;

    /// Send one chat message and return the bot reply.
    async fn complete(&self, message: &str) -> Result<String, BackendError>;

    /// Upload a file as multipart form data.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadAck, BackendError>;
}

/// HTTP implementation of [`ChatBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: Config,
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend for the configured base URL.
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        Ok(Self {
            config: config.clone(),
            http_client,
        })
    }

    /// Send a prepared request and return the body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn start_session(&self) -> Result<(), BackendError> {
        let url = self.config.endpoint(START_PATH);
        debug!(%url, "starting chat session");
        self.send(self.http_client.post(&url)).await?;
        Ok(())
    }

    async fn complete(&self, message: &str) -> Result<String, BackendError> {
        let url = self.config.endpoint(CHAT_PATH);
        debug!(%url, len = message.len(), "sending chat message");
        let body = ChatPayload {
            message: message.to_string(),
        };
        let bytes = self.send(self.http_client.post(&url).json(&body)).await?;
        let reply: ChatPayload = serde_json::from_slice(&bytes).map_err(BackendError::Decode)?;
        Ok(reply.message)
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadAck, BackendError> {
        let url = self.config.endpoint(UPLOAD_PATH);
        debug!(%url, file_name, size = bytes.len(), "uploading file");
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/plain")?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);
        let body = self.send(self.http_client.post(&url).multipart(form)).await?;
        serde_json::from_slice(&body).map_err(BackendError::Decode)
    }
}

/// Errors from talking to the backend.
///
/// The UI collapses all of these into one "request failed" outcome; the
/// variants only exist for logs.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Connection, timeout or protocol failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("Backend returned HTTP {0}")]
    Status(u16),

    /// Response body did not match the expected JSON shape.
    #[error("Malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Local file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_payload_wire_shape() {
        let json = serde_json::to_string(&ChatPayload {
            message: "hello".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"message":"hello"}"#);
    }

    #[test]
    fn test_upload_ack_opaque_file_id() {
        let ack: UploadAck =
            serde_json::from_str(r#"{"message":"received","fileId":"abc"}"#).unwrap();
        assert_eq!(ack.message, "received");
        assert_eq!(ack.file_id, serde_json::json!("abc"));

        let numeric: UploadAck =
            serde_json::from_str(r#"{"message":"ok","fileId":17}"#).unwrap();
        assert_eq!(numeric.file_id, serde_json::json!(17));

        let missing: UploadAck = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert!(missing.file_id.is_null());
    }

    #[test]
    fn test_http_backend_builds_with_timeout() {
        let config = Config {
            request_timeout_secs: Some(5),
            ..Config::default()
        };
        assert!(HttpBackend::new(&config).is_ok());
    }
}
