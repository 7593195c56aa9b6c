//! Conversation controller.
//!
//! [`Conversation`] owns the message log, the input buffer and the in-flight
//! bookkeeping. Every user action goes through one of its operations, which
//! update local state synchronously and hand back a ticket describing the
//! network call to make. The result of that call is applied with the
//! matching `settle_*` operation, which consumes the ticket, so each
//! placeholder is reconciled at most once.
//!
//! Only one chat request may be in flight; a second submit is refused as
//! [`SubmitOutcome::Busy`]. Uploads follow the configured [`UploadPolicy`].

use crate::backend::{BackendError, UploadAck};
use crate::config::UploadPolicy;
use crate::input::InputBuffer;
use crate::message::{ConversationLog, Message};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Bot text shown when a chat request fails.
pub const CHAT_ERROR_TEXT: &str = "Error fetching the chat response";

/// Bot text shown when a non-`.txt` file is chosen.
pub const UPLOAD_REJECTED_TEXT: &str = "txt 확장자 파일만 받습니다.";

/// Bot text shown when an upload fails.
pub const UPLOAD_ERROR_TEXT: &str = "Error uploading the file";

/// The only accepted upload extension (compared case-insensitively).
pub const UPLOAD_EXTENSION: &str = "txt";

/// Handle for one dispatched chat request.
#[derive(Debug)]
pub struct ChatTicket {
    id: Uuid,
    message: String,
    slot: usize,
}

impl ChatTicket {
    /// Request identifier, for logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Raw message text to send.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Handle for one dispatched upload.
#[derive(Debug)]
pub struct UploadTicket {
    id: Uuid,
    file_name: String,
}

impl UploadTicket {
    /// Request identifier, for logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the uploaded file.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Where an upload's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Bytes already in memory.
    Bytes(Vec<u8>),
    /// File to read when the upload is dispatched.
    Path(PathBuf),
}

/// A file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name sent to the server and used for validation.
    pub name: String,
    /// Content source.
    pub source: FileSource,
}

impl UploadFile {
    /// A file read lazily from disk; the name is the path's last component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            source: FileSource::Path(path),
        }
    }

    /// A file whose bytes are already loaded.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    /// Resolve the file's bytes.
    pub async fn read(self) -> Result<Vec<u8>, BackendError> {
        match self.source {
            FileSource::Bytes(bytes) => Ok(bytes),
            FileSource::Path(path) => Ok(tokio::fs::read(&path).await?),
        }
    }
}

/// Whether a file name carries the accepted upload extension.
///
/// The extension is whatever follows the last `.`, so `.txt` is accepted
/// and a bare `txt` is not.
pub fn has_upload_extension(file_name: &str) -> bool {
    let name = Path::new(file_name)
        .file_name()
        .map_or(file_name.into(), |n| n.to_string_lossy());
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(UPLOAD_EXTENSION))
}

/// Result of [`Conversation::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Messages appended; dispatch the ticket.
    Dispatched(ChatTicket),
    /// Input was empty after trimming; nothing changed.
    Empty,
    /// A chat request is already in flight; nothing changed.
    Busy,
}

/// Result of [`Conversation::upload_file`].
#[derive(Debug)]
pub enum UploadStart {
    /// Extension accepted; upload `file` and settle `ticket`.
    Dispatched {
        /// Settlement handle.
        ticket: UploadTicket,
        /// File to send.
        file: UploadFile,
    },
    /// Wrong extension; a rejection message was appended.
    Rejected,
    /// Refused by the exclusive upload policy; nothing changed.
    Busy,
}

/// Read-only view of the conversation for renderers.
#[derive(Debug, Clone)]
pub struct ConversationSnapshot {
    /// Messages in display order.
    pub messages: Vec<Message>,
    /// Whether the input is disabled.
    pub disabled: bool,
    /// Log revision the snapshot was taken at.
    pub revision: u64,
}

/// The conversation controller.
#[derive(Debug, Default)]
pub struct Conversation {
    log: ConversationLog,
    input: InputBuffer,
    chat_in_flight: Option<Uuid>,
    uploads_in_flight: usize,
    upload_policy: UploadPolicy,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new(upload_policy: UploadPolicy) -> Self {
        Self {
            upload_policy,
            ..Self::default()
        }
    }

    /// The message log.
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    /// The input buffer.
    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// Mutable access to the input buffer for editing keys.
    pub fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    /// Whether input is disabled (a chat request is in flight).
    pub fn is_disabled(&self) -> bool {
        self.chat_in_flight.is_some()
    }

    /// Number of uploads awaiting settlement.
    pub fn uploads_in_flight(&self) -> usize {
        self.uploads_in_flight
    }

    /// Active upload policy.
    pub fn upload_policy(&self) -> UploadPolicy {
        self.upload_policy
    }

    /// Copy out a read-only snapshot.
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.log.messages().to_vec(),
            disabled: self.is_disabled(),
            revision: self.log.revision(),
        }
    }

    /// Submit a chat message.
    ///
    /// Appends the user message, clears the input, disables it, and appends
    /// a pending bot placeholder.
    pub fn submit(&mut self, raw_text: &str) -> SubmitOutcome {
        if raw_text.trim().is_empty() {
            return SubmitOutcome::Empty;
        }
        if self.chat_in_flight.is_some() {
            debug!("submit refused: chat already in flight");
            return SubmitOutcome::Busy;
        }

        self.log.push(Message::user(raw_text));
        self.input.clear();
        let id = Uuid::new_v4();
        self.chat_in_flight = Some(id);
        let slot = self.log.push(Message::placeholder());

        debug!(request = %id, slot, "chat dispatched");
        SubmitOutcome::Dispatched(ChatTicket {
            id,
            message: raw_text.to_string(),
            slot,
        })
    }

    /// Submit whatever is in the input buffer.
    ///
    /// The buffer is left untouched when the submit is refused.
    pub fn submit_buffer(&mut self) -> SubmitOutcome {
        if self.input.is_blank() {
            return SubmitOutcome::Empty;
        }
        if self.chat_in_flight.is_some() {
            return SubmitOutcome::Busy;
        }
        let text = self.input.submit();
        self.submit(&text)
    }

    /// Reconcile a chat placeholder with its response.
    pub fn settle_chat(&mut self, ticket: ChatTicket, result: Result<String, BackendError>) {
        let text = match result {
            Ok(text) => {
                info!(request = %ticket.id, "chat response received");
                text
            }
            Err(e) => {
                warn!(request = %ticket.id, error = %e, "chat request failed");
                CHAT_ERROR_TEXT.to_string()
            }
        };

        if !self.log.reconcile(ticket.slot, text) {
            warn!(request = %ticket.id, slot = ticket.slot, "no pending placeholder at slot");
        }
        if self.chat_in_flight == Some(ticket.id) {
            self.chat_in_flight = None;
        }
    }

    /// Start a file upload.
    pub fn upload_file(&mut self, file: UploadFile) -> UploadStart {
        if !has_upload_extension(&file.name) {
            info!(file_name = %file.name, "upload rejected: not a .txt file");
            self.log.push(Message::bot(UPLOAD_REJECTED_TEXT));
            return UploadStart::Rejected;
        }
        if self.upload_policy == UploadPolicy::Exclusive
            && (self.chat_in_flight.is_some() || self.uploads_in_flight > 0)
        {
            debug!(file_name = %file.name, "upload refused: request in flight");
            return UploadStart::Busy;
        }

        let id = Uuid::new_v4();
        self.uploads_in_flight += 1;
        debug!(request = %id, file_name = %file.name, "upload dispatched");
        UploadStart::Dispatched {
            ticket: UploadTicket {
                id,
                file_name: file.name.clone(),
            },
            file,
        }
    }

    /// Append the outcome of an upload.
    pub fn settle_upload(&mut self, ticket: UploadTicket, result: Result<UploadAck, BackendError>) {
        self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
        let text = match result {
            Ok(ack) => {
                info!(
                    request = %ticket.id,
                    file_name = %ticket.file_name,
                    file_id = %ack.file_id,
                    "file uploaded"
                );
                ack.message
            }
            Err(e) => {
                warn!(
                    request = %ticket.id,
                    file_name = %ticket.file_name,
                    error = %e,
                    "upload failed"
                );
                UPLOAD_ERROR_TEXT.to_string()
            }
        };
        self.log.push(Message::bot(text));
    }
}
