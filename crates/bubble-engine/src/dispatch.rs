//! Async drivers for dispatched tickets.
//!
//! Each function performs the network call a ticket stands for and returns
//! the ticket with its result, ready to be handed to the matching `settle_*`
//! operation on the owning state machine. They own everything they touch,
//! so they can run as spawned tokio tasks.

use crate::backend::{BackendError, ChatBackend, UploadAck};
use crate::conversation::{ChatTicket, UploadFile, UploadTicket};
use crate::session::StartTicket;
use std::sync::Arc;
use std::time::Duration;

/// Run a session start; on success wait `delay` before returning.
pub async fn run_start(
    backend: Arc<dyn ChatBackend>,
    ticket: StartTicket,
    delay: Duration,
) -> (StartTicket, Result<(), BackendError>) {
    let result = backend.start_session().await;
    if result.is_ok() && !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    (ticket, result)
}

/// Run a chat completion for a submitted message.
pub async fn run_chat(
    backend: Arc<dyn ChatBackend>,
    ticket: ChatTicket,
) -> (ChatTicket, Result<String, BackendError>) {
    let result = backend.complete(ticket.message()).await;
    (ticket, result)
}

/// Read the file (if needed) and upload it.
///
/// A read failure is returned as the upload's result without any network
/// call.
pub async fn run_upload(
    backend: Arc<dyn ChatBackend>,
    ticket: UploadTicket,
    file: UploadFile,
) -> (UploadTicket, Result<UploadAck, BackendError>) {
    let result = match file.read().await {
        Ok(bytes) => backend.upload(ticket.file_name(), bytes).await,
        Err(e) => Err(e),
    };
    (ticket, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Conversation, SubmitOutcome, UploadStart};
    use crate::session::{SessionGate, SessionState};
    use crate::testing::MockBackend;

    #[tokio::test(start_paused = true)]
    async fn test_start_waits_for_delay_after_success() {
        let backend = Arc::new(MockBackend::default());
        let mut gate = SessionGate::new();
        let ticket = gate.start().unwrap();

        let begun = tokio::time::Instant::now();
        let (ticket, result) =
            run_start(backend.clone(), ticket, Duration::from_secs(2)).await;
        assert!(begun.elapsed() >= Duration::from_secs(2));
        assert_eq!(gate.state(), SessionState::Starting);

        gate.settle_start(ticket, result);
        assert_eq!(gate.state(), SessionState::Active);
        assert!(!gate.overlay_visible());
        assert_eq!(backend.start_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_failure_skips_delay() {
        let backend = Arc::new(MockBackend::failing());
        let mut gate = SessionGate::new();
        let ticket = gate.start().unwrap();

        let begun = tokio::time::Instant::now();
        let (ticket, result) = run_start(backend, ticket, Duration::from_secs(2)).await;
        assert!(begun.elapsed() < Duration::from_secs(2));

        gate.settle_start(ticket, result);
        assert_eq!(gate.state(), SessionState::NotStarted);
        assert!(gate.overlay_visible());
        assert_eq!(gate.control_label(), crate::session::START_LABEL);
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let backend = Arc::new(MockBackend::replying("hi there"));
        let mut conversation = Conversation::default();
        let SubmitOutcome::Dispatched(ticket) = conversation.submit("hello") else {
            panic!("expected dispatch");
        };
        assert!(conversation.messages()[1].is_pending);

        let (ticket, result) = run_chat(backend.clone(), ticket).await;
        conversation.settle_chat(ticket, result);

        assert_eq!(backend.chat_messages(), vec!["hello".to_string()]);
        assert_eq!(conversation.messages()[1].text, "hi there");
        assert!(!conversation.messages()[1].is_pending);
        assert!(!conversation.is_disabled());
    }

    #[tokio::test]
    async fn test_upload_read_failure_skips_network() {
        let backend = Arc::new(MockBackend::default());
        let mut conversation = Conversation::default();
        let UploadStart::Dispatched { ticket, file } =
            conversation.upload_file(UploadFile::from_path("/no/such/dir/notes.txt"))
        else {
            panic!("expected dispatch");
        };

        let (ticket, result) = run_upload(backend.clone(), ticket, file).await;
        assert!(matches!(result, Err(BackendError::Io(_))));
        conversation.settle_upload(ticket, result);

        assert!(backend.uploads().is_empty());
        assert_eq!(
            conversation.messages().last().unwrap().text,
            crate::conversation::UPLOAD_ERROR_TEXT
        );
    }

    #[tokio::test]
    async fn test_upload_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "some notes").unwrap();

        let backend = Arc::new(MockBackend::default());
        let mut conversation = Conversation::default();
        let UploadStart::Dispatched { ticket, file } =
            conversation.upload_file(UploadFile::from_path(&path))
        else {
            panic!("expected dispatch");
        };
        let (ticket, result) = run_upload(backend.clone(), ticket, file).await;
        conversation.settle_upload(ticket, result);

        assert_eq!(
            backend.uploads(),
            vec![("notes.txt".to_string(), b"some notes".to_vec())]
        );
        assert_eq!(conversation.messages().last().unwrap().text, "received");
    }
}
