//! Background requests spawned by the event loop.

use bubble_engine::{
    run_chat, run_start, run_upload, BackendError, ChatBackend, ChatTicket, StartTicket,
    UploadAck, UploadFile, UploadTicket,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// A request the app wants performed.
#[derive(Debug)]
pub enum Dispatch {
    Start(StartTicket),
    Chat(ChatTicket),
    Upload { ticket: UploadTicket, file: UploadFile },
}

/// A finished request, ready to be applied to the app.
#[derive(Debug)]
pub enum Completion {
    Start(StartTicket, Result<(), BackendError>),
    Chat(ChatTicket, Result<String, BackendError>),
    Upload(UploadTicket, Result<UploadAck, BackendError>),
}

/// Run a dispatch to completion.
pub async fn perform(
    backend: Arc<dyn ChatBackend>,
    dispatch: Dispatch,
    start_delay: Duration,
) -> Completion {
    match dispatch {
        Dispatch::Start(ticket) => {
            debug!(attempt = %ticket.id(), "starting session");
            let (ticket, result) = run_start(backend, ticket, start_delay).await;
            Completion::Start(ticket, result)
        }
        Dispatch::Chat(ticket) => {
            debug!(request = %ticket.id(), "sending chat message");
            let (ticket, result) = run_chat(backend, ticket).await;
            Completion::Chat(ticket, result)
        }
        Dispatch::Upload { ticket, file } => {
            debug!(request = %ticket.id(), file_name = %ticket.file_name(), "uploading file");
            let (ticket, result) = run_upload(backend, ticket, file).await;
            Completion::Upload(ticket, result)
        }
    }
}

/// Spawn a dispatch as a tokio task.
pub fn spawn_dispatch(
    backend: Arc<dyn ChatBackend>,
    dispatch: Dispatch,
    start_delay: Duration,
) -> JoinHandle<Completion> {
    tokio::spawn(perform(backend, dispatch, start_delay))
}
