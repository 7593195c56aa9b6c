//! Session gate.
//!
//! The gate keeps the conversation hidden behind an overlay until the
//! backend acknowledges a session start. Starting is always user-initiated;
//! a failed start puts the gate back where it was so the user can retry.

use crate::backend::BackendError;
use tracing::{info, warn};
use uuid::Uuid;

/// Label of the overlay control when a start can be requested.
pub const START_LABEL: &str = "Start chat";

/// Label of the overlay control while a start is in flight.
pub const STARTING_LABEL: &str = "Starting...";

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Waiting for the user to start.
    #[default]
    NotStarted,
    /// Start request (or its post-success delay) in flight.
    Starting,
    /// Conversation is available.
    Active,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Starting => write!(f, "starting"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Handle for one start attempt; consumed by [`SessionGate::settle_start`].
#[derive(Debug)]
pub struct StartTicket {
    id: Uuid,
}

impl StartTicket {
    /// Attempt identifier, for logs.
    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Blocking overlay in front of the conversation.
#[derive(Debug, Default)]
pub struct SessionGate {
    state: SessionState,
    attempt: Option<Uuid>,
}

impl SessionGate {
    /// Create a gate in the `NotStarted` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the overlay hides the conversation.
    pub fn overlay_visible(&self) -> bool {
        self.state != SessionState::Active
    }

    /// Whether the session is active.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Label for the overlay's start control.
    pub fn control_label(&self) -> &'static str {
        match self.state {
            SessionState::Starting => STARTING_LABEL,
            SessionState::NotStarted | SessionState::Active => START_LABEL,
        }
    }

    /// Request a session start.
    ///
    /// Returns a ticket to dispatch, or `None` if a start is already in
    /// flight or the session is active.
    pub fn start(&mut self) -> Option<StartTicket> {
        if self.state != SessionState::NotStarted {
            return None;
        }
        let id = Uuid::new_v4();
        self.state = SessionState::Starting;
        self.attempt = Some(id);
        info!(attempt = %id, "session start requested");
        Some(StartTicket { id })
    }

    /// Apply the outcome of a start attempt.
    ///
    /// `Ok` must only be passed once the post-success delay has elapsed.
    pub fn settle_start(&mut self, ticket: StartTicket, result: Result<(), BackendError>) {
        if self.attempt != Some(ticket.id) {
            warn!(attempt = %ticket.id, "ignoring stale session start result");
            return;
        }
        self.attempt = None;
        match result {
            Ok(()) => {
                self.state = SessionState::Active;
                info!(attempt = %ticket.id, "session active");
            }
            Err(e) => {
                self.state = SessionState::NotStarted;
                warn!(attempt = %ticket.id, error = %e, "session start failed");
            }
        }
    }
}
