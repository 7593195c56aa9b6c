//! Application state for the bubble TUI.

use crate::commands::{parse_command, Command};
use crate::event::Action;
use crate::tasks::{Completion, Dispatch};
use bubble_engine::{
    Config, Conversation, InputBuffer, SessionGate, SubmitOutcome, UploadFile, UploadStart,
};
use std::cell::Cell;
use std::path::PathBuf;
use tracing::debug;

/// Ticks a notification stays on screen (3 seconds at 4 Hz).
const NOTIFICATION_TICKS: usize = 12;

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Start-session gate shown over the chat until it opens.
    pub gate: SessionGate,

    /// Message log and composer.
    pub conversation: Conversation,

    /// Path prompt for attaching a file, when open.
    pub attach: Option<InputBuffer>,

    /// Backend base URL, shown in the status bar.
    pub api_base_url: String,

    /// Tick counter for animations.
    pub tick: usize,

    /// Notification message (displayed temporarily, cleared after some ticks).
    pub notification: Option<String>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,

    /// Transcript lines scrolled up from the bottom. Zero follows new messages.
    pub scroll_up: usize,

    /// Log revision the view last followed.
    seen_revision: u64,

    /// Furthest the transcript can scroll, as of the last render.
    pub(crate) scroll_limit: Cell<usize>,

    /// Transcript height, as of the last render.
    pub(crate) page_height: Cell<usize>,
}

impl App {
    /// Create a new app instance.
    pub fn new(config: &Config) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            gate: SessionGate::new(),
            conversation: Conversation::new(config.upload_policy),
            attach: None,
            api_base_url: config.api_base_url.clone(),
            tick: 0,
            notification: None,
            notification_ttl: 0,
            scroll_up: 0,
            seen_revision: 0,
            scroll_limit: Cell::new(0),
            page_height: Cell::new(10),
        }
    }

    /// Handle an action, returning a request to dispatch if it started one.
    pub fn handle_action(&mut self, action: Action) -> Option<Dispatch> {
        if action == Action::Quit {
            self.should_quit = true;
            return None;
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return None;
        }
        if action == Action::Help {
            self.show_help = true;
            return None;
        }

        let dispatch = if self.attach.is_some() {
            self.handle_attach_action(action)
        } else if self.gate.overlay_visible() {
            self.handle_gate_action(action)
        } else {
            self.handle_chat_action(action)
        };
        self.sync_autoscroll();
        dispatch
    }

    /// Insert pasted text into whatever has focus.
    ///
    /// Line breaks stay in the composer so a multi-line paste becomes one
    /// message. The attach prompt keeps only the first line.
    pub fn paste(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if self.show_help || text.is_empty() {
            return;
        }
        if let Some(prompt) = self.attach.as_mut() {
            prompt.insert_str(text.lines().next().unwrap_or_default());
        } else if self.gate.is_active() && !self.conversation.is_disabled() {
            self.conversation.input_mut().insert_str(&text);
        }
    }

    fn handle_gate_action(&mut self, action: Action) -> Option<Dispatch> {
        match action {
            Action::Submit => self.gate.start().map(Dispatch::Start),
            Action::Insert('q') | Action::Cancel => {
                self.should_quit = true;
                None
            }
            Action::Insert('?') => {
                self.show_help = true;
                None
            }
            _ => None,
        }
    }

    fn handle_chat_action(&mut self, action: Action) -> Option<Dispatch> {
        match action {
            Action::Submit => return self.submit(),
            Action::Attach => {
                self.attach = Some(InputBuffer::new());
                return None;
            }
            Action::ScrollUp => self.scroll_by(1, true),
            Action::ScrollDown => self.scroll_by(1, false),
            Action::PageUp => self.scroll_by(self.page_height.get(), true),
            Action::PageDown => self.scroll_by(self.page_height.get(), false),
            _ => {}
        }

        // The composer is read-only while a reply is pending
        if self.conversation.is_disabled() {
            return None;
        }
        let input = self.conversation.input_mut();
        match action {
            Action::Newline => input.newline(),
            Action::Insert(c) => input.insert(c),
            Action::Backspace => input.backspace(),
            Action::Delete => input.delete(),
            Action::Left => input.move_left(),
            Action::Right => input.move_right(),
            Action::Home => input.move_home(),
            Action::End => input.move_end(),
            Action::HistoryPrev => input.history_prev(),
            Action::HistoryNext => input.history_next(),
            _ => {}
        }
        None
    }

    fn handle_attach_action(&mut self, action: Action) -> Option<Dispatch> {
        let prompt = self.attach.as_mut()?;
        match action {
            Action::Submit => {
                let path = prompt.take();
                self.attach = None;
                if path.trim().is_empty() {
                    return None;
                }
                return self.upload(&path);
            }
            Action::Cancel => self.attach = None,
            Action::Insert(c) => prompt.insert(c),
            Action::Backspace => prompt.backspace(),
            Action::Delete => prompt.delete(),
            Action::Left => prompt.move_left(),
            Action::Right => prompt.move_right(),
            Action::Home => prompt.move_home(),
            Action::End => prompt.move_end(),
            _ => {}
        }
        None
    }

    /// Submit the composer: run a slash command or send a chat message.
    fn submit(&mut self) -> Option<Dispatch> {
        if let Some(command) = parse_command(self.conversation.input().content()) {
            self.conversation.input_mut().submit();
            return self.run_command(command);
        }

        match self.conversation.submit_buffer() {
            SubmitOutcome::Dispatched(ticket) => Some(Dispatch::Chat(ticket)),
            SubmitOutcome::Busy => {
                self.set_notification("Waiting for the previous reply".to_string());
                None
            }
            SubmitOutcome::Empty => None,
        }
    }

    fn run_command(&mut self, command: Command) -> Option<Dispatch> {
        debug!(?command, "slash command");
        match command {
            Command::Upload(Some(path)) => return self.upload(&path),
            Command::Upload(None) => self.attach = Some(InputBuffer::new()),
            Command::Quit => self.should_quit = true,
            Command::Help => self.show_help = true,
            Command::ClearInput => self.conversation.input_mut().clear(),
            Command::Unknown(name) => self.set_notification(format!("Unknown command: /{name}")),
        }
        None
    }

    /// Start uploading the file at `path`.
    fn upload(&mut self, path: &str) -> Option<Dispatch> {
        let file = UploadFile::from_path(PathBuf::from(path.trim()));
        match self.conversation.upload_file(file) {
            UploadStart::Dispatched { ticket, file } => Some(Dispatch::Upload { ticket, file }),
            UploadStart::Rejected => None,
            UploadStart::Busy => {
                self.set_notification("Another request is in flight".to_string());
                None
            }
        }
    }

    /// Apply a finished request.
    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Start(ticket, result) => {
                let failed = result.is_err();
                self.gate.settle_start(ticket, result);
                if failed {
                    self.set_notification("Could not start the chat".to_string());
                }
            }
            Completion::Chat(ticket, result) => self.conversation.settle_chat(ticket, result),
            Completion::Upload(ticket, result) => self.conversation.settle_upload(ticket, result),
        }
        self.sync_autoscroll();
    }

    /// Snap back to the newest message whenever the log changed.
    fn sync_autoscroll(&mut self) {
        let revision = self.conversation.log().revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.scroll_up = 0;
        }
    }

    fn scroll_by(&mut self, lines: usize, up: bool) {
        self.scroll_up = if up {
            self.scroll_up
                .saturating_add(lines)
                .min(self.scroll_limit.get())
        } else {
            self.scroll_up.saturating_sub(lines)
        };
    }

    /// Whether the transcript is pinned to the newest message.
    pub fn is_following(&self) -> bool {
        self.scroll_up == 0
    }

    /// Set a temporary notification message.
    fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Update tick counter (called on each tick event).
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        // Clear notification after TTL expires
        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::perform;
    use crate::test_utils::{active_test_app, create_test_app, type_text};
    use bubble_engine::testing::MockBackend;
    use bubble_engine::{
        Message, SessionState, UploadPolicy, CHAT_ERROR_TEXT, UPLOAD_REJECTED_TEXT,
    };
    use std::sync::Arc;
    use std::time::Duration;

    async fn complete(app: &mut App, backend: &Arc<MockBackend>, dispatch: Option<Dispatch>) {
        let dispatch = dispatch.expect("expected a dispatch");
        let completion = perform(backend.clone(), dispatch, Duration::ZERO).await;
        app.apply(completion);
    }

    fn entries(app: &App) -> Vec<(bool, bool, String)> {
        app.conversation
            .messages()
            .iter()
            .map(|m: &Message| (m.is_user, m.is_pending, m.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_multiline_paste_stays_in_composer() {
        let mut app = active_test_app();
        let backend = Arc::new(MockBackend::default());

        app.paste("line one\nline two");
        assert_eq!(app.conversation.input().content(), "line one\nline two");
        assert!(app.conversation.messages().is_empty());

        let dispatch = app.handle_action(Action::Submit);
        complete(&mut app, &backend, dispatch).await;
        assert_eq!(backend.chat_messages(), vec!["line one\nline two".to_string()]);
        assert_eq!(
            entries(&app),
            vec![
                (true, false, "line one\nline two".to_string()),
                (false, false, "ok".to_string()),
            ]
        );
    }

    #[test]
    fn test_paste_normalizes_line_endings_at_cursor() {
        let mut app = active_test_app();
        type_text(&mut app, "ad");
        app.handle_action(Action::Left);
        app.paste("b\r\nc\r");
        assert_eq!(app.conversation.input().content(), "ab\nc\nd");
    }

    #[test]
    fn test_paste_ignored_while_waiting_or_gated() {
        let mut gated = create_test_app();
        gated.paste("hello");
        assert!(gated.conversation.input().is_empty());

        let mut app = active_test_app();
        type_text(&mut app, "first");
        assert!(app.handle_action(Action::Submit).is_some());
        app.paste("second");
        assert!(app.conversation.input().is_empty());
    }

    #[test]
    fn test_paste_into_attach_prompt_keeps_first_line() {
        let mut app = active_test_app();
        app.handle_action(Action::Attach);
        app.paste("notes.txt\nextra");
        assert_eq!(
            app.attach.as_ref().map(InputBuffer::content),
            Some("notes.txt")
        );
        assert!(app.conversation.input().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_on_gate_starts_session() {
        let mut app = create_test_app();
        let backend = Arc::new(MockBackend::default());

        let dispatch = app.handle_action(Action::Submit);
        assert_eq!(app.gate.control_label(), "Starting...");
        assert!(app.gate.overlay_visible());
        assert!(app.handle_action(Action::Submit).is_none());

        let Some(dispatch) = dispatch else {
            panic!("expected a start dispatch");
        };
        let completion = perform(backend.clone(), dispatch, Duration::from_secs(2)).await;
        app.apply(completion);

        assert_eq!(app.gate.state(), SessionState::Active);
        assert!(!app.gate.overlay_visible());
        assert_eq!(backend.start_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_start_resets_gate() {
        let mut app = create_test_app();
        let backend = Arc::new(MockBackend::failing());

        let dispatch = app.handle_action(Action::Submit);
        complete(&mut app, &backend, dispatch).await;

        assert_eq!(app.gate.state(), SessionState::NotStarted);
        assert!(app.gate.overlay_visible());
        assert_eq!(app.gate.control_label(), "Start chat");
        assert!(app.notification.is_some());
    }

    #[test]
    fn test_gate_keys() {
        let mut app = create_test_app();
        app.handle_action(Action::Insert('x'));
        assert!(app.conversation.input().is_empty());

        app.handle_action(Action::Insert('?'));
        assert!(app.show_help);
        app.handle_action(Action::Insert('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit);

        app.handle_action(Action::Insert('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_chat_reply_replaces_placeholder() {
        let mut app = active_test_app();
        let backend = Arc::new(MockBackend::replying("hi there"));

        type_text(&mut app, "hello");
        let dispatch = app.handle_action(Action::Submit);
        assert_eq!(
            entries(&app),
            vec![(true, false, "hello".into()), (false, true, String::new())]
        );
        assert!(app.conversation.is_disabled());
        assert!(app.conversation.input().is_empty());

        // Typing is ignored while the reply is pending
        app.handle_action(Action::Insert('x'));
        assert!(app.conversation.input().is_empty());

        complete(&mut app, &backend, dispatch).await;
        assert_eq!(
            entries(&app),
            vec![(true, false, "hello".into()), (false, false, "hi there".into())]
        );
        assert!(!app.conversation.is_disabled());
        assert_eq!(backend.chat_messages(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_chat_failure_shows_error_text() {
        let mut app = active_test_app();
        let backend = Arc::new(MockBackend::failing());

        type_text(&mut app, "hello");
        let dispatch = app.handle_action(Action::Submit);
        complete(&mut app, &backend, dispatch).await;

        assert_eq!(
            entries(&app),
            vec![
                (true, false, "hello".into()),
                (false, false, CHAT_ERROR_TEXT.into())
            ]
        );
        assert!(!app.conversation.is_disabled());
    }

    #[test]
    fn test_blank_submit_does_nothing() {
        let mut app = active_test_app();
        type_text(&mut app, "   ");
        assert!(app.handle_action(Action::Submit).is_none());
        assert!(app.conversation.messages().is_empty());
    }

    #[test]
    fn test_newline_keeps_composing() {
        let mut app = active_test_app();
        type_text(&mut app, "one");
        app.handle_action(Action::Newline);
        type_text(&mut app, "two");
        assert_eq!(app.conversation.input().content(), "one\ntwo");
        assert!(app.conversation.messages().is_empty());
    }

    #[test]
    fn test_upload_command_rejects_wrong_extension() {
        let mut app = active_test_app();
        type_text(&mut app, "/upload notes.pdf");
        assert!(app.handle_action(Action::Submit).is_none());

        assert_eq!(
            entries(&app),
            vec![(false, false, UPLOAD_REJECTED_TEXT.into())]
        );
        assert!(app.conversation.input().is_empty());
    }

    #[tokio::test]
    async fn test_upload_command_appends_ack() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "some notes").unwrap();

        let mut app = active_test_app();
        let backend = Arc::new(MockBackend::default());
        type_text(&mut app, &format!("/upload {}", path.display()));
        let dispatch = app.handle_action(Action::Submit);
        assert!(app.conversation.messages().is_empty());

        complete(&mut app, &backend, dispatch).await;
        assert_eq!(entries(&app), vec![(false, false, "received".into())]);
        assert_eq!(
            backend.uploads(),
            vec![("notes.txt".to_string(), b"some notes".to_vec())]
        );
    }

    #[tokio::test]
    async fn test_attach_prompt_works_while_reply_pending() {
        let mut app = active_test_app();
        let backend = Arc::new(MockBackend::default());

        type_text(&mut app, "hello");
        let chat = app.handle_action(Action::Submit);
        assert!(chat.is_some());

        app.handle_action(Action::Attach);
        assert!(app.attach.is_some());
        for c in "notes.txt".chars() {
            app.handle_action(Action::Insert(c));
        }
        let upload = app.handle_action(Action::Submit);
        assert!(matches!(upload, Some(Dispatch::Upload { .. })));
        assert!(app.attach.is_none());

        // Nonexistent path: the read fails and the upload reports an error
        complete(&mut app, &backend, upload).await;
        complete(&mut app, &backend, chat).await;
        let texts: Vec<String> = entries(&app).into_iter().map(|e| e.2).collect();
        assert_eq!(texts, vec!["hello", "ok", "Error uploading the file"]);
        assert!(backend.uploads().is_empty());
    }

    #[test]
    fn test_exclusive_policy_notifies_busy() {
        let config = Config {
            upload_policy: UploadPolicy::Exclusive,
            ..Config::default()
        };
        let mut app = App::new(&config);
        let ticket = app.gate.start().unwrap();
        app.gate.settle_start(ticket, Ok(()));

        type_text(&mut app, "hello");
        assert!(app.handle_action(Action::Submit).is_some());
        app.handle_action(Action::Attach);
        for c in "a.txt".chars() {
            app.handle_action(Action::Insert(c));
        }
        assert!(app.handle_action(Action::Submit).is_none());
        assert_eq!(
            app.notification.as_deref(),
            Some("Another request is in flight")
        );
    }

    #[test]
    fn test_attach_cancel() {
        let mut app = active_test_app();
        app.handle_action(Action::Attach);
        app.handle_action(Action::Insert('x'));
        app.handle_action(Action::Cancel);
        assert!(app.attach.is_none());
        assert!(app.conversation.input().is_empty());
    }

    #[test]
    fn test_slash_commands() {
        let mut app = active_test_app();
        type_text(&mut app, "/nope");
        app.handle_action(Action::Submit);
        assert_eq!(app.notification.as_deref(), Some("Unknown command: /nope"));
        assert!(app.conversation.messages().is_empty());

        type_text(&mut app, "/help");
        app.handle_action(Action::Submit);
        assert!(app.show_help);
        app.handle_action(Action::Insert('z'));
        assert!(!app.show_help);
        assert!(app.conversation.input().is_empty());

        type_text(&mut app, "/upload");
        app.handle_action(Action::Submit);
        assert!(app.attach.is_some());
        app.handle_action(Action::Cancel);

        type_text(&mut app, "/quit");
        app.handle_action(Action::Submit);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_new_message_reattaches_follow() {
        let mut app = active_test_app();
        let backend = Arc::new(MockBackend::default());
        app.scroll_limit.set(40);
        app.page_height.set(10);

        type_text(&mut app, "hello");
        let dispatch = app.handle_action(Action::Submit);

        app.handle_action(Action::PageUp);
        assert_eq!(app.scroll_up, 10);
        assert!(!app.is_following());
        app.handle_action(Action::ScrollDown);
        assert_eq!(app.scroll_up, 9);

        complete(&mut app, &backend, dispatch).await;
        assert!(app.is_following());
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut app = active_test_app();
        app.scroll_limit.set(3);
        app.handle_action(Action::PageUp);
        assert_eq!(app.scroll_up, 3);
        app.handle_action(Action::PageDown);
        assert_eq!(app.scroll_up, 0);
    }

    #[test]
    fn test_notification_expires() {
        let mut app = active_test_app();
        type_text(&mut app, "/nope");
        app.handle_action(Action::Submit);
        for _ in 0..NOTIFICATION_TICKS {
            assert!(app.notification.is_some());
            app.tick();
        }
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = active_test_app();
        app.handle_action(Action::Attach);
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
