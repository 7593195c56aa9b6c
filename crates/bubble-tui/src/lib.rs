//! bubble-tui: Terminal UI for the bubble chat client
//!
//! This crate provides the TUI layer for bubble, including:
//! - The start-session gate overlay
//! - The chat screen (message bubbles, auto-growing composer, status bar)
//! - Slash commands and the file attach prompt

mod app;
pub mod commands;
mod event;
mod screens;
mod tasks;
#[cfg(test)]
pub mod test_utils;
mod ui;

pub use app::App;
pub use bubble_engine;
pub use event::{Action, Event, EventHandler};
pub use tasks::{Completion, Dispatch};

use bubble_engine::{ChatBackend, Config};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        KeyboardEnhancementFlags, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// RAII guard for terminal state restoration.
struct TerminalGuard {
    /// Whether keyboard enhancement flags were pushed and must be popped.
    keyboard_enhanced: bool,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = stdout();
        if self.keyboard_enhanced {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout,
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop against `backend`, and restores
/// the terminal on exit.
pub async fn run_tui(
    config: Config,
    backend: Arc<dyn ChatBackend>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    // Without disambiguated escape codes most terminals report Shift+Enter as Enter
    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false);
    let _guard = TerminalGuard { keyboard_enhanced };

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    if keyboard_enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(&config);
    info!(api_base_url = %config.api_base_url, keyboard_enhanced, "tui started");

    // 4 Hz tick rate drives spinners and notification expiry
    let mut events = EventHandler::new(250);

    let start_delay = config.start_delay();
    let result = run_loop(&mut terminal, &mut app, &mut events, &backend, start_delay).await;

    terminal.show_cursor()?;
    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    backend: &Arc<dyn ChatBackend>,
    start_delay: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut handles: Vec<JoinHandle<Completion>> = Vec::new();

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            screens::render_app(app, area, frame.buffer_mut());
        })?;

        if let Some(event) = events.next().await {
            let action = match event {
                Event::Key(key) if key.kind == crossterm::event::KeyEventKind::Press => {
                    event::key_to_action(key)
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => Action::ScrollUp,
                    MouseEventKind::ScrollDown => Action::ScrollDown,
                    _ => Action::None,
                },
                Event::Tick => {
                    app.tick();
                    Action::None
                }
                Event::Paste(text) => {
                    app.paste(&text);
                    Action::None
                }
                Event::Key(_) | Event::Resize(_, _) => Action::None,
            };
            if action != Action::None {
                if let Some(dispatch) = app.handle_action(action) {
                    handles.push(tasks::spawn_dispatch(backend.clone(), dispatch, start_delay));
                }
            }
        }

        // Apply finished requests (non-blocking)
        let mut completed = Vec::new();
        for (i, handle) in handles.iter().enumerate() {
            if handle.is_finished() {
                completed.push(i);
            }
        }
        for i in completed.into_iter().rev() {
            match handles.remove(i).await {
                Ok(completion) => app.apply(completion),
                Err(e) => warn!(error = %e, "request task failed"),
            }
        }

        if app.should_quit {
            for handle in handles {
                handle.abort();
            }
            break;
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{active_test_app, render_app_to_string, type_text};
    use bubble_engine::testing::MockBackend;

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
    }

    #[tokio::test]
    async fn test_spawned_dispatch_completes() {
        let backend: Arc<dyn ChatBackend> = Arc::new(MockBackend::replying("pong"));
        let mut app = active_test_app();
        type_text(&mut app, "ping");
        let dispatch = app.handle_action(Action::Submit).expect("chat dispatch");

        let completion = tasks::spawn_dispatch(backend, dispatch, Duration::ZERO)
            .await
            .expect("task should not panic");
        app.apply(completion);

        let screen = render_app_to_string(&app);
        assert!(screen.contains("ping"));
        assert!(screen.contains("pong"));
        assert!(!app.conversation.is_disabled());
    }
}
