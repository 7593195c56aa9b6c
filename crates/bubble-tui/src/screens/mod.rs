//! Screen definitions for the bubble TUI.

pub mod chat;
pub mod overlays;

use crate::app::App;
use ratatui::{buffer::Buffer, layout::Rect};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Render the whole frame: the chat screen plus whichever overlay is open.
pub fn render_app(app: &App, area: Rect, buf: &mut Buffer) {
    chat::ChatScreen.render(app, area, buf);

    if app.gate.overlay_visible() {
        overlays::render_gate_overlay(app, area, buf);
    } else if let Some(prompt) = &app.attach {
        overlays::render_attach_overlay(prompt, app.conversation.upload_policy(), area, buf);
    }

    if app.show_help {
        overlays::render_help_overlay(area, buf);
    }
}
