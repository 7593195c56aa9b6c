//! Layout helpers for the bubble TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Lines of text the composer shows before it stops growing.
pub const MAX_INPUT_LINES: u16 = 6;

/// Areas of the chat screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    /// Scrolling transcript.
    pub transcript: Rect,
    /// Composer (including its border).
    pub input: Rect,
    /// One-line status bar.
    pub status: Rect,
}

/// Split the screen into transcript, composer and status bar.
///
/// The composer grows with its content, like an auto-sizing textarea, up to
/// [`MAX_INPUT_LINES`].
pub fn chat_layout(area: Rect, input_lines: usize) -> ChatLayout {
    let lines = u16::try_from(input_lines)
        .unwrap_or(MAX_INPUT_LINES)
        .clamp(1, MAX_INPUT_LINES);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(lines + 2), // borders
            Constraint::Length(1),
        ])
        .split(area);
    ChatLayout {
        transcript: chunks[0],
        input: chunks[1],
        status: chunks[2],
    }
}

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
