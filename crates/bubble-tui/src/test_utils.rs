//! Test utilities for bubble-tui rendering and interaction tests.

use crate::app::App;
use crate::event::Action;
use crate::screens::{render_app, Screen as ScreenTrait};
use bubble_engine::Config;
use ratatui::{buffer::Buffer, layout::Rect};

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test app with the default config, gate still closed.
pub fn create_test_app() -> App {
    App::new(&Config::default())
}

/// Create a test app whose session is already active.
pub fn active_test_app() -> App {
    let mut app = create_test_app();
    let ticket = app.gate.start().expect("gate should start");
    app.gate.settle_start(ticket, Ok(()));
    app
}

/// Type text into whatever has focus, one key at a time.
pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_action(Action::Insert(c));
    }
}

/// Convert a buffer to a string, one line per row, trailing spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        let mut skip = 0;
        for x in area.x..area.x + area.width {
            // Wide characters occupy two cells; the second holds no symbol
            if skip > 0 {
                skip -= 1;
                continue;
            }
            let symbol = buffer[(x, y)].symbol();
            skip = unicode_width::UnicodeWidthStr::width(symbol).saturating_sub(1);
            result.push_str(symbol);
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    let area = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

/// Render the full frame, overlays included, and return it as a string.
pub fn render_app_to_string(app: &App) -> String {
    let area = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);
    let mut buffer = Buffer::empty(area);
    render_app(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_test_app() {
        let app = active_test_app();
        assert!(app.gate.is_active());
        assert!(app.conversation.messages().is_empty());
    }

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", ratatui::style::Style::default());
        buffer.set_string(0, 1, "안녕", ratatui::style::Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\n안녕\n");
    }
}
