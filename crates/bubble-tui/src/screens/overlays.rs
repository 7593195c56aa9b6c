//! Modal overlays drawn on top of the chat screen.

use crate::app::App;
use crate::commands::COMMANDS;
use crate::ui::centered_fixed;
use crate::ui::theme::{spinner, Styles};
use crate::ui::widgets::TextInput;
use bubble_engine::{InputBuffer, SessionState, UploadPolicy};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Render the start-session gate.
///
/// Blocks the whole chat until the session is active. The control reads
/// `[ Start chat ]` until pressed, then `Starting...` with a spinner.
pub fn render_gate_overlay(app: &App, area: Rect, buf: &mut Buffer) {
    let width = 44.min(area.width.saturating_sub(2));
    let height = 9.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let control = match app.gate.state() {
        SessionState::Starting => Line::from(vec![
            Span::styled(app.gate.control_label(), Styles::dim()),
            Span::styled(format!(" {}", spinner(app.tick)), Styles::active()),
        ]),
        SessionState::NotStarted | SessionState::Active => Line::from(Span::styled(
            format!("[ {} ]", app.gate.control_label()),
            Styles::highlight(),
        )),
    };

    let lines = vec![
        Line::default(),
        Line::from(Span::styled("Welcome to bubble", Styles::title())),
        Line::from(Span::styled(app.api_base_url.clone(), Styles::dim())),
        Line::default(),
        control,
        Line::default(),
        Line::from(Span::styled("Enter start   q quit", Styles::dim())),
    ];

    let block = Block::default()
        .title(" bubble ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .render(overlay_area, buf);
}

/// Render the file path prompt. The bottom border names the upload policy.
pub fn render_attach_overlay(
    prompt: &InputBuffer,
    policy: UploadPolicy,
    area: Rect,
    buf: &mut Buffer,
) {
    let width = 60.min(area.width.saturating_sub(4));
    let height = 4.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Attach a .txt file ")
        .title_style(Styles::title())
        .title_bottom(Line::from(format!(" {policy} uploads ")).left_aligned())
        .title_bottom(Line::from(" Enter upload  Esc cancel ").right_aligned())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    TextInput::new(prompt)
        .placeholder("path/to/file.txt")
        .block(block)
        .render(overlay_area, buf);
}

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled("  Keys", Styles::highlight())),
    ];
    let keys = [
        ("Enter", "Send message"),
        ("Shift+Enter", "New line"),
        ("Up/Down", "Input history"),
        ("PgUp/PgDn", "Scroll transcript"),
        ("Ctrl+O", "Attach a file"),
        ("F1", "Toggle this help"),
        ("Ctrl+C", "Quit"),
    ];
    for (key, description) in keys {
        lines.push(Line::from(format!("    {key:<16}{description}")));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("  Commands", Styles::highlight())));
    for info in COMMANDS {
        lines.push(Line::from(format!(
            "    {:<16}{}",
            info.usage, info.description
        )));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "  [Press any key to close]",
        Styles::dim(),
    )));

    let width = 50.min(area.width.saturating_sub(4));
    let height = u16::try_from(lines.len() + 2)
        .unwrap_or(u16::MAX)
        .min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    Paragraph::new(lines)
        .block(block)
        .style(Styles::default())
        .render(overlay_area, buf);
}
