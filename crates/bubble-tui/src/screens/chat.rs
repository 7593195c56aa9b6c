//! Chat screen: transcript, composer and status bar.

use crate::app::App;
use crate::screens::Screen;
use crate::ui::chat_layout;
use crate::ui::theme::Styles;
use crate::ui::widgets::{transcript_lines, KeyHint, StatusBar, TextInput};
use bubble_engine::ConversationSnapshot;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// The chat screen.
pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        Block::default().style(Styles::default()).render(area, buf);

        let view = app.conversation.snapshot();
        let input_lines = composer(app, view.disabled).lines().len();
        let layout = chat_layout(area, input_lines);

        render_transcript(app, &view, layout.transcript, buf);
        render_input(app, view.disabled, layout.input, buf);
        render_status(app, view.disabled, layout.status, buf);
    }
}

fn composer(app: &App, disabled: bool) -> TextInput<'_> {
    let placeholder = if disabled {
        "Waiting for the reply..."
    } else {
        "Type a message, /help for commands"
    };
    TextInput::new(app.conversation.input())
        .focused(!disabled && app.attach.is_none() && app.gate.is_active())
        .placeholder(placeholder)
}

fn render_transcript(app: &App, view: &ConversationSnapshot, area: Rect, buf: &mut Buffer) {
    let mut block = Block::default()
        .title(" Conversation ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border())
        .style(Styles::default());
    if !app.is_following() {
        block = block.title_top(Line::from(" [scrolled] ").right_aligned());
    }

    let inner = block.inner(area);
    block.render(area, buf);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if view.messages.is_empty() {
        Paragraph::new(Line::from(Span::styled(
            "No messages yet. Enter sends, Shift+Enter starts a new line.",
            Styles::dim(),
        )))
        .render(inner, buf);
        return;
    }

    let lines = transcript_lines(&view.messages, inner.width, app.tick);
    let height = usize::from(inner.height);
    let max_scroll = lines.len().saturating_sub(height);
    app.scroll_limit.set(max_scroll);
    app.page_height.set(height);

    // Offset from the top; zero scroll_up pins the newest line to the bottom
    let top = max_scroll - app.scroll_up.min(max_scroll);
    Paragraph::new(lines)
        .style(Styles::default())
        .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0))
        .render(inner, buf);
}

fn render_input(app: &App, disabled: bool, area: Rect, buf: &mut Buffer) {
    let (title, border) = if disabled {
        (" Waiting for reply ", Styles::border())
    } else {
        (" Message ", Styles::border_active())
    };
    let block = Block::default()
        .title(title)
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(border)
        .style(Styles::default());

    composer(app, disabled).block(block).render(area, buf);
}

fn render_status(app: &App, disabled: bool, area: Rect, buf: &mut Buffer) {
    let (mode, hints) = if app.gate.overlay_visible() {
        (
            "Start",
            vec![KeyHint::new("Enter", "Start"), KeyHint::new("q", "Quit")],
        )
    } else if disabled {
        (
            "Waiting",
            vec![
                KeyHint::new("Ctrl+O", "Attach"),
                KeyHint::new("PgUp", "Scroll"),
                KeyHint::new("F1", "Help"),
            ],
        )
    } else {
        (
            "Chat",
            vec![
                KeyHint::new("Enter", "Send"),
                KeyHint::new("Shift+Enter", "Newline"),
                KeyHint::new("Ctrl+O", "Attach"),
                KeyHint::new("F1", "Help"),
            ],
        )
    };

    let uploads = app.conversation.uploads_in_flight();
    let right = match (&app.notification, uploads) {
        (Some(notification), _) => notification.clone(),
        (None, 0) => app.api_base_url.clone(),
        (None, 1) => "uploading 1 file".to_string(),
        (None, n) => format!("uploading {n} files"),
    };
    let right_style = if app.notification.is_some() {
        Styles::error()
    } else {
        Styles::dim()
    };

    StatusBar::new(mode)
        .hints(hints)
        .right(&right)
        .right_style(right_style)
        .render(area, buf);
}
