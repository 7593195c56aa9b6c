//! Multi-line composer widget.

use crate::ui::theme::Styles;
use bubble_engine::InputBuffer;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

/// Renders an [`InputBuffer`] with a block cursor.
///
/// Continuation lines are indented to line up with the first line's text.
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    buffer: &'a InputBuffer,
    block: Option<Block<'a>>,
    focused: bool,
    placeholder: Option<&'a str>,
    prompt: &'a str,
}

impl<'a> TextInput<'a> {
    /// Create a widget for a buffer.
    pub fn new(buffer: &'a InputBuffer) -> Self {
        Self {
            buffer,
            block: None,
            focused: true,
            placeholder: None,
            prompt: "> ",
        }
    }

    /// Set the block for the text input.
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Set focus state. Unfocused inputs draw no cursor.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Build the display lines.
    pub fn lines(&self) -> Vec<Line<'static>> {
        let cursor_style = Styles::active().add_modifier(Modifier::REVERSED);
        let indent = " ".repeat(self.prompt.len());

        if self.buffer.is_empty() {
            let mut spans = vec![Span::styled(self.prompt.to_string(), Styles::active())];
            if self.focused {
                spans.push(Span::styled(" ", cursor_style));
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder.to_string(), Styles::dim()));
            }
            return vec![Line::from(spans)];
        }

        let cursor = self.focused.then_some(self.buffer.cursor());
        let mut lines = Vec::new();
        let mut spans = vec![Span::styled(self.prompt.to_string(), Styles::active())];
        let mut run = String::new();

        let flush = |run: &mut String, spans: &mut Vec<Span<'static>>| {
            if !run.is_empty() {
                spans.push(Span::styled(std::mem::take(run), Styles::default()));
            }
        };

        for (i, ch) in self.buffer.content().chars().enumerate() {
            let at_cursor = cursor == Some(i);
            if ch == '\n' {
                flush(&mut run, &mut spans);
                if at_cursor {
                    spans.push(Span::styled(" ", cursor_style));
                }
                lines.push(Line::from(std::mem::take(&mut spans)));
                spans.push(Span::styled(indent.clone(), Styles::default()));
            } else if at_cursor {
                flush(&mut run, &mut spans);
                spans.push(Span::styled(ch.to_string(), cursor_style));
            } else {
                run.push(ch);
            }
        }
        flush(&mut run, &mut spans);
        if cursor == Some(self.buffer.content().chars().count()) {
            spans.push(Span::styled(" ", cursor_style));
        }
        lines.push(Line::from(spans));
        lines
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.height < 1 || inner.width < 1 {
            return;
        }

        // Keep the cursor line visible once content outgrows the area
        let lines = self.lines();
        let overflow = lines.len().saturating_sub(usize::from(inner.height));
        let visible: Vec<Line<'static>> = lines.into_iter().skip(overflow).collect();
        Paragraph::new(visible)
            .style(Styles::default())
            .render(inner, buf);
    }
}
