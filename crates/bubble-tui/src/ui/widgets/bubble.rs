//! Message bubbles.
//!
//! Turns the conversation log into styled lines: an author label, then the
//! wrapped text inside a padded bubble. User bubbles hug the right edge, bot
//! bubbles the left. A pending bot reply renders as a typing indicator.

use crate::ui::theme::{typing, Styles};
use bubble_engine::Message;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Widest a bubble may get, as a share of the transcript width.
pub const BUBBLE_WIDTH_PERCENT: usize = 70;

const USER_LABEL: &str = "You";
const BOT_LABEL: &str = "Bot";

/// Lay out every message for a transcript `width` columns wide.
pub fn transcript_lines(messages: &[Message], width: u16, tick: usize) -> Vec<Line<'static>> {
    let width = usize::from(width);
    let max_inner = (width * BUBBLE_WIDTH_PERCENT / 100).saturating_sub(2).max(1);
    let mut lines = Vec::new();

    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }

        let (label, style) = if message.is_user {
            (USER_LABEL, Styles::user_bubble())
        } else {
            (BOT_LABEL, Styles::bot_bubble())
        };
        lines.push(aligned(
            Span::styled(label, Styles::author()),
            label.width(),
            width,
            message.is_user,
        ));

        let rows = if message.is_pending {
            vec![typing(tick).to_string()]
        } else {
            wrap(&message.text, max_inner)
        };
        let inner = rows.iter().map(|r| r.width()).max().unwrap_or(0);
        for row in rows {
            let fill = " ".repeat(inner.saturating_sub(row.width()));
            lines.push(aligned(
                Span::styled(format!(" {row}{fill} "), style),
                inner + 2,
                width,
                message.is_user,
            ));
        }
    }

    lines
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

fn aligned(span: Span<'static>, used: usize, width: usize, right: bool) -> Line<'static> {
    let pad = width.saturating_sub(used);
    if right && pad > 0 {
        Line::from(vec![Span::styled(" ".repeat(pad), Styles::default()), span])
    } else {
        Line::from(span)
    }
}
