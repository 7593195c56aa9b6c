//! Composing-input buffer.
//!
//! The buffer holds the text being typed, a cursor, and a history of
//! submitted messages for Up/Down recall. The cursor counts characters, not
//! bytes, so multi-byte input (Hangul, emoji) edits correctly.

/// Text being composed plus cursor and recall history.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    content: String,
    /// Cursor position (character index).
    cursor: usize,
    /// Submitted entries, oldest first.
    history: Vec<String>,
    /// Position while browsing history (`None` = editing current input).
    history_index: Option<usize>,
    /// Current input saved while browsing history.
    saved_input: String,
}

impl InputBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether the content is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Take the content, clearing the buffer.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_offset(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Insert a literal line break.
    pub fn newline(&mut self) {
        self.insert('\n');
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Take the content and record it in history.
    pub fn submit(&mut self) -> String {
        let content = self.take();
        if !content.trim().is_empty() {
            self.history.push(content.clone());
        }
        self.history_index = None;
        self.saved_input.clear();
        content
    }

    /// Recall the previous (older) history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let next = match self.history_index {
            None => {
                self.saved_input = self.content.clone();
                0
            }
            Some(i) if i + 1 < self.history.len() => i + 1,
            Some(_) => return,
        };
        self.history_index = Some(next);
        self.content = self.history[self.history.len() - 1 - next].clone();
        self.move_end();
    }

    /// Recall the next (newer) history entry, or restore the saved input.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.content = std::mem::take(&mut self.saved_input);
                self.history_index = None;
                self.move_end();
            }
            Some(i) => {
                self.history_index = Some(i - 1);
                self.content = self.history[self.history.len() - i].clone();
                self.move_end();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_editing() {
        let mut input = InputBuffer::new();
        assert!(input.is_empty());

        input.insert('H');
        input.insert('i');
        assert_eq!(input.content(), "Hi");
        assert_eq!(input.cursor(), 2);

        input.backspace();
        assert_eq!(input.content(), "H");

        input.clear();
        assert!(input.is_empty());
    }

    #[test]
    fn test_cursor_movement() {
        let mut input = InputBuffer::new();
        input.insert_str("Hello");

        input.move_left();
        input.move_left();
        assert_eq!(input.cursor(), 3);

        input.insert('X');
        assert_eq!(input.content(), "HelXlo");

        input.move_home();
        assert_eq!(input.cursor(), 0);
        input.delete();
        assert_eq!(input.content(), "elXlo");

        input.move_end();
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = InputBuffer::new();
        input.insert_str("안녕");
        input.move_left();
        input.insert('!');
        assert_eq!(input.content(), "안!녕");

        input.move_end();
        input.backspace();
        assert_eq!(input.content(), "안!");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_newline_and_blank() {
        let mut input = InputBuffer::new();
        input.insert_str("  ");
        assert!(input.is_blank());
        input.newline();
        assert!(input.is_blank());
        input.insert('a');
        assert!(!input.is_blank());
        assert_eq!(input.content(), "  \na");
    }

    #[test]
    fn test_history() {
        let mut input = InputBuffer::new();

        input.insert_str("first");
        input.submit();
        assert!(input.is_empty());

        input.insert_str("second");
        input.submit();

        input.insert_str("draft");
        input.history_prev();
        assert_eq!(input.content(), "second");

        input.history_prev();
        assert_eq!(input.content(), "first");

        // Stays on oldest entry
        input.history_prev();
        assert_eq!(input.content(), "first");

        input.history_next();
        assert_eq!(input.content(), "second");

        input.history_next();
        assert_eq!(input.content(), "draft");
    }

    #[test]
    fn test_blank_submissions_not_recorded() {
        let mut input = InputBuffer::new();
        input.insert_str("   ");
        input.submit();
        input.history_prev();
        assert!(input.is_empty());
    }
}
