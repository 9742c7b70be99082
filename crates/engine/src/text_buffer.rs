//! UTF-8 safe edit buffer backing text-like form fields.
//!
//! The buffer is the source of truth for a text field's value until the form
//! converts it into the field's semantic type after each edit.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextBuffer {
    /// The underlying text.
    text: String,
    /// Cursor byte index into `text` (always on a UTF-8 boundary).
    cursor: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding `text` with the cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when the buffer is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Replaces the whole content and parks the cursor at the end.
    pub fn replace(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    /// Moves the cursor, snapping back to the nearest preceding char boundary.
    pub fn set_cursor(&mut self, cursor: usize) {
        let mut bounded = cursor.min(self.text.len());
        while !self.text.is_char_boundary(bounded) {
            bounded -= 1;
        }
        self.cursor = bounded;
    }

    pub fn move_left(&mut self) {
        if let Some(previous) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= previous.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.text[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Removes the char before the cursor. Returns false at the start of the buffer.
    pub fn backspace(&mut self) -> bool {
        let Some(previous) = self.text[..self.cursor].chars().next_back() else {
            return false;
        };
        let start = self.cursor - previous.len_utf8();
        self.text.drain(start..self.cursor);
        self.cursor = start;
        true
    }

    /// Removes the char under the cursor. Returns false at the end of the buffer.
    pub fn delete(&mut self) -> bool {
        let Some(next) = self.text[self.cursor..].chars().next() else {
            return false;
        };
        let end = self.cursor + next.len_utf8();
        self.text.drain(self.cursor..end);
        true
    }

    /// Drops the content and its allocation.
    pub fn release(&mut self) {
        self.text = String::new();
        self.cursor = 0;
    }
}
