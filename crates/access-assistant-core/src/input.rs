//! Multi-line chat input field with an auto-growing height.

/// Layout units per text row.
pub const ROW_UNITS: u16 = 20;
/// The input never grows taller than this many units.
pub const MAX_INPUT_HEIGHT: u16 = 120;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone)]
pub struct ChatInput {
    text: String,
    cursor: usize, // cursor position in chars
    height: u16,
    wrap_width: u16,
    disabled: bool,
    focused: bool,
}

impl Default for ChatInput {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatInput {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            height: ROW_UNITS,
            wrap_width: 0,
            disabled: false,
            focused: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Current height in layout units.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Current height in text rows.
    pub fn rows(&self) -> u16 {
        (self.height / ROW_UNITS).max(1)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Width available for text. Changing it re-measures the content.
    pub fn set_wrap_width(&mut self, width: u16) {
        if self.wrap_width != width {
            self.wrap_width = width;
            self.recalc_height();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if self.disabled {
            return;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
        self.recalc_height();
    }

    pub fn insert_str(&mut self, s: &str) {
        if self.disabled {
            return;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert_str(byte_pos, s);
        self.cursor += s.chars().count();
        self.recalc_height();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.disabled || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_pos);
        self.recalc_height();
    }

    pub fn delete(&mut self) {
        if self.disabled {
            return;
        }
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
            self.recalc_height();
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Take the text out of the field, leaving it empty at its minimum height.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.height = ROW_UNITS;
        std::mem::take(&mut self.text)
    }

    /// Number of rows the content occupies at the current wrap width.
    pub fn content_rows(&self) -> u16 {
        wrapped_rows(&self.text, self.wrap_width)
    }

    /// Row and column of the cursor at the current wrap width.
    pub fn cursor_position(&self) -> (u16, u16) {
        let before: String = self.text.chars().take(self.cursor).collect();
        let width = self.wrap_width as usize;
        let mut row = 0usize;
        let mut col = 0usize;
        for (i, line) in before.split('\n').enumerate() {
            if i > 0 {
                row += 1;
            }
            let chars = line.chars().count();
            if width > 0 {
                row += chars / width;
                col = chars % width;
            } else {
                col = chars;
            }
        }
        (row as u16, col as u16)
    }

    fn recalc_height(&mut self) {
        let content = self.content_rows().saturating_mul(ROW_UNITS);
        self.height = content.clamp(ROW_UNITS, MAX_INPUT_HEIGHT);
    }
}

/// Rows needed to show `text` wrapped at `width` columns. A width of zero
/// means "unknown", and only hard line breaks count.
///
/// A line that exactly fills its last row gets one more, empty row: that is
/// where the cursor sits after the final character.
pub fn wrapped_rows(text: &str, width: u16) -> u16 {
    let width = width as usize;
    let rows: usize = text
        .split('\n')
        .map(|line| {
            if width == 0 {
                1
            } else {
                line.chars().count() / width + 1
            }
        })
        .sum();
    rows.min(u16::MAX as usize) as u16
}
