//! Expression buffer and the two primitive edits
//!
//! Both edits are total: any selection is clamped to the buffer before use,
//! and the returned caret always lies on a char boundary.

use super::selection::Selection;

/// The editable expression text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionBuffer {
    text: String,
}

impl ExpressionBuffer {
    /// Creates an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding `text`
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    /// The buffer contents
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in chars
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns true if the buffer holds no text
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Caret at the end of the buffer
    #[must_use]
    pub fn end_caret(&self) -> Selection {
        Selection::caret(self.char_len())
    }

    /// The buffer with surrounding whitespace removed
    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Replaces the whole buffer
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    /// Empties the buffer
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Replaces `[start, end)` with `fragment` and returns the new caret.
    ///
    /// The caret lands at `start + fragment.chars().count()`.
    pub fn insert(&mut self, fragment: &str, selection: Selection) -> Selection {
        let sel = selection.clamped(self.char_len());
        let start = self.byte_offset(sel.start);
        let end = self.byte_offset(sel.end);
        self.text.replace_range(start..end, fragment);
        Selection::caret(sel.start + fragment.chars().count())
    }

    /// Deletes the selection, or the char before a caret, and returns the new caret.
    ///
    /// A caret at offset 0 leaves the buffer untouched.
    pub fn backspace(&mut self, selection: Selection) -> Selection {
        let sel = selection.clamped(self.char_len());
        if !sel.is_caret() {
            return self.insert("", sel);
        }
        if sel.start == 0 {
            return sel;
        }
        self.insert("", Selection::new(sel.start - 1, sel.start))
    }

    /// Returns the text covered by `selection`
    #[must_use]
    pub fn slice(&self, selection: Selection) -> &str {
        let sel = selection.clamped(self.char_len());
        &self.text[self.byte_offset(sel.start)..self.byte_offset(sel.end)]
    }

    /// Byte index of the char at `chars`, or the buffer length past the end
    fn byte_offset(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map_or(self.text.len(), |(byte, _)| byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Insert tests =====

    #[test]
    fn test_insert_into_empty() {
        let mut buf = ExpressionBuffer::new();
        let caret = buf.insert("7", Selection::caret(0));
        assert_eq!(buf.as_str(), "7");
        assert_eq!(caret, Selection::caret(1));
    }

    #[test]
    fn test_insert_at_caret_middle() {
        let mut buf = ExpressionBuffer::from_text("2+2");
        let caret = buf.insert("0", Selection::caret(1));
        assert_eq!(buf.as_str(), "20+2");
        assert_eq!(caret, Selection::caret(2));
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut buf = ExpressionBuffer::from_text("12*34");
        let caret = buf.insert("+", Selection::new(2, 3));
        assert_eq!(buf.as_str(), "12+34");
        assert_eq!(caret, Selection::caret(3));
    }

    #[test]
    fn test_insert_multichar_fragment() {
        let mut buf = ExpressionBuffer::from_text("2");
        let caret = buf.insert("sqrt(", Selection::caret(0));
        assert_eq!(buf.as_str(), "sqrt(2");
        assert_eq!(caret, Selection::caret(5));
    }

    #[test]
    fn test_insert_empty_deletes_selection() {
        let mut buf = ExpressionBuffer::from_text("abcdef");
        let caret = buf.insert("", Selection::new(1, 4));
        assert_eq!(buf.as_str(), "aef");
        assert_eq!(caret, Selection::caret(1));
    }

    #[test]
    fn test_insert_non_ascii_offsets() {
        let mut buf = ExpressionBuffer::from_text("2π");
        let caret = buf.insert("*", Selection::caret(1));
        assert_eq!(buf.as_str(), "2*π");
        assert_eq!(caret, Selection::caret(2));
        let caret = buf.insert("e", Selection::caret(3));
        assert_eq!(buf.as_str(), "2*πe");
        assert_eq!(caret, Selection::caret(4));
    }

    #[test]
    fn test_insert_clamps_out_of_range_selection() {
        let mut buf = ExpressionBuffer::from_text("12");
        let caret = buf.insert("3", Selection::new(5, 9));
        assert_eq!(buf.as_str(), "123");
        assert_eq!(caret, Selection::caret(3));
    }

    // ===== Backspace tests =====

    #[test]
    fn test_backspace_removes_char_before_caret() {
        let mut buf = ExpressionBuffer::from_text("123");
        let caret = buf.backspace(Selection::caret(2));
        assert_eq!(buf.as_str(), "13");
        assert_eq!(caret, Selection::caret(1));
    }

    #[test]
    fn test_backspace_at_end() {
        let mut buf = ExpressionBuffer::from_text("123");
        let caret = buf.backspace(buf.end_caret());
        assert_eq!(buf.as_str(), "12");
        assert_eq!(caret, Selection::caret(2));
    }

    #[test]
    fn test_backspace_at_origin_is_noop() {
        let mut buf = ExpressionBuffer::from_text("123");
        let caret = buf.backspace(Selection::caret(0));
        assert_eq!(buf.as_str(), "123");
        assert_eq!(caret, Selection::caret(0));
        let caret = buf.backspace(caret);
        assert_eq!(buf.as_str(), "123");
        assert_eq!(caret, Selection::caret(0));
    }

    #[test]
    fn test_backspace_on_empty_buffer() {
        let mut buf = ExpressionBuffer::new();
        let caret = buf.backspace(buf.end_caret());
        assert!(buf.is_empty());
        assert_eq!(caret, Selection::caret(0));
    }

    #[test]
    fn test_backspace_deletes_selection_only() {
        let mut buf = ExpressionBuffer::from_text("10+20");
        let caret = buf.backspace(Selection::new(2, 5));
        assert_eq!(buf.as_str(), "10");
        assert_eq!(caret, Selection::caret(2));
    }

    #[test]
    fn test_backspace_removes_whole_scalar_value() {
        let mut buf = ExpressionBuffer::from_text("1\u{1D70B}");
        let caret = buf.backspace(Selection::caret(2));
        assert_eq!(buf.as_str(), "1");
        assert_eq!(caret, Selection::caret(1));
    }

    // ===== Accessor tests =====

    #[test]
    fn test_trimmed() {
        let buf = ExpressionBuffer::from_text("  5*5  ");
        assert_eq!(buf.trimmed(), "5*5");
    }

    #[test]
    fn test_slice() {
        let buf = ExpressionBuffer::from_text("sin(pi)");
        assert_eq!(buf.slice(Selection::new(4, 6)), "pi");
        assert_eq!(buf.slice(Selection::new(4, 60)), "pi)");
    }

    #[test]
    fn test_set_text_and_clear() {
        let mut buf = ExpressionBuffer::new();
        buf.set_text("1+1");
        assert_eq!(buf.char_len(), 3);
        buf.clear();
        assert!(buf.is_empty());
    }
}
