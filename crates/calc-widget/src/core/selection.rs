//! Caret and selection ranges over the expression buffer
//!
//! Offsets are counted in Unicode scalar values. Browsers report
//! `selectionStart`/`selectionEnd` in UTF-16 code units, so the conversion
//! helpers at the bottom of this module translate between the two.

/// A caret (`start == end`) or a highlighted span (`start < end`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Selection {
    /// Creates a selection from two offsets in any order
    #[must_use]
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Creates a collapsed selection (a caret)
    #[must_use]
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns true if this is a caret rather than a span
    #[must_use]
    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Number of characters covered
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if no characters are covered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_caret()
    }

    /// Clamps both ends into `[0, len]`
    #[must_use]
    pub fn clamped(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

/// Converts a UTF-16 code unit offset into a char offset.
///
/// An offset that lands inside a surrogate pair resolves to the next char
/// boundary; offsets past the end resolve to the char length.
#[must_use]
pub fn char_offset_from_utf16(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (index, ch) in text.chars().enumerate() {
        if units >= utf16 {
            return index;
        }
        units += ch.len_utf16();
    }
    text.chars().count()
}

/// Converts a char offset into a UTF-16 code unit offset
#[must_use]
pub fn utf16_offset_from_char(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}
