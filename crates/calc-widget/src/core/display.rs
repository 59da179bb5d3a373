//! Result and error display slots

/// The two output slots of the widget.
///
/// They are set independently; callers decide when setting one should
/// clear the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Displays {
    result: Option<String>,
    error: Option<String>,
}

impl Displays {
    /// Creates empty displays
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Result text, empty when cleared
    #[must_use]
    pub fn result_text(&self) -> &str {
        self.result.as_deref().unwrap_or_default()
    }

    /// Error text, empty when cleared
    #[must_use]
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }

    /// The raw result slot
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// The raw error slot
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns true if an error message is showing
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.error_text().is_empty()
    }

    /// Sets the result slot
    pub fn set_result(&mut self, text: impl Into<String>) {
        self.result = Some(text.into());
    }

    /// Sets the error slot
    pub fn set_error(&mut self, text: impl Into<String>) {
        self.error = Some(text.into());
    }

    /// Clears the result slot
    pub fn clear_result(&mut self) {
        self.result = None;
    }

    /// Clears the error slot
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Clears both slots
    pub fn clear(&mut self) {
        self.result = None;
        self.error = None;
    }
}
