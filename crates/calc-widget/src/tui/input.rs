//! Keyboard input mapping for the terminal front-end

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Actions that can be triggered by keyboard input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Insert a character at the caret
    InsertChar(char),
    /// Delete the selection or the char before the caret
    Backspace,
    /// Move caret left; `true` extends the selection
    CursorLeft(bool),
    /// Move caret right; `true` extends the selection
    CursorRight(bool),
    /// Move caret to start; `true` extends the selection
    CursorHome(bool),
    /// Move caret to end; `true` extends the selection
    CursorEnd(bool),
    /// Select the whole field
    SelectAll,
    /// Empty field and displays
    Clear,
    /// A named key routed through the dispatch table (`"Enter"`)
    Key(String),
    /// Quit the application
    Quit,
    /// No action (ignored input)
    None,
}

/// Maps key events to actions
#[derive(Debug, Default, Clone, Copy)]
pub struct InputHandler;

impl InputHandler {
    /// Creates a new input handler
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Maps a key event to an action
    #[must_use]
    pub fn handle_key(&self, event: KeyEvent) -> KeyAction {
        let KeyEvent {
            code,
            modifiers,
            kind,
            ..
        } = event;

        if kind == KeyEventKind::Release {
            return KeyAction::None;
        }

        if modifiers.contains(KeyModifiers::CONTROL) {
            return match code {
                KeyCode::Char('c' | 'q') => KeyAction::Quit,
                KeyCode::Char('a') => KeyAction::SelectAll,
                KeyCode::Char('u') => KeyAction::Clear,
                _ => KeyAction::None,
            };
        }

        let extend = modifiers.contains(KeyModifiers::SHIFT);
        match code {
            KeyCode::Char(c) => KeyAction::InsertChar(c),
            KeyCode::Backspace => KeyAction::Backspace,
            KeyCode::Left => KeyAction::CursorLeft(extend),
            KeyCode::Right => KeyAction::CursorRight(extend),
            KeyCode::Home => KeyAction::CursorHome(extend),
            KeyCode::End => KeyAction::CursorEnd(extend),
            KeyCode::Enter => KeyAction::Key("Enter".to_string()),
            KeyCode::Esc => KeyAction::Clear,
            _ => KeyAction::None,
        }
    }
}
