//! Event dispatch table
//!
//! Maps the two listened-for events (a delegated click on the keypad and a
//! keydown on the field) to controller commands.

use tracing::debug;

use crate::keypad::KeypadAction;

/// A UI event reaching the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// Click inside the keypad container, resolved to the nearest button
    Click {
        /// The button's `data-action`
        action: Option<String>,
        /// The button's `data-insert`
        insert: Option<String>,
    },
    /// Keydown on the input field
    KeyDown {
        /// Key name as reported by the platform (`"Enter"`, `"a"`, ...)
        key: String,
    },
}

impl WidgetEvent {
    /// A click on a button with the given markers
    #[must_use]
    pub fn click(action: Option<&str>, insert: Option<&str>) -> Self {
        Self::Click {
            action: action.map(str::to_string),
            insert: insert.map(str::to_string),
        }
    }

    /// A click on a button performing `action`
    #[must_use]
    pub fn button(action: &KeypadAction) -> Self {
        Self::click(action.action_marker(), action.insert_marker())
    }

    /// A keydown
    #[must_use]
    pub fn key_down(key: &str) -> Self {
        Self::KeyDown {
            key: key.to_string(),
        }
    }
}

/// A controller operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty field and displays
    Clear,
    /// Delete backwards
    Backspace,
    /// Evaluate the field
    Evaluate,
    /// Splice text over the selection
    Insert(String),
}

impl From<KeypadAction> for Command {
    fn from(action: KeypadAction) -> Self {
        match action {
            KeypadAction::Clear => Self::Clear,
            KeypadAction::Back => Self::Backspace,
            KeypadAction::Equals => Self::Evaluate,
            KeypadAction::Insert(text) => Self::Insert(text),
        }
    }
}

/// Result of routing one event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dispatch {
    /// Command to run, if the event is actionable
    pub command: Option<Command>,
    /// Whether the platform's default handling must be suppressed
    pub prevent_default: bool,
}

/// Routes `event`; only `submit_key` produces a command from keydown
#[must_use]
pub fn dispatch(event: &WidgetEvent, submit_key: &str) -> Dispatch {
    let routed = match event {
        WidgetEvent::Click { action, insert } => Dispatch {
            command: KeypadAction::from_markers(action.as_deref(), insert.as_deref())
                .map(Command::from),
            prevent_default: false,
        },
        WidgetEvent::KeyDown { key } if key == submit_key => Dispatch {
            command: Some(Command::Evaluate),
            prevent_default: true,
        },
        WidgetEvent::KeyDown { .. } => Dispatch::default(),
    };
    debug!(?event, command = ?routed.command, "dispatch");
    routed
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTER: &str = "Enter";

    #[test]
    fn test_click_control_buttons() {
        let clear = dispatch(&WidgetEvent::click(Some("clear"), None), ENTER);
        assert_eq!(clear.command, Some(Command::Clear));
        assert!(!clear.prevent_default);

        let back = dispatch(&WidgetEvent::click(Some("back"), None), ENTER);
        assert_eq!(back.command, Some(Command::Backspace));

        let equals = dispatch(&WidgetEvent::click(Some("equals"), None), ENTER);
        assert_eq!(equals.command, Some(Command::Evaluate));
    }

    #[test]
    fn test_click_insert_button() {
        let d = dispatch(&WidgetEvent::click(None, Some("cos(")), ENTER);
        assert_eq!(d.command, Some(Command::Insert("cos(".into())));
    }

    #[test]
    fn test_click_outside_button_is_ignored() {
        let d = dispatch(&WidgetEvent::click(None, None), ENTER);
        assert_eq!(d, Dispatch::default());
    }

    #[test]
    fn test_click_empty_insert_is_ignored() {
        let d = dispatch(&WidgetEvent::click(None, Some("")), ENTER);
        assert_eq!(d.command, None);
    }

    #[test]
    fn test_button_event_from_action() {
        let event = WidgetEvent::button(&KeypadAction::insert("9"));
        assert_eq!(event, WidgetEvent::click(None, Some("9")));
        let event = WidgetEvent::button(&KeypadAction::Back);
        assert_eq!(event, WidgetEvent::click(Some("back"), None));
    }

    #[test]
    fn test_enter_evaluates_and_prevents_default() {
        let d = dispatch(&WidgetEvent::key_down("Enter"), ENTER);
        assert_eq!(d.command, Some(Command::Evaluate));
        assert!(d.prevent_default);
    }

    #[test]
    fn test_other_keys_keep_default_behaviour() {
        for key in ["a", "9", "Backspace", "Escape", "ArrowLeft", "enter"] {
            let d = dispatch(&WidgetEvent::key_down(key), ENTER);
            assert_eq!(d, Dispatch::default(), "{key}");
        }
    }

    #[test]
    fn test_custom_submit_key() {
        let d = dispatch(&WidgetEvent::key_down("="), "=");
        assert_eq!(d.command, Some(Command::Evaluate));
        assert_eq!(dispatch(&WidgetEvent::key_down("Enter"), "=").command, None);
    }
}
