//! Unified Widget Driver
//!
//! **Write the interaction once, run it on every front-end.** The mock-DOM
//! driver and the terminal driver both implement [`WidgetDriver`]; the
//! `verify_*` scenarios below hold the widget's observable contract.
//!
//! Drivers answer evaluations from a script (see [`ScriptedReply`]) and
//! resolve each one before the triggering call returns.
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_dom() {
//!     let mut driver = DomDriver::new();
//!     verify_successful_evaluation(&mut driver).await;
//! }
//! ```

use async_trait::async_trait;

use crate::core::Selection;
use crate::keypad::KeypadAction;
use crate::service::ScriptedReply;

/// Abstract driver for widget interactions
#[async_trait(?Send)]
pub trait WidgetDriver {
    /// Types text into the field the way the platform natively does
    async fn type_text(&mut self, text: &str);

    /// Moves the field selection
    async fn set_selection(&mut self, selection: Selection);

    /// Clicks the keypad button performing `action`
    async fn click_button(&mut self, action: &KeypadAction);

    /// Presses a named key (`"Enter"`) in the field
    async fn press_key(&mut self, key: &str);

    /// Queues the service's reply to the next request
    fn script(&mut self, reply: ScriptedReply);

    /// Expressions sent to the service so far
    fn sent_expressions(&self) -> Vec<String>;

    /// Field text
    fn input_text(&self) -> String;

    /// Field selection
    fn selection(&self) -> Option<Selection>;

    /// Result display text
    fn result_text(&self) -> String;

    /// Error display text
    fn error_text(&self) -> String;
}

/// Terminal driver implementation
#[cfg(feature = "tui")]
pub mod terminal_driver {
    use std::sync::Arc;

    use async_trait::async_trait;
    use crossterm::event::{
        Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use ratatui::layout::Rect;

    use super::WidgetDriver;
    use crate::config::WidgetConfig;
    use crate::core::Selection;
    use crate::keypad::KeypadAction;
    use crate::service::{ScriptedEvaluator, ScriptedReply};
    use crate::tui::{button_center, TerminalApp};

    /// Drives a [`TerminalApp`] with synthetic key and mouse events.
    ///
    /// Keypad buttons are clicked at their rendered position, and
    /// evaluations go through the app's task channel. Needs a tokio runtime.
    #[derive(Debug)]
    pub struct TerminalDriver {
        app: TerminalApp,
        evaluator: Arc<ScriptedEvaluator>,
    }

    impl Default for TerminalDriver {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TerminalDriver {
        /// Terminal size the driver pretends to render at
        pub const VIEWPORT: Rect = Rect {
            x: 0,
            y: 0,
            width: 100,
            height: 30,
        };

        /// Creates a driver with default configuration
        #[must_use]
        pub fn new() -> Self {
            Self::with_config(&WidgetConfig::default())
        }

        /// Creates a driver with `config`
        #[must_use]
        pub fn with_config(config: &WidgetConfig) -> Self {
            let evaluator = Arc::new(ScriptedEvaluator::new());
            let mut app = TerminalApp::new(config, evaluator.clone());
            app.set_viewport(Self::VIEWPORT);
            Self { app, evaluator }
        }

        /// Returns the underlying app
        #[must_use]
        pub fn app(&self) -> &TerminalApp {
            &self.app
        }

        async fn send(&mut self, event: Event) {
            let before = self.app.in_flight();
            self.app.handle_event(&event);
            while self.app.in_flight() > before {
                if self.app.next_outcome().await.is_none() {
                    break;
                }
            }
        }

        fn key(code: KeyCode) -> Event {
            Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
        }
    }

    #[async_trait(?Send)]
    impl WidgetDriver for TerminalDriver {
        async fn type_text(&mut self, text: &str) {
            for c in text.chars() {
                self.send(Self::key(KeyCode::Char(c))).await;
            }
        }

        async fn set_selection(&mut self, selection: Selection) {
            self.app.set_selection(selection);
        }

        async fn click_button(&mut self, action: &KeypadAction) {
            let keypad = self.app.keypad();
            let Some(position) = keypad
                .find_button(action)
                .and_then(|def| button_center(keypad, self.app.keypad_area(), def))
            else {
                return;
            };
            let (column, row) = position;
            self.send(Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            }))
            .await;
        }

        async fn press_key(&mut self, key: &str) {
            let code = match key {
                "Enter" => KeyCode::Enter,
                "Escape" => KeyCode::Esc,
                "Backspace" => KeyCode::Backspace,
                other => match other.chars().next() {
                    Some(c) if other.chars().count() == 1 => KeyCode::Char(c),
                    _ => return,
                },
            };
            self.send(Self::key(code)).await;
        }

        fn script(&mut self, reply: ScriptedReply) {
            self.evaluator.push(reply);
        }

        fn sent_expressions(&self) -> Vec<String> {
            self.evaluator
                .requests()
                .into_iter()
                .map(|r| r.expression)
                .collect()
        }

        fn input_text(&self) -> String {
            self.app.surface().value.clone()
        }

        fn selection(&self) -> Option<Selection> {
            self.app.surface().selection
        }

        fn result_text(&self) -> String {
            self.app.surface().result.clone()
        }

        fn error_text(&self) -> String {
            self.app.surface().error.clone()
        }
    }
}

#[cfg(feature = "tui")]
pub use terminal_driver::TerminalDriver;

// ===== Unified Scenarios =====
// These work with ANY WidgetDriver implementation

/// Keypad inserts land at the caret, which ends up after the insert
pub async fn verify_insert_at_caret<D: WidgetDriver>(driver: &mut D) {
    driver.type_text("12").await;
    driver.set_selection(Selection::caret(1)).await;
    driver.click_button(&KeypadAction::insert("+")).await;
    assert_eq!(driver.input_text(), "1+2");
    assert_eq!(driver.selection(), Some(Selection::caret(2)));

    driver.click_button(&KeypadAction::insert("sqrt(")).await;
    assert_eq!(driver.input_text(), "1+sqrt(2");
    assert_eq!(driver.selection(), Some(Selection::caret(7)));
}

/// Keypad inserts replace a selection
pub async fn verify_insert_replaces_selection<D: WidgetDriver>(driver: &mut D) {
    driver.type_text("1-2").await;
    driver.set_selection(Selection::new(1, 2)).await;
    driver.click_button(&KeypadAction::insert("*")).await;
    assert_eq!(driver.input_text(), "1*2");
    assert_eq!(driver.selection(), Some(Selection::caret(2)));
}

/// Backspace deletes backwards, removes selections, and stops at zero
pub async fn verify_backspace<D: WidgetDriver>(driver: &mut D) {
    driver.type_text("123").await;
    driver.click_button(&KeypadAction::Back).await;
    assert_eq!(driver.input_text(), "12");
    assert_eq!(driver.selection(), Some(Selection::caret(2)));

    driver.set_selection(Selection::new(0, 1)).await;
    driver.click_button(&KeypadAction::Back).await;
    assert_eq!(driver.input_text(), "2");
    assert_eq!(driver.selection(), Some(Selection::caret(0)));

    driver.click_button(&KeypadAction::Back).await;
    assert_eq!(driver.input_text(), "2");
    assert_eq!(driver.selection(), Some(Selection::caret(0)));
}

/// Clear empties the field and both displays
pub async fn verify_clear<D: WidgetDriver>(driver: &mut D) {
    driver.script(ScriptedReply::value(4));
    driver.type_text("2+2").await;
    driver.press_key("Enter").await;
    assert_eq!(driver.result_text(), "4");

    driver.click_button(&KeypadAction::Clear).await;
    assert_eq!(driver.input_text(), "");
    assert_eq!(driver.selection(), Some(Selection::caret(0)));
    assert_eq!(driver.result_text(), "");
    assert_eq!(driver.error_text(), "");
}

/// "2+2" evaluates to 4
pub async fn verify_successful_evaluation<D: WidgetDriver>(driver: &mut D) {
    driver.script(ScriptedReply::value(4));
    driver.type_text("2+2").await;
    driver.click_button(&KeypadAction::Equals).await;
    assert_eq!(driver.result_text(), "4");
    assert_eq!(driver.error_text(), "");
    assert_eq!(driver.input_text(), "2+2");
}

/// A service error is shown and the result is cleared
pub async fn verify_failed_evaluation<D: WidgetDriver>(driver: &mut D) {
    driver.script(ScriptedReply::value(2));
    driver.type_text("1+1").await;
    driver.press_key("Enter").await;
    assert_eq!(driver.result_text(), "2");

    driver.script(ScriptedReply::error(400, "Unexpected end of expression"));
    driver.click_button(&KeypadAction::Back).await;
    driver.press_key("Enter").await;
    assert_eq!(driver.error_text(), "Unexpected end of expression");
    assert_eq!(driver.result_text(), "");
}

/// A failure without a message shows the fallback text
pub async fn verify_fallback_error<D: WidgetDriver>(driver: &mut D) {
    driver.script(ScriptedReply::raw(500, "Internal Server Error"));
    driver.type_text("1/0").await;
    driver.press_key("Enter").await;
    assert_eq!(driver.error_text(), "Evaluation failed");
    assert_eq!(driver.result_text(), "");
}

/// A transport failure shows its own message
pub async fn verify_transport_failure<D: WidgetDriver>(driver: &mut D) {
    driver.script(ScriptedReply::transport("Failed to fetch"));
    driver.type_text("7").await;
    driver.press_key("Enter").await;
    assert_eq!(driver.error_text(), "Failed to fetch");
}

/// The request carries the trimmed expression; the field keeps its spaces
pub async fn verify_trimmed_request<D: WidgetDriver>(driver: &mut D) {
    driver.script(ScriptedReply::value(25));
    driver.type_text("  5*5  ").await;
    driver.press_key("Enter").await;
    assert_eq!(driver.sent_expressions().last().map(String::as_str), Some("5*5"));
    assert_eq!(driver.result_text(), "25");
    assert_eq!(driver.input_text(), "  5*5  ");
}

/// Evaluating a blank field sends nothing and changes nothing
pub async fn verify_blank_evaluation<D: WidgetDriver>(driver: &mut D) {
    driver.script(ScriptedReply::error(400, "Unexpected end of expression"));
    driver.type_text("2+").await;
    driver.press_key("Enter").await;
    let sent = driver.sent_expressions().len();

    driver.click_button(&KeypadAction::Clear).await;
    driver.type_text("   ").await;
    driver.press_key("Enter").await;
    driver.click_button(&KeypadAction::Equals).await;
    assert_eq!(driver.sent_expressions().len(), sent);
    assert_eq!(driver.result_text(), "");
    assert_eq!(driver.error_text(), "");
    assert_eq!(driver.input_text(), "   ");
}

/// Pressing a keypad insert after an error clears the error at once
pub async fn verify_insert_clears_error<D: WidgetDriver>(driver: &mut D) {
    driver.script(ScriptedReply::error(400, "Unexpected end of expression"));
    driver.type_text("2+").await;
    driver.press_key("Enter").await;
    assert_eq!(driver.error_text(), "Unexpected end of expression");

    driver.click_button(&KeypadAction::insert("9")).await;
    assert_eq!(driver.error_text(), "");
    assert_eq!(driver.input_text(), "2+9");
}

/// A value-less success shows an empty result
pub async fn verify_empty_success<D: WidgetDriver>(driver: &mut D) {
    driver.script(ScriptedReply::raw(200, "not json"));
    driver.type_text("pi").await;
    driver.press_key("Enter").await;
    assert_eq!(driver.result_text(), "");
    assert_eq!(driver.error_text(), "");
}

/// Runs every scenario, each against a fresh driver
pub async fn run_full_specification<D, F>(mut make_driver: F)
where
    D: WidgetDriver,
    F: FnMut() -> D,
{
    verify_insert_at_caret(&mut make_driver()).await;
    verify_insert_replaces_selection(&mut make_driver()).await;
    verify_backspace(&mut make_driver()).await;
    verify_clear(&mut make_driver()).await;
    verify_successful_evaluation(&mut make_driver()).await;
    verify_failed_evaluation(&mut make_driver()).await;
    verify_fallback_error(&mut make_driver()).await;
    verify_transport_failure(&mut make_driver()).await;
    verify_trimmed_request(&mut make_driver()).await;
    verify_blank_evaluation(&mut make_driver()).await;
    verify_insert_clears_error(&mut make_driver()).await;
    verify_empty_success(&mut make_driver()).await;
}
