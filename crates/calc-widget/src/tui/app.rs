//! Terminal application state
//!
//! The widget lives on the UI loop. Evaluations run as tokio tasks and
//! report back over a channel, so editing continues while one is in flight.

use std::sync::Arc;

use crossterm::event::{Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::input::{InputHandler, KeyAction};
use super::keypad::hit_test;
use super::ui::UiLayout;
use crate::config::WidgetConfig;
use crate::controller::{InputController, PendingEvaluation, Ticket};
use crate::core::Selection;
use crate::dispatch::{Command, WidgetEvent};
use crate::keypad::WidgetKeypad;
use crate::service::{EvaluationOutcome, Evaluator};
use crate::widget::{Widget, WidgetSurface};

/// Evaluator shared with spawned tasks
pub type SharedEvaluator = Arc<dyn Evaluator + Send + Sync>;

/// The terminal's stand-in for the page elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalSurface {
    /// Field text
    pub value: String,
    /// Field selection
    pub selection: Option<Selection>,
    /// Result display
    pub result: String,
    /// Error display
    pub error: String,
    /// Whether the field has focus
    pub focused: bool,
}

impl WidgetSurface for TerminalSurface {
    fn input_value(&self) -> String {
        self.value.clone()
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_input(&mut self, value: &str, selection: Selection) {
        self.value = value.to_string();
        self.selection = Some(selection);
    }

    fn set_result_text(&mut self, text: &str) {
        self.result = text.to_string();
    }

    fn set_error_text(&mut self, text: &str) {
        self.error = text.to_string();
    }

    fn focus_input(&mut self) {
        self.focused = true;
    }
}

/// Terminal calculator application
#[derive(Debug)]
pub struct TerminalApp {
    widget: Widget<TerminalSurface>,
    keypad: WidgetKeypad,
    input: InputHandler,
    evaluator: SharedEvaluator,
    endpoint: String,
    outcomes_tx: UnboundedSender<(Ticket, EvaluationOutcome)>,
    outcomes_rx: UnboundedReceiver<(Ticket, EvaluationOutcome)>,
    in_flight: usize,
    viewport: Rect,
    pressed: Option<String>,
    should_quit: bool,
}

impl TerminalApp {
    /// Creates the app
    pub fn new(config: &WidgetConfig, evaluator: SharedEvaluator) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        let mut surface = TerminalSurface::default();
        surface.focus_input();
        Self {
            widget: Widget::new(surface, config),
            keypad: WidgetKeypad::new(),
            input: InputHandler::new(),
            evaluator,
            endpoint: config.endpoint.clone(),
            outcomes_tx,
            outcomes_rx,
            in_flight: 0,
            viewport: Rect::default(),
            pressed: None,
            should_quit: false,
        }
    }

    // ===== Accessors =====

    /// The widget
    #[must_use]
    pub fn widget(&self) -> &Widget<TerminalSurface> {
        &self.widget
    }

    /// The rendered surface
    #[must_use]
    pub fn surface(&self) -> &TerminalSurface {
        self.widget.surface()
    }

    /// The controller
    #[must_use]
    pub fn controller(&self) -> &InputController {
        self.widget.controller()
    }

    /// The keypad
    #[must_use]
    pub fn keypad(&self) -> &WidgetKeypad {
        &self.keypad
    }

    /// Configured service endpoint
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Id of the most recently pressed keypad button
    #[must_use]
    pub fn pressed(&self) -> Option<&str> {
        self.pressed.as_deref()
    }

    /// Number of evaluations awaiting an outcome
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Returns whether the app should quit
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Sets the quit flag
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Records the terminal size the UI was last drawn at
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Where the keypad was last drawn
    #[must_use]
    pub fn keypad_area(&self) -> Rect {
        UiLayout::new(self.viewport).keypad
    }

    /// Replaces the field selection
    pub fn set_selection(&mut self, selection: Selection) {
        self.widget.edit(|c| c.set_selection(selection));
    }

    // ===== Event handling =====

    /// Handles one terminal event, spawning any evaluation it starts
    pub fn handle_event(&mut self, event: &Event) {
        let pending = match event {
            Event::Key(key) => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            Event::Resize(width, height) => {
                self.set_viewport(Rect::new(0, 0, *width, *height));
                None
            }
            _ => None,
        };
        if let Some(pending) = pending {
            self.spawn_evaluation(pending);
        }
    }

    /// Applies a key; returns the evaluation it started, if any
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PendingEvaluation> {
        let action = self.input.handle_key(key);
        debug!(?action, "key");
        match action {
            KeyAction::InsertChar(c) => {
                let text = c.to_string();
                if text == self.widget.submit_key() {
                    return self.widget.handle_event(&WidgetEvent::key_down(&text)).pending;
                }
                self.widget.run(Command::Insert(text))
            }
            KeyAction::Backspace => self.widget.run(Command::Backspace),
            KeyAction::Clear => self.widget.run(Command::Clear),
            KeyAction::Key(name) => self.widget.handle_event(&WidgetEvent::key_down(&name)).pending,
            KeyAction::CursorLeft(extend) => {
                self.widget.edit(|c| c.move_caret_left(extend));
                None
            }
            KeyAction::CursorRight(extend) => {
                self.widget.edit(|c| c.move_caret_right(extend));
                None
            }
            KeyAction::CursorHome(extend) => {
                self.widget.edit(|c| c.move_caret_home(extend));
                None
            }
            KeyAction::CursorEnd(extend) => {
                self.widget.edit(|c| c.move_caret_end(extend));
                None
            }
            KeyAction::SelectAll => {
                self.widget.edit(InputController::select_all);
                None
            }
            KeyAction::Quit => {
                self.quit();
                None
            }
            KeyAction::None => None,
        }
    }

    /// Applies a mouse event; a left click on a keypad button presses it
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<PendingEvaluation> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let area = self.keypad_area();
        let def = hit_test(&self.keypad, area, mouse.column, mouse.row)?;
        let event = WidgetEvent::button(&def.action);
        self.pressed = Some(def.id.clone());
        self.widget.handle_event(&event).pending
    }

    // ===== Evaluation =====

    /// Runs `pending` on the tokio runtime; the outcome arrives via the channel
    pub fn spawn_evaluation(&mut self, pending: PendingEvaluation) {
        let evaluator = Arc::clone(&self.evaluator);
        let tx = self.outcomes_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = evaluator.evaluate(&pending.request).await;
            // The receiver lives as long as the app
            let _ = tx.send((pending.ticket, outcome));
        });
    }

    /// Waits for the next evaluation outcome and applies it
    pub async fn next_outcome(&mut self) -> Option<bool> {
        let (ticket, outcome) = self.outcomes_rx.recv().await?;
        Some(self.apply_outcome(ticket, outcome))
    }

    /// Applies every outcome that has already arrived
    pub fn drain_outcomes(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((ticket, outcome)) = self.outcomes_rx.try_recv() {
            self.apply_outcome(ticket, outcome);
            applied += 1;
        }
        applied
    }

    fn apply_outcome(&mut self, ticket: Ticket, outcome: EvaluationOutcome) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.widget.finish_evaluation(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{ScriptedEvaluator, ScriptedReply};
    use crate::tui::button_center;
    use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};

    fn app_with(replies: Vec<ScriptedReply>) -> TerminalApp {
        let eval: SharedEvaluator = Arc::new(ScriptedEvaluator::with_replies(replies));
        let mut app = TerminalApp::new(&WidgetConfig::default(), eval);
        app.set_viewport(Rect::new(0, 0, 100, 30));
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut TerminalApp, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key(key(KeyCode::Char(c))).is_none());
        }
    }

    fn click(app: &mut TerminalApp, id: &str) -> Option<PendingEvaluation> {
        let def = app.keypad().find_button_by_id(id).unwrap().clone();
        let (column, row) = button_center(app.keypad(), app.keypad_area(), &def).unwrap();
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    // ===== Construction tests =====

    #[test]
    fn test_app_new() {
        let app = app_with(vec![]);
        assert_eq!(app.surface().value, "");
        assert!(app.surface().focused);
        assert_eq!(app.in_flight(), 0);
        assert!(!app.should_quit());
        assert_eq!(app.endpoint(), "/api/eval");
    }

    // ===== Key handling tests =====

    #[test]
    fn test_typing_and_caret_moves() {
        let mut app = app_with(vec![]);
        type_str(&mut app, "12");
        app.handle_key(key(KeyCode::Left));
        type_str(&mut app, "+");
        assert_eq!(app.surface().value, "1+2");
        assert_eq!(app.surface().selection, Some(Selection::caret(2)));
        app.handle_key(key(KeyCode::Home));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.surface().value, "1+2");
        app.handle_key(key(KeyCode::End));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.surface().value, "1+");
    }

    #[test]
    fn test_shift_selection_replaced_by_typing() {
        let mut app = app_with(vec![]);
        type_str(&mut app, "123");
        app.handle_key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        app.handle_key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        assert_eq!(app.surface().selection, Some(Selection::new(1, 3)));
        type_str(&mut app, "9");
        assert_eq!(app.surface().value, "19");
    }

    #[test]
    fn test_ctrl_a_then_escape() {
        let mut app = app_with(vec![]);
        type_str(&mut app, "sin(1)");
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert_eq!(app.surface().selection, Some(Selection::new(0, 6)));
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.surface().value, "");
    }

    #[test]
    fn test_enter_starts_evaluation() {
        let mut app = app_with(vec![]);
        type_str(&mut app, " 2+2 ");
        let pending = app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(pending.request.expression, "2+2");
    }

    #[test]
    fn test_enter_on_blank_does_nothing() {
        let mut app = app_with(vec![]);
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn test_key_release_ignored() {
        let mut app = app_with(vec![]);
        let mut event = key(KeyCode::Char('1'));
        event.kind = KeyEventKind::Release;
        app.handle_key(event);
        assert_eq!(app.surface().value, "");
    }

    #[test]
    fn test_quit() {
        let mut app = app_with(vec![]);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn test_resize_event_sets_viewport() {
        let mut app = app_with(vec![]);
        app.handle_event(&Event::Resize(120, 40));
        assert_eq!(app.keypad_area(), UiLayout::new(Rect::new(0, 0, 120, 40)).keypad);
    }

    // ===== Mouse tests =====

    #[test]
    fn test_click_keypad_inserts() {
        let mut app = app_with(vec![]);
        assert!(click(&mut app, "btn-sqrt").is_none());
        assert!(click(&mut app, "btn-9").is_none());
        assert_eq!(app.surface().value, "sqrt(9");
        assert_eq!(app.pressed(), Some("btn-9"));
    }

    #[test]
    fn test_click_equals_starts_evaluation() {
        let mut app = app_with(vec![]);
        type_str(&mut app, "5*5");
        let pending = click(&mut app, "btn-equals").unwrap();
        assert_eq!(pending.request.expression, "5*5");
    }

    #[test]
    fn test_click_outside_keypad_ignored() {
        let mut app = app_with(vec![]);
        let pending = app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert!(pending.is_none());
        assert_eq!(app.pressed(), None);
    }

    // ===== Async evaluation tests =====

    #[tokio::test]
    async fn test_spawned_evaluation_reports_back() {
        let mut app = app_with(vec![ScriptedReply::value(4)]);
        type_str(&mut app, "2+2");
        app.handle_event(&Event::Key(key(KeyCode::Enter)));
        assert_eq!(app.in_flight(), 1);
        assert_eq!(app.next_outcome().await, Some(true));
        assert_eq!(app.in_flight(), 0);
        assert_eq!(app.surface().result, "4");
    }

    #[tokio::test]
    async fn test_typing_continues_while_in_flight() {
        let mut app = app_with(vec![ScriptedReply::error(400, "Unexpected end of expression")]);
        type_str(&mut app, "2+");
        app.handle_event(&Event::Key(key(KeyCode::Enter)));
        type_str(&mut app, "3");
        app.next_outcome().await;
        assert_eq!(app.surface().value, "2+3");
        assert_eq!(app.surface().error, "Unexpected end of expression");
    }

    #[tokio::test]
    async fn test_drain_outcomes() {
        let mut app = app_with(vec![ScriptedReply::value(1), ScriptedReply::value(2)]);
        type_str(&mut app, "1");
        app.handle_event(&Event::Key(key(KeyCode::Enter)));
        app.handle_event(&Event::Key(key(KeyCode::Enter)));
        tokio::task::yield_now().await;
        while app.in_flight() > 0 {
            if app.drain_outcomes() == 0 {
                tokio::task::yield_now().await;
            }
        }
        assert!(!app.surface().result.is_empty());
    }
}
