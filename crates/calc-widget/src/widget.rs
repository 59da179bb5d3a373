//! Widget: controller bound to a rendering surface
//!
//! The surface owns the visible field, so every event starts by pulling its
//! value and selection (the user may have typed natively) and ends by
//! pushing the controller's state back.

use tracing::debug;

use crate::config::{ResponsePolicy, WidgetConfig};
use crate::controller::{InputController, PendingEvaluation, Ticket};
use crate::core::Selection;
use crate::dispatch::{dispatch, Command, WidgetEvent};
use crate::service::{EvaluationOutcome, Evaluator};

/// The elements a widget drives
pub trait WidgetSurface {
    /// Current text of the input field
    fn input_value(&self) -> String;

    /// Current selection in chars, if the surface tracks one
    fn selection(&self) -> Option<Selection>;

    /// Replaces the field text and places the selection
    fn set_input(&mut self, value: &str, selection: Selection);

    /// Writes the result display
    fn set_result_text(&mut self, text: &str);

    /// Writes the error display
    fn set_error_text(&mut self, text: &str);

    /// Focuses the input field
    fn focus_input(&mut self);
}

/// What handling one event produced
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// Whether the platform default must be suppressed
    pub prevent_default: bool,
    /// Evaluation to run, if the event started one
    pub pending: Option<PendingEvaluation>,
}

/// An input widget over surface `S`
#[derive(Debug)]
pub struct Widget<S> {
    controller: InputController,
    surface: S,
    submit_key: String,
}

impl<S: WidgetSurface> Widget<S> {
    /// Binds a fresh controller to `surface`
    pub fn new(surface: S, config: &WidgetConfig) -> Self {
        Self {
            controller: InputController::with_policy(config.response_policy),
            surface,
            submit_key: config.submit_key.clone(),
        }
    }

    /// Binds with default configuration and the given policy
    pub fn with_policy(surface: S, policy: ResponsePolicy) -> Self {
        Self::new(surface, &WidgetConfig::default().with_policy(policy))
    }

    /// The controller
    pub fn controller(&self) -> &InputController {
        &self.controller
    }

    /// The surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The surface, mutably (for simulating native input)
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Key that submits the field
    pub fn submit_key(&self) -> &str {
        &self.submit_key
    }

    /// Routes one event and runs its command
    pub fn handle_event(&mut self, event: &WidgetEvent) -> EventOutcome {
        let routed = dispatch(event, &self.submit_key);
        let pending = routed.command.and_then(|command| self.run(command));
        EventOutcome {
            prevent_default: routed.prevent_default,
            pending,
        }
    }

    /// Runs one command against the current surface state
    pub fn run(&mut self, command: Command) -> Option<PendingEvaluation> {
        self.pull();
        match command {
            Command::Clear => {
                self.controller.clear();
                self.push_field();
                self.push_displays();
                None
            }
            Command::Backspace => {
                self.controller.backspace();
                self.push_field();
                None
            }
            Command::Insert(text) => {
                self.controller.insert(&text);
                self.push_field();
                self.push_displays();
                None
            }
            Command::Evaluate => {
                let pending = self.controller.begin_evaluation();
                self.push_displays();
                pending
            }
        }
    }

    /// Applies a caret or selection change and pushes the field back
    pub fn edit(&mut self, change: impl FnOnce(&mut InputController)) {
        self.pull();
        change(&mut self.controller);
        self.push_field();
    }

    /// Applies an evaluation outcome to the displays
    pub fn finish_evaluation(&mut self, ticket: Ticket, outcome: EvaluationOutcome) -> bool {
        let applied = self.controller.complete_evaluation(ticket, outcome);
        if applied {
            self.push_displays();
        }
        applied
    }

    /// Evaluates the field with `evaluator`, awaiting the outcome in place.
    ///
    /// Returns false if nothing was sent or the outcome was discarded.
    pub async fn evaluate_with<E>(&mut self, evaluator: &E) -> bool
    where
        E: Evaluator + ?Sized,
    {
        let Some(pending) = self.run(Command::Evaluate) else {
            return false;
        };
        let outcome = evaluator.evaluate(&pending.request).await;
        self.finish_evaluation(pending.ticket, outcome)
    }

    fn pull(&mut self) {
        let value = self.surface.input_value();
        let selection = self.surface.selection();
        self.controller.set_field(&value, selection);
    }

    fn push_field(&mut self) {
        debug!(text = self.controller.text(), "field updated");
        self.surface
            .set_input(self.controller.text(), self.controller.selection());
        self.surface.focus_input();
    }

    fn push_displays(&mut self) {
        let displays = self.controller.displays();
        self.surface.set_result_text(displays.result_text());
        self.surface.set_error_text(displays.error_text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{ScriptedEvaluator, ScriptedReply};

    /// Bare surface recording what it was told
    #[derive(Debug, Default)]
    struct RecordingSurface {
        value: String,
        selection: Option<Selection>,
        result: String,
        error: String,
        focus_count: usize,
    }

    impl WidgetSurface for RecordingSurface {
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
            self.focus_count += 1;
        }
    }

    fn widget() -> Widget<RecordingSurface> {
        Widget::new(RecordingSurface::default(), &WidgetConfig::default())
    }

    #[test]
    fn test_native_typing_is_pulled_before_insert() {
        let mut w = widget();
        w.surface_mut().value = "12".into();
        w.surface_mut().selection = Some(Selection::caret(1));
        w.handle_event(&WidgetEvent::click(None, Some("+")));
        assert_eq!(w.surface().value, "1+2");
        assert_eq!(w.surface().selection, Some(Selection::caret(2)));
        assert_eq!(w.surface().focus_count, 1);
    }

    #[test]
    fn test_surface_reports_typing_before_any_command() {
        let mut w = widget();
        w.surface_mut().value = "3*3".into();
        assert_eq!(w.surface().input_value(), "3*3");
        assert_eq!(w.controller().text(), "");
    }

    #[test]
    fn test_surface_without_selection_appends() {
        let mut w = widget();
        w.surface_mut().value = "7".into();
        w.handle_event(&WidgetEvent::click(None, Some("8")));
        assert_eq!(w.surface().value, "78");
    }

    #[test]
    fn test_clear_event() {
        let mut w = widget();
        w.surface_mut().value = "99".into();
        w.surface_mut().result = "99".into();
        w.handle_event(&WidgetEvent::click(Some("clear"), None));
        assert_eq!(w.surface().value, "");
        assert_eq!(w.surface().result, "");
        assert_eq!(w.surface().selection, Some(Selection::caret(0)));
        assert_eq!(w.surface().focus_count, 1);
    }

    #[test]
    fn test_backspace_event_refocuses() {
        let mut w = widget();
        w.surface_mut().value = "12".into();
        w.handle_event(&WidgetEvent::click(Some("back"), None));
        assert_eq!(w.surface().value, "1");
        assert_eq!(w.surface().focus_count, 1);
    }

    #[test]
    fn test_enter_starts_evaluation() {
        let mut w = widget();
        w.surface_mut().value = " 2+2 ".into();
        let outcome = w.handle_event(&WidgetEvent::key_down("Enter"));
        assert!(outcome.prevent_default);
        assert_eq!(outcome.pending.unwrap().request.expression, "2+2");
    }

    #[test]
    fn test_enter_on_blank_field_starts_nothing() {
        let mut w = widget();
        w.surface_mut().value = "  ".into();
        w.surface_mut().error = "old".into();
        let outcome = w.handle_event(&WidgetEvent::key_down("Enter"));
        assert!(outcome.prevent_default);
        assert!(outcome.pending.is_none());
        assert_eq!(w.surface().error, "old");
    }

    #[test]
    fn test_other_keys_do_nothing() {
        let mut w = widget();
        w.surface_mut().value = "1".into();
        let outcome = w.handle_event(&WidgetEvent::key_down("Backspace"));
        assert_eq!(outcome, EventOutcome::default());
        assert_eq!(w.surface().value, "1");
        assert_eq!(w.surface().focus_count, 0);
    }

    #[test]
    fn test_edit_pushes_selection() {
        let mut w = widget();
        w.surface_mut().value = "abc".into();
        w.edit(InputController::select_all);
        assert_eq!(w.surface().selection, Some(Selection::new(0, 3)));
    }

    #[tokio::test]
    async fn test_evaluate_with_scripted_service() {
        let eval = ScriptedEvaluator::with_replies([
            ScriptedReply::value(4),
            ScriptedReply::error(400, "Unexpected end of expression"),
        ]);
        let mut w = widget();
        w.surface_mut().value = "2+2".into();
        assert!(w.evaluate_with(&eval).await);
        assert_eq!(w.surface().result, "4");

        w.surface_mut().value = "2+".into();
        assert!(w.evaluate_with(&eval).await);
        assert_eq!(w.surface().result, "");
        assert_eq!(w.surface().error, "Unexpected end of expression");
    }

    #[tokio::test]
    async fn test_evaluate_with_blank_sends_nothing() {
        let eval = ScriptedEvaluator::new();
        let mut w = widget();
        assert!(!w.evaluate_with(&eval).await);
        assert_eq!(eval.request_count(), 0);
    }
}
