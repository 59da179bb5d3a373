//! Input Widget Controller
//!
//! Owns the expression buffer, the selection and the two display slots, and
//! implements every user-facing operation on them.
//!
//! Evaluation is split in two halves so the controller never has to be
//! borrowed across a network call:
//!
//! ```text
//! begin_evaluation()          -> Some(PendingEvaluation { ticket, request })
//!   ... evaluator.evaluate(&request).await (other edits still allowed) ...
//! complete_evaluation(ticket, outcome)
//! ```

use tracing::{debug, info, warn};

use crate::config::ResponsePolicy;
use crate::core::{Displays, ExpressionBuffer, Selection};
use crate::service::{EvaluationOutcome, EvaluationRequest};

/// Identifies one evaluation request; tickets increase monotonically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// The raw sequence number
    #[must_use]
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// An evaluation that has been started but not yet completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvaluation {
    /// Ticket to hand back on completion
    pub ticket: Ticket,
    /// Request to send
    pub request: EvaluationRequest,
}

/// The widget's editing and display state
#[derive(Debug, Clone, Default)]
pub struct InputController {
    buffer: ExpressionBuffer,
    /// `None` means no selection state has been set (caret at end)
    selection: Option<Selection>,
    /// Fixed end while extending a selection from the keyboard
    anchor: Option<usize>,
    displays: Displays,
    policy: ResponsePolicy,
    issued: u64,
}

impl InputController {
    /// Creates an empty controller
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty controller with a response policy
    #[must_use]
    pub fn with_policy(policy: ResponsePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    // ===== Accessors =====

    /// The expression text
    #[must_use]
    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// The expression buffer
    #[must_use]
    pub fn buffer(&self) -> &ExpressionBuffer {
        &self.buffer
    }

    /// The effective selection, clamped to the buffer
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
            .map_or_else(|| self.buffer.end_caret(), |s| s.clamped(self.buffer.char_len()))
    }

    /// The selection as last set, if any
    #[must_use]
    pub fn explicit_selection(&self) -> Option<Selection> {
        self.selection
    }

    /// The display slots
    #[must_use]
    pub fn displays(&self) -> &Displays {
        &self.displays
    }

    /// Result display text
    #[must_use]
    pub fn result_text(&self) -> &str {
        self.displays.result_text()
    }

    /// Error display text
    #[must_use]
    pub fn error_text(&self) -> &str {
        self.displays.error_text()
    }

    /// The active response policy
    #[must_use]
    pub fn policy(&self) -> ResponsePolicy {
        self.policy
    }

    /// Ticket of the most recently issued request
    #[must_use]
    pub fn latest_ticket(&self) -> Option<Ticket> {
        (self.issued > 0).then_some(Ticket(self.issued))
    }

    // ===== Field synchronization =====

    /// Replaces the field contents, e.g. after the user typed natively
    pub fn set_field(&mut self, text: &str, selection: Option<Selection>) {
        if self.buffer.as_str() != text {
            self.buffer.set_text(text);
            self.anchor = None;
        }
        self.selection = selection;
    }

    /// Sets the selection
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Some(selection.clamped(self.buffer.char_len()));
        self.anchor = None;
    }

    // ===== Edit operations =====

    /// Splices `fragment` over the selection and clears the error display
    pub fn insert(&mut self, fragment: &str) {
        let selection = self.selection();
        let caret = self.buffer.insert(fragment, selection);
        debug!(fragment, start = selection.start, end = selection.end, "insert");
        self.selection = Some(caret);
        self.anchor = None;
        self.displays.clear_error();
    }

    /// Deletes the selection or the char before the caret
    pub fn backspace(&mut self) {
        let selection = self.selection();
        let caret = self.buffer.backspace(selection);
        debug!(start = selection.start, end = selection.end, "backspace");
        self.selection = Some(caret);
        self.anchor = None;
    }

    /// Empties the field and both displays
    pub fn clear(&mut self) {
        debug!("clear");
        self.buffer.clear();
        self.selection = Some(Selection::caret(0));
        self.anchor = None;
        self.displays.clear();
    }

    // ===== Caret navigation =====

    /// Moves the caret one char left, or extends the selection
    pub fn move_caret_left(&mut self, extend: bool) {
        let sel = self.selection();
        if !extend && !sel.is_caret() {
            self.collapse_to(sel.start);
            return;
        }
        let head = self.head();
        self.move_head(head.saturating_sub(1), extend);
    }

    /// Moves the caret one char right, or extends the selection
    pub fn move_caret_right(&mut self, extend: bool) {
        let sel = self.selection();
        if !extend && !sel.is_caret() {
            self.collapse_to(sel.end);
            return;
        }
        let head = self.head();
        self.move_head((head + 1).min(self.buffer.char_len()), extend);
    }

    /// Moves the caret to the start of the field
    pub fn move_caret_home(&mut self, extend: bool) {
        self.move_head(0, extend);
    }

    /// Moves the caret to the end of the field
    pub fn move_caret_end(&mut self, extend: bool) {
        self.move_head(self.buffer.char_len(), extend);
    }

    /// Selects the whole field
    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.selection = Some(Selection::new(0, self.buffer.char_len()));
    }

    /// The moving end of the selection
    fn head(&self) -> usize {
        let sel = self.selection();
        match self.anchor {
            Some(anchor) if anchor == sel.end => sel.start,
            _ => sel.end,
        }
    }

    fn move_head(&mut self, head: usize, extend: bool) {
        if extend {
            let anchor = self.anchor.unwrap_or_else(|| {
                let sel = self.selection();
                if sel.end == self.head() {
                    sel.start
                } else {
                    sel.end
                }
            });
            self.anchor = Some(anchor);
            self.selection = Some(Selection::new(anchor, head));
        } else {
            self.collapse_to(head);
        }
    }

    fn collapse_to(&mut self, offset: usize) {
        self.anchor = None;
        self.selection = Some(Selection::caret(offset));
    }

    // ===== Evaluation =====

    /// Starts an evaluation of the trimmed buffer.
    ///
    /// Returns `None`, touching nothing, when the buffer is blank. Otherwise
    /// clears the error display and issues a new ticket.
    pub fn begin_evaluation(&mut self) -> Option<PendingEvaluation> {
        let expression = self.buffer.trimmed();
        if expression.is_empty() {
            debug!("blank expression, evaluation skipped");
            return None;
        }
        let request = EvaluationRequest::new(expression);
        self.displays.clear_error();
        self.issued += 1;
        let ticket = Ticket(self.issued);
        info!(ticket = ticket.0, expression = %request.expression, "evaluation started");
        Some(PendingEvaluation { ticket, request })
    }

    /// Applies the outcome of the evaluation identified by `ticket`.
    ///
    /// Returns false if the outcome was discarded as stale, which only
    /// happens under [`ResponsePolicy::LatestRequest`].
    pub fn complete_evaluation(&mut self, ticket: Ticket, outcome: EvaluationOutcome) -> bool {
        if self.policy == ResponsePolicy::LatestRequest && ticket.0 < self.issued {
            warn!(ticket = ticket.0, latest = self.issued, "stale evaluation discarded");
            return false;
        }
        match outcome {
            Ok(evaluation) => {
                let text = evaluation.display_text();
                info!(ticket = ticket.0, result = %text, "evaluation succeeded");
                self.displays.set_result(text);
                self.displays.clear_error();
            }
            Err(err) => {
                warn!(ticket = ticket.0, error = %err, "evaluation failed");
                self.displays.clear_result();
                self.displays.set_error(err.to_string());
            }
        }
        true
    }
}
