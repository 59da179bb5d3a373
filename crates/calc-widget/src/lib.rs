//! calc-widget - calculator input widget with remote evaluation
//!
//! A text field with a clickable keypad. Keypad buttons splice text at the
//! caret (or over the selection), `⌫` deletes backwards, `C` clears, and
//! `=`/Enter posts the trimmed expression to an evaluation service:
//!
//! ```text
//! POST /api/eval  {"expression": "2+2"}  ->  {"value": 4}
//!                                        or  {"error": "..."} with a non-2xx status
//! ```
//!
//! The same [`widget::Widget`] runs in the browser (`wasm` feature), in a
//! terminal (`tui` feature), and against an in-memory DOM for tests.
//!
//! # Example
//!
//! ```rust
//! use calc_widget::prelude::*;
//!
//! let mut controller = InputController::new();
//! controller.insert("12");
//! controller.set_selection(Selection::caret(1));
//! controller.insert("+");
//! assert_eq!(controller.text(), "1+2");
//!
//! let pending = controller.begin_evaluation().unwrap();
//! assert_eq!(pending.request.expression, "1+2");
//! controller.complete_evaluation(pending.ticket, Ok(Evaluation::with_value(3)));
//! assert_eq!(controller.result_text(), "3");
//! ```

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::float_cmp
    )
)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

pub mod config;
pub mod controller;
pub mod core;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod keypad;
pub mod service;
pub mod widget;

#[cfg(feature = "tui")]
pub mod tui;

/// Browser front-end; the mock DOM is always available for testing
pub mod wasm;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ResponsePolicy, WidgetConfig};
    pub use crate::controller::{InputController, PendingEvaluation, Ticket};
    pub use crate::core::{Displays, ExpressionBuffer, Selection};
    pub use crate::dispatch::{dispatch, Command, Dispatch, WidgetEvent};
    pub use crate::driver::WidgetDriver;
    pub use crate::error::{WidgetError, WidgetResult};
    pub use crate::keypad::{KeypadAction, KeypadButtonDef, WidgetKeypad};
    pub use crate::service::{
        interpret_response, Evaluation, EvaluationError, EvaluationOutcome, EvaluationRequest,
        Evaluator, ScriptedEvaluator, ScriptedReply,
    };
    pub use crate::widget::{EventOutcome, Widget, WidgetSurface};

    #[cfg(feature = "native")]
    pub use crate::service::HttpEvaluator;

    #[cfg(feature = "tui")]
    pub use crate::driver::TerminalDriver;
    #[cfg(feature = "tui")]
    pub use crate::tui::TerminalApp;

    pub use crate::wasm::{DomDriver, DomElement, DomEvent, MockDom};
}
