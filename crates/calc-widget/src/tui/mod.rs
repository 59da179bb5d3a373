//! Terminal front-end
//!
//! ratatui rendering and crossterm input over the same [`Widget`](crate::widget::Widget)
//! the browser uses.

mod app;
mod input;
mod keypad;
mod ui;

pub use app::{SharedEvaluator, TerminalApp, TerminalSurface};
pub use input::{InputHandler, KeyAction};
pub use keypad::{button_center, hit_test, KeypadWidget, KEYPAD_WIDTH};
pub use ui::{render, UiLayout, WidgetUi};
