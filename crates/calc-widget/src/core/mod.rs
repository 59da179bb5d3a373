//! Editing model: buffer, selection and display slots
//!
//! Nothing here knows about the DOM, the terminal or the network. The
//! controller composes these pieces; front-ends only read them back.

pub mod buffer;
pub mod display;
pub mod selection;

pub use buffer::ExpressionBuffer;
pub use display::Displays;
pub use selection::{char_offset_from_utf16, utf16_offset_from_char, Selection};
