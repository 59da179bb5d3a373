//! Browser front-end
//!
//! The mock DOM and its driver compile everywhere so the widget's page
//! behaviour is tested natively; the real bindings need the `wasm` feature
//! on a wasm32 target.

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod browser;
mod dom;
mod driver;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use browser::{mount, mount_with, BrowserSurface, MountedWidget};
pub use dom::{DomElement, DomEvent, MockDom};
pub use driver::DomDriver;
