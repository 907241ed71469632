#![forbid(unsafe_code)]

//! WASM frontend for the classroom portal.
//!
//! Exposes `classroom-ui-core` to page scripts through `wasm-bindgen`:
//! - `ClassroomUi`: binds to the document, attaches listeners, drives toast
//!   timers from `setTimeout` and exposes `showMessage`, `copyToClipboard`,
//!   `showLoading` and `hideLoading`;
//! - free functions `formatDateTime`, `confirmAction` and `debounce`.
//!
//! [`bridge`] holds the browser-independent translation rules and [`slots`]
//! the node-id table; both build on every target.

pub mod bridge;
pub mod slots;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
#[cfg(target_arch = "wasm32")]
pub use wasm::ClassroomUi;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct ClassroomUi;

#[cfg(not(target_arch = "wasm32"))]
impl ClassroomUi {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
