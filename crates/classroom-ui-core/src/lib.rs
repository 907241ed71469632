#![forbid(unsafe_code)]

//! `classroom-ui-core` implements the classroom portal's page behavior
//! without binding to a browser.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment pushes [`UiEvent`]s and
//!   supplies clipboard / confirm capabilities.
//! - **Deterministic time**: timers only fire when the host advances the
//!   clock, so every behavior is testable and replayable.
//! - **State apart from rendering**: sidebar state, validation reports and
//!   toast phases are plain values; writing them into the document is a
//!   separate step over the [`Dom`] trait.
//!
//! `classroom-ui-web` wraps this crate with a `wasm-bindgen` API.

pub mod clock;
pub mod config;
pub mod datetime;
pub mod debounce;
pub mod dispatch;
pub mod dom;
pub mod error;
pub mod event;
pub mod host;
pub mod loading;
pub mod page;
pub mod sidebar;
pub mod toast;
pub mod trace;
pub mod validation;

pub use config::UiConfig;
pub use dispatch::DispatchOutcome;
pub use dom::{Dom, ElementSpec, MemoryDom, NodeId};
pub use error::UiError;
pub use event::UiEvent;
pub use page::Page;
pub use toast::ToastKind;
