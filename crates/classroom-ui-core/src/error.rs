#![forbid(unsafe_code)]

//! Error type shared by the page behavior layer.
//!
//! User-facing failures (empty fields, a rejected clipboard write) never
//! surface here; they become toasts and cancelled submits. `UiError` covers
//! API misuse by the host: stale node ids, bad configuration, corrupt traces.

use crate::dom::NodeId;

/// Page behavior error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// The node id does not refer to a node of this document.
    UnknownNode(NodeId),
    /// The node exists but is no longer attached to the document.
    Detached(NodeId),
    /// Host-supplied configuration could not be parsed.
    Config(String),
    /// The clipboard capability rejected a write.
    Clipboard(String),
    /// A session trace could not be encoded, decoded or replayed.
    Trace(String),
    /// The host document rejected an operation.
    Host(String),
}

impl core::fmt::Display for UiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node: {id}"),
            Self::Detached(id) => write!(f, "node is detached: {id}"),
            Self::Config(msg) => write!(f, "invalid config: {msg}"),
            Self::Clipboard(msg) => write!(f, "clipboard write failed: {msg}"),
            Self::Trace(msg) => write!(f, "session trace: {msg}"),
            Self::Host(msg) => write!(f, "host error: {msg}"),
        }
    }
}

impl std::error::Error for UiError {}
