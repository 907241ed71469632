#![forbid(unsafe_code)]

//! Listener registry.
//!
//! Listeners are plain data: a [`Handler`] registered for an
//! ([`EventTarget`], [`EventKind`]) pair. The page routes each [`UiEvent`] to
//! the handlers registered for its target and kind, in registration order.
//! A browser host reads [`Listeners::bindings`] to know which real DOM
//! listeners to install.
//!
//! [`UiEvent`]: crate::event::UiEvent

use std::collections::BTreeSet;

use crate::dom::NodeId;
use crate::event::{EventKind, EventTarget};
use crate::sidebar::SidebarSource;

/// Behavior to run when a listener fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Required-field pass over `form` on submit.
    ValidateRequired { form: NodeId },
    /// Class-code guard on the join-class form.
    JoinClassGuard,
    /// Optimistic success feedback while typing.
    LiveInput,
    /// Error/neutral border on blur.
    LiveBlur,
    /// Feed a sidebar trigger from the given source.
    Sidebar(SidebarSource),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub target: EventTarget,
    pub kind: EventKind,
    pub handler: Handler,
}

#[derive(Debug, Clone, Default)]
pub struct Listeners {
    entries: Vec<Listener>,
}

impl Listeners {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, target: EventTarget, kind: EventKind, handler: Handler) {
        self.entries.push(Listener {
            target,
            kind,
            handler,
        });
    }

    /// Handlers for one event, in registration order.
    #[must_use]
    pub fn handlers_for(&self, target: EventTarget, kind: EventKind) -> Vec<Handler> {
        self.entries
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .map(|l| l.handler)
            .collect()
    }

    /// Distinct (target, kind) pairs with at least one handler.
    #[must_use]
    pub fn bindings(&self) -> BTreeSet<(EventTarget, EventKind)> {
        self.entries.iter().map(|l| (l.target, l.kind)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Listener> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// What the host must do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// The host should call `preventDefault()` (a submit was cancelled).
    pub default_prevented: bool,
    /// Element that received focus during the dispatch, if any.
    pub focus: Option<NodeId>,
    /// Number of handlers that ran.
    pub handlers_run: u32,
}
