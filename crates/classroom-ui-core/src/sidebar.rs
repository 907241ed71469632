#![forbid(unsafe_code)]

//! Mobile sidebar controller.
//!
//! A two-state machine. [`SidebarState::on`] is the pure transition
//! function; [`SidebarController`] owns the state and renders it as class
//! markers:
//!
//! | State    | sidebar  | overlay  | body           |
//! |----------|----------|----------|----------------|
//! | `Closed` | -        | -        | -              |
//! | `Open`   | `active` | `active` | `sidebar-open` |
//!
//! The controller is only created when both the menu button and the sidebar
//! exist. Overlay and close button are optional.

use crate::config::UiConfig;
use crate::dispatch::{Handler, Listeners};
use crate::dom::{Dom, NodeId};
use crate::event::{EventKind, EventTarget, KeyCode, UiEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SidebarState {
    #[default]
    Closed,
    Open,
}

/// An input that may change the sidebar state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SidebarTrigger {
    /// Menu button pressed.
    Open,
    /// Close button, overlay or navigation link pressed.
    Close,
    /// Escape key pressed anywhere.
    Escape,
    /// Viewport resized to `width` logical pixels.
    Resize { width: u32 },
}

impl SidebarState {
    /// Next state after `trigger`. Widths strictly above `breakpoint` count
    /// as desktop and close an open sidebar.
    #[must_use]
    pub const fn on(self, trigger: SidebarTrigger, breakpoint: u32) -> Self {
        match (self, trigger) {
            (_, SidebarTrigger::Open) => Self::Open,
            (_, SidebarTrigger::Close) => Self::Closed,
            (Self::Open, SidebarTrigger::Escape) => Self::Closed,
            (Self::Open, SidebarTrigger::Resize { width }) if width > breakpoint => Self::Closed,
            (state, _) => state,
        }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Which wired element (or global source) a listener belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SidebarSource {
    MenuButton,
    CloseButton,
    Overlay,
    NavLink,
    EscapeKey,
    ViewportResize,
}

impl SidebarSource {
    /// Translate an event from this source into a trigger.
    #[must_use]
    pub fn trigger(self, event: &UiEvent) -> Option<SidebarTrigger> {
        match (self, event) {
            (Self::MenuButton, UiEvent::Click { .. }) => Some(SidebarTrigger::Open),
            (Self::CloseButton | Self::Overlay | Self::NavLink, UiEvent::Click { .. }) => {
                Some(SidebarTrigger::Close)
            }
            (Self::EscapeKey, UiEvent::KeyDown { .. }) => {
                (event.key_code() == Some(KeyCode::Escape)).then_some(SidebarTrigger::Escape)
            }
            (Self::ViewportResize, UiEvent::Resize { width, .. }) => {
                Some(SidebarTrigger::Resize { width: *width })
            }
            _ => None,
        }
    }
}

/// Elements the controller drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarElements {
    pub menu_button: NodeId,
    pub sidebar: NodeId,
    pub overlay: Option<NodeId>,
    pub close_button: Option<NodeId>,
    pub links: Vec<NodeId>,
}

impl SidebarElements {
    /// Look the elements up by the configured ids. `None` when the menu
    /// button or the sidebar is missing.
    #[must_use]
    pub fn discover<D: Dom>(dom: &D, config: &UiConfig) -> Option<Self> {
        let menu_button = dom.element_by_id(&config.ids.menu_button)?;
        let sidebar = dom.element_by_id(&config.ids.sidebar)?;
        Some(Self {
            menu_button,
            sidebar,
            overlay: dom.element_by_id(&config.ids.overlay),
            close_button: dom.element_by_id(&config.ids.close_button),
            links: dom.elements_by_class(&config.classes.sidebar_link),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SidebarController {
    elements: SidebarElements,
    state: SidebarState,
}

impl SidebarController {
    #[must_use]
    pub const fn new(elements: SidebarElements) -> Self {
        Self {
            elements,
            state: SidebarState::Closed,
        }
    }

    #[must_use]
    pub fn discover<D: Dom>(dom: &D, config: &UiConfig) -> Option<Self> {
        SidebarElements::discover(dom, config).map(Self::new)
    }

    #[must_use]
    pub const fn state(&self) -> SidebarState {
        self.state
    }

    #[must_use]
    pub const fn elements(&self) -> &SidebarElements {
        &self.elements
    }

    /// Register the controller's listeners.
    pub fn register(&self, listeners: &mut Listeners) {
        let el = &self.elements;
        let click = |listeners: &mut Listeners, node: NodeId, source: SidebarSource| {
            listeners.add(
                EventTarget::Node(node),
                EventKind::Click,
                Handler::Sidebar(source),
            );
        };
        click(listeners, el.menu_button, SidebarSource::MenuButton);
        if let Some(close) = el.close_button {
            click(listeners, close, SidebarSource::CloseButton);
        }
        if let Some(overlay) = el.overlay {
            click(listeners, overlay, SidebarSource::Overlay);
        }
        for &link in &el.links {
            click(listeners, link, SidebarSource::NavLink);
        }
        listeners.add(
            EventTarget::Document,
            EventKind::KeyDown,
            Handler::Sidebar(SidebarSource::EscapeKey),
        );
        listeners.add(
            EventTarget::Window,
            EventKind::Resize,
            Handler::Sidebar(SidebarSource::ViewportResize),
        );
    }

    /// Apply `trigger` and render the resulting state. The markers are
    /// rewritten even when the state stays the same. Returns whether the
    /// state changed.
    pub fn apply<D: Dom>(
        &mut self,
        dom: &mut D,
        config: &UiConfig,
        trigger: SidebarTrigger,
    ) -> bool {
        let next = self.state.on(trigger, config.mobile_breakpoint_px);
        let changed = next != self.state;
        if changed {
            tracing::debug!(from = ?self.state, to = ?next, ?trigger, "sidebar transition");
            self.state = next;
        }
        self.render(dom, config);
        changed
    }

    /// Write the current state to the class markers.
    pub fn render<D: Dom>(&self, dom: &mut D, config: &UiConfig) {
        let active = &config.classes.active;
        let body = dom.body();
        let mut marked = vec![(self.elements.sidebar, active.as_str())];
        if let Some(overlay) = self.elements.overlay {
            marked.push((overlay, active.as_str()));
        }
        marked.push((body, config.classes.sidebar_open.as_str()));
        for (node, class) in marked {
            if self.state.is_open() {
                dom.add_class(node, class);
            } else {
                dom.remove_class(node, class);
            }
        }
    }
}
