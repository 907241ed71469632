#![forbid(unsafe_code)]

//! Host-driven page controller.
//!
//! [`Page`] owns the document, the clock, the listener registry and the
//! component state. The host drives it:
//!
//! 1. [`Page::init`] once the document is ready: wires the sidebar, puts
//!    server-rendered `.message` elements on the dismiss timer and registers
//!    validation listeners.
//! 2. [`Page::dispatch`] for every DOM event the host forwards. The returned
//!    [`DispatchOutcome`] says whether to cancel the native default action.
//! 3. [`Page::advance_time`] / [`Page::set_time`] to fire due timers, and
//!    [`Page::next_deadline`] to know when to wake up next.
//!
//! Everything runs synchronously on the caller's thread; handlers for one
//! event run to completion, in registration order, before `dispatch` returns.

use core::time::Duration;
use std::collections::BTreeMap;

use crate::clock::DeterministicClock;
use crate::config::{Texts, UiConfig};
use crate::dispatch::{DispatchOutcome, Handler, Listeners};
use crate::dom::{Dom, NodeId};
use crate::error::UiError;
use crate::event::{EventKind, EventTarget, UiEvent};
use crate::host::Clipboard;
use crate::loading::{self, LoaderHandle};
use crate::sidebar::{SidebarController, SidebarState};
use crate::toast::{ToastHandle, ToastKind, ToastPhase, Toaster};
use crate::validation::{self, CONTROL_TAGS, FormReport};

/// Captured diagnostics for host consumption.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageOutputs {
    /// Diagnostic lines the host should surface (e.g. to `console.error`).
    pub logs: Vec<String>,
}

pub struct Page<D: Dom> {
    dom: D,
    config: UiConfig,
    clock: DeterministicClock,
    listeners: Listeners,
    toaster: Toaster,
    sidebar: Option<SidebarController>,
    last_reports: BTreeMap<NodeId, FormReport>,
    viewport: Option<(u32, u32)>,
    initialized: bool,
    outputs: PageOutputs,
}

impl<D: Dom> Page<D> {
    #[must_use]
    pub fn new(dom: D, config: UiConfig) -> Self {
        Self {
            dom,
            config,
            clock: DeterministicClock::new(),
            listeners: Listeners::new(),
            toaster: Toaster::new(),
            sidebar: None,
            last_reports: BTreeMap::new(),
            viewport: None,
            initialized: false,
            outputs: PageOutputs::default(),
        }
    }

    /// Wire every feature against the current document.
    ///
    /// Features whose elements are missing stay disabled. Calling `init` a
    /// second time does nothing and returns `false`.
    pub fn init(&mut self) -> bool {
        if self.initialized {
            tracing::warn!("page already initialized");
            return false;
        }
        self.initialized = true;
        let _span = tracing::info_span!("page_init").entered();

        self.sidebar = SidebarController::discover(&self.dom, &self.config);
        match &self.sidebar {
            Some(ctl) => ctl.register(&mut self.listeners),
            None => tracing::debug!("sidebar controls missing; sidebar controller disabled"),
        }

        let now = self.clock.now();
        for message in self.dom.elements_by_class(&self.config.classes.message) {
            self.toaster.enroll(message, &self.config, now);
        }

        let body = self.dom.body();
        for form in self.dom.descendants_by_tag(body, &["form"]) {
            self.listeners.add(
                EventTarget::Node(form),
                EventKind::Submit,
                Handler::ValidateRequired { form },
            );
        }

        if let Some(join_form) = self.dom.element_by_id(&self.config.ids.join_form) {
            self.listeners.add(
                EventTarget::Node(join_form),
                EventKind::Submit,
                Handler::JoinClassGuard,
            );
        }

        for control in self.dom.descendants_by_tag(body, &CONTROL_TAGS) {
            self.listeners
                .add(EventTarget::Node(control), EventKind::Input, Handler::LiveInput);
            self.listeners
                .add(EventTarget::Node(control), EventKind::Blur, Handler::LiveBlur);
        }

        tracing::info!(
            listeners = self.listeners.len(),
            toasts = self.toaster.active().len(),
            sidebar = self.sidebar.is_some(),
            "page initialized"
        );
        true
    }

    /// Route one host event to its registered handlers.
    pub fn dispatch(&mut self, event: &UiEvent) -> DispatchOutcome {
        let _span = tracing::debug_span!("dispatch", kind = ?event.kind()).entered();
        if let UiEvent::Resize { width, height } = *event {
            self.viewport = Some((width, height));
        }

        let target = event.target();
        let mut outcome = DispatchOutcome::default();
        for handler in self.listeners.handlers_for(target, event.kind()) {
            outcome.handlers_run += 1;
            match handler {
                Handler::ValidateRequired { form } => {
                    let report = validation::check_form(&self.dom, form);
                    validation::render_report(&mut self.dom, &self.config, &report);
                    if !report.is_valid() {
                        outcome.default_prevented = true;
                        self.show_text(|t| &t.fill_required_fields, ToastKind::Error);
                    }
                    self.last_reports.insert(form, report);
                }
                Handler::JoinClassGuard => {
                    if let Some(field) = validation::empty_class_code(&self.dom, &self.config) {
                        outcome.default_prevented = true;
                        self.show_text(|t| &t.enter_class_code, ToastKind::Error);
                        self.dom.focus(field);
                        outcome.focus = Some(field);
                    }
                }
                Handler::LiveInput => {
                    if let EventTarget::Node(field) = target {
                        validation::live_input(&mut self.dom, &self.config, field);
                    }
                }
                Handler::LiveBlur => {
                    if let EventTarget::Node(field) = target {
                        validation::live_blur(&mut self.dom, &self.config, field);
                    }
                }
                Handler::Sidebar(source) => {
                    let trigger = source.trigger(event);
                    if let (Some(ctl), Some(trigger)) = (self.sidebar.as_mut(), trigger) {
                        ctl.apply(&mut self.dom, &self.config, trigger);
                    }
                }
            }
        }
        outcome
    }

    /// Advance the clock by `dt` and fire due timers. Returns how many fired.
    pub fn advance_time(&mut self, dt: Duration) -> usize {
        self.clock.advance(dt);
        self.fire_due()
    }

    /// Move the clock to `now` (never backwards) and fire due timers.
    pub fn set_time(&mut self, now: Duration) -> usize {
        self.clock.set(now);
        self.fire_due()
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.toaster.next_deadline()
    }

    /// Show a toast.
    pub fn notify(&mut self, message: &str, kind: ToastKind) -> Result<ToastHandle, UiError> {
        self.toaster
            .notify(&mut self.dom, &self.config, self.clock.now(), message, kind)
    }

    pub fn dismiss_toast(&mut self, handle: ToastHandle) -> bool {
        self.toaster.dismiss(&mut self.dom, handle)
    }

    #[must_use]
    pub fn toast_phase(&self, handle: ToastHandle) -> ToastPhase {
        self.toaster.phase(handle)
    }

    #[must_use]
    pub fn active_toasts(&self) -> Vec<ToastHandle> {
        self.toaster.active()
    }

    /// Copy `text` and report the result with a toast.
    pub fn copy_to_clipboard<C>(&mut self, clipboard: &mut C, text: &str) -> bool
    where
        C: Clipboard + ?Sized,
    {
        let result = clipboard.write_text(text);
        self.finish_copy(result)
    }

    /// Report an already-completed clipboard write. Async hosts call this
    /// when their write settles. Failures are logged and turned into an
    /// error toast; they never propagate.
    pub fn finish_copy(&mut self, result: Result<(), UiError>) -> bool {
        match result {
            Ok(()) => {
                self.show_text(|t| &t.copied, ToastKind::Success);
                true
            }
            Err(err) => {
                tracing::error!(%err, "copy to clipboard failed");
                self.outputs.logs.push(format!("copy failed: {err}"));
                self.show_text(|t| &t.copy_failed, ToastKind::Error);
                false
            }
        }
    }

    pub fn show_loading(&mut self, container: NodeId) -> Result<LoaderHandle, UiError> {
        loading::show_loading(&mut self.dom, &self.config, container)
    }

    pub fn hide_loading(&mut self, handle: &mut LoaderHandle) -> bool {
        handle.hide(&mut self.dom)
    }

    /// Sidebar state, or `None` when the controller is disabled.
    #[must_use]
    pub fn sidebar_state(&self) -> Option<SidebarState> {
        self.sidebar.as_ref().map(SidebarController::state)
    }

    /// Report from the latest submit of `form`.
    #[must_use]
    pub fn last_report(&self, form: NodeId) -> Option<&FormReport> {
        self.last_reports.get(&form)
    }

    /// Last viewport size seen in a resize event.
    #[must_use]
    pub const fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    #[must_use]
    pub const fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    #[must_use]
    pub const fn config(&self) -> &UiConfig {
        &self.config
    }

    #[must_use]
    pub const fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub const fn outputs(&self) -> &PageOutputs {
        &self.outputs
    }

    /// Take captured outputs, leaving empty defaults.
    pub fn take_outputs(&mut self) -> PageOutputs {
        std::mem::take(&mut self.outputs)
    }

    /// Toast one of the configured texts. Failures only reach the logs.
    fn show_text(&mut self, pick: fn(&Texts) -> &String, kind: ToastKind) {
        let message = pick(&self.config.texts).clone();
        if let Err(err) = self.notify(&message, kind) {
            tracing::warn!(%err, "toast could not be shown");
            self.outputs.logs.push(format!("toast failed: {err}"));
        }
    }

    fn fire_due(&mut self) -> usize {
        self.toaster
            .fire_due(&mut self.dom, &self.config, self.clock.now())
    }
}
