#![forbid(unsafe_code)]

//! Auto-dismissing toast notifications.
//!
//! Each toast walks `Visible → Fading → Removed`:
//!
//! 1. shown (created by [`Toaster::notify`] or enrolled from markup at init),
//! 2. after `toast_duration` its opacity is set to `0`,
//! 3. after a further `toast_fade` the node is removed.
//!
//! Both timed steps first check that the node is still attached, so a toast
//! dismissed early, or removed by the host, makes its pending timers no-ops.
//! Every toast has its own id and timers; toasts never affect each other.

use core::time::Duration;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clock::TimerQueue;
use crate::config::UiConfig;
use crate::dom::{Dom, NodeId};
use crate::error::UiError;

/// Severity of a toast. Also its CSS modifier class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Success,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Material icon ligature shown next to the text.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Success => "check_circle",
            Self::Error => "error",
        }
    }

    /// Parse the kind names used by the JS API; anything else is `Success`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("error") {
            Self::Error
        } else {
            Self::Success
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastPhase {
    Visible,
    Fading,
    Removed,
}

/// Handle to a toast returned by [`Toaster::notify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastHandle {
    pub id: ToastId,
    pub node: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastTimer {
    Fade(ToastId),
    Remove(ToastId),
}

#[derive(Debug, Clone, Copy)]
struct ToastEntry {
    node: NodeId,
    phase: ToastPhase,
}

#[derive(Debug, Clone, Default)]
pub struct Toaster {
    next_id: u64,
    live: BTreeMap<ToastId, ToastEntry>,
    timers: TimerQueue<ToastTimer>,
}

impl Toaster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a toast under `<body>` and start its dismiss timer.
    pub fn notify<D: Dom>(
        &mut self,
        dom: &mut D,
        config: &UiConfig,
        now: Duration,
        message: &str,
        kind: ToastKind,
    ) -> Result<ToastHandle, UiError> {
        let node = build_toast(dom, config, message, kind)?;
        let body = dom.body();
        dom.append_child(body, node)?;
        tracing::debug!(?kind, message, "toast shown");
        Ok(self.enroll(node, config, now))
    }

    /// Put an existing message node on the dismiss timer.
    pub fn enroll(&mut self, node: NodeId, config: &UiConfig, now: Duration) -> ToastHandle {
        let id = ToastId(self.next_id);
        self.next_id += 1;
        self.live.insert(
            id,
            ToastEntry {
                node,
                phase: ToastPhase::Visible,
            },
        );
        self.timers
            .schedule(now, config.toast_duration(), ToastTimer::Fade(id));
        ToastHandle { id, node }
    }

    /// Remove a toast before its timers run. Returns `false` if it was
    /// already gone.
    pub fn dismiss<D: Dom>(&mut self, dom: &mut D, handle: ToastHandle) -> bool {
        let Some(entry) = self.live.remove(&handle.id) else {
            return false;
        };
        dom.remove(entry.node)
    }

    #[must_use]
    pub fn phase(&self, handle: ToastHandle) -> ToastPhase {
        self.live
            .get(&handle.id)
            .map_or(ToastPhase::Removed, |entry| entry.phase)
    }

    /// Toasts not yet removed, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<ToastHandle> {
        self.live
            .iter()
            .map(|(&id, entry)| ToastHandle {
                id,
                node: entry.node,
            })
            .collect()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Run every timer due at `now`. Follow-up timers are anchored at the
    /// deadline of the timer that scheduled them. Returns the number fired.
    pub fn fire_due<D: Dom>(&mut self, dom: &mut D, config: &UiConfig, now: Duration) -> usize {
        let mut fired = 0;
        while let Some(due) = self.timers.pop_due(now) {
            fired += 1;
            match due.payload {
                ToastTimer::Fade(id) => self.fade(dom, config, id, due.deadline),
                ToastTimer::Remove(id) => self.finish(dom, id),
            }
        }
        fired
    }

    fn fade<D: Dom>(&mut self, dom: &mut D, config: &UiConfig, id: ToastId, at: Duration) {
        let Some(entry) = self.live.get_mut(&id) else {
            return;
        };
        if !dom.is_connected(entry.node) {
            self.live.remove(&id);
            return;
        }
        dom.set_style(entry.node, "opacity", "0");
        entry.phase = ToastPhase::Fading;
        self.timers
            .schedule(at, config.toast_fade(), ToastTimer::Remove(id));
    }

    fn finish<D: Dom>(&mut self, dom: &mut D, id: ToastId) {
        let Some(entry) = self.live.remove(&id) else {
            return;
        };
        if dom.is_connected(entry.node) {
            dom.remove(entry.node);
        }
        tracing::trace!(?id, "toast removed");
    }
}

/// Build the detached toast markup.
///
/// The message is set as text content, never parsed as markup.
fn build_toast<D: Dom>(
    dom: &mut D,
    config: &UiConfig,
    message: &str,
    kind: ToastKind,
) -> Result<NodeId, UiError> {
    let root = dom.create_element("div")?;
    dom.add_class(root, &config.classes.message);
    dom.add_class(root, kind.class_name());

    let content = dom.create_element("div")?;
    dom.add_class(content, "message-content");

    let icon = dom.create_element("i")?;
    dom.add_class(icon, "material-icons");
    dom.add_class(icon, "message-icon");
    dom.set_text(icon, kind.icon());

    let text = dom.create_element("span")?;
    dom.add_class(text, "message-text");
    dom.set_text(text, message);

    dom.append_child(content, icon)?;
    dom.append_child(content, text)?;
    dom.append_child(root, content)?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryDom};
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn toast_markup_matches_stylesheet_contract() {
        let cfg = UiConfig::default();
        let mut dom = MemoryDom::new();
        let mut toaster = Toaster::new();
        let h = toaster.notify(&mut dom, &cfg, ms(0), "<b>saved</b>", ToastKind::Error).unwrap();
        assert_eq!(
            dom.outer_html(h.node),
            "<div class=\"message error\"><div class=\"message-content\">\
             <i class=\"material-icons message-icon\">error</i>\
             <span class=\"message-text\"><b>saved</b></span></div></div>"
        );
        // Text stays text: no element children were parsed out of it.
        let span = dom.elements_by_class("message-text")[0];
        assert!(dom.children(span).is_empty());
    }

    #[test]
    fn lifecycle_fades_then_removes() {
        let cfg = UiConfig::default();
        let mut dom = MemoryDom::new();
        let mut toaster = Toaster::new();
        let h = toaster.notify(&mut dom, &cfg, ms(0), "hi", ToastKind::Success).unwrap();

        assert_eq!(toaster.fire_due(&mut dom, &cfg, ms(4_999)), 0);
        assert_eq!(toaster.phase(h), ToastPhase::Visible);

        assert_eq!(toaster.fire_due(&mut dom, &cfg, ms(5_000)), 1);
        assert_eq!(toaster.phase(h), ToastPhase::Fading);
        assert_eq!(dom.style(h.node, "opacity").as_deref(), Some("0"));
        assert!(dom.is_connected(h.node));

        assert_eq!(toaster.fire_due(&mut dom, &cfg, ms(5_299)), 0);
        assert_eq!(toaster.fire_due(&mut dom, &cfg, ms(5_300)), 1);
        assert_eq!(toaster.phase(h), ToastPhase::Removed);
        assert!(!dom.is_connected(h.node));
        assert!(toaster.next_deadline().is_none());
    }

    #[test]
    fn long_jump_runs_whole_chain() {
        let cfg = UiConfig::default();
        let mut dom = MemoryDom::new();
        let mut toaster = Toaster::new();
        let h = toaster.notify(&mut dom, &cfg, ms(0), "hi", ToastKind::Success).unwrap();
        assert_eq!(toaster.fire_due(&mut dom, &cfg, ms(60_000)), 2);
        assert!(!dom.is_connected(h.node));
    }

    #[test]
    fn externally_removed_toast_is_left_alone() {
        let cfg = UiConfig::default();
        let mut dom = MemoryDom::new();
        let mut toaster = Toaster::new();
        let h = toaster.notify(&mut dom, &cfg, ms(0), "hi", ToastKind::Success).unwrap();
        dom.remove(h.node);

        toaster.fire_due(&mut dom, &cfg, ms(5_000));
        assert_eq!(dom.style(h.node, "opacity"), None);
        assert_eq!(toaster.phase(h), ToastPhase::Removed);
        assert!(toaster.next_deadline().is_none());
    }

    #[test]
    fn dismiss_is_idempotent() {
        let cfg = UiConfig::default();
        let mut dom = MemoryDom::new();
        let mut toaster = Toaster::new();
        let h = toaster.notify(&mut dom, &cfg, ms(0), "hi", ToastKind::Success).unwrap();
        assert!(toaster.dismiss(&mut dom, h));
        assert!(!toaster.dismiss(&mut dom, h));
        assert_eq!(toaster.fire_due(&mut dom, &cfg, ms(10_000)), 1);
        assert!(toaster.active().is_empty());
    }

    #[test]
    fn enrolled_markup_follows_same_timers() {
        let cfg = UiConfig::default();
        let mut dom = MemoryDom::new();
        let node = dom.mount_in_body(ElementSpec::new("div").class("message").text("Welcome"));
        let mut toaster = Toaster::new();
        let h = toaster.enroll(node, &cfg, ms(100));
        toaster.fire_due(&mut dom, &cfg, ms(5_100));
        assert_eq!(toaster.phase(h), ToastPhase::Fading);
        toaster.fire_due(&mut dom, &cfg, ms(5_400));
        assert!(!dom.is_connected(node));
    }

    #[test]
    fn kind_names() {
        assert_eq!(ToastKind::from_name("error"), ToastKind::Error);
        assert_eq!(ToastKind::from_name("ERROR"), ToastKind::Error);
        assert_eq!(ToastKind::from_name("info"), ToastKind::Success);
        assert_eq!(ToastKind::default(), ToastKind::Success);
    }
}
