#![forbid(unsafe_code)]

//! Loading indicator.
//!
//! [`show_loading`] appends a spinner to a container and returns a
//! [`LoaderHandle`]. The handle remembers whether it already removed its node,
//! so hiding twice is harmless. Each call produces its own node, so several
//! loaders can be visible at once.

use crate::config::UiConfig;
use crate::dom::{Dom, NodeId};
use crate::error::UiError;

#[derive(Debug, PartialEq, Eq)]
pub struct LoaderHandle {
    node: NodeId,
    live: bool,
}

impl LoaderHandle {
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.live
    }

    /// Detach the loader from whatever parent it has, even when that parent
    /// has itself left the document. Returns whether this call removed it.
    pub fn hide<D: Dom>(&mut self, dom: &mut D) -> bool {
        if !self.live {
            return false;
        }
        self.live = false;
        dom.remove(self.node)
    }
}

/// Append `div.loading > div.loading-spinner + span` to `container`.
pub fn show_loading<D: Dom>(
    dom: &mut D,
    config: &UiConfig,
    container: NodeId,
) -> Result<LoaderHandle, UiError> {
    let loader = dom.create_element("div")?;
    dom.add_class(loader, &config.classes.loading);
    let spinner = dom.create_element("div")?;
    dom.add_class(spinner, "loading-spinner");
    let label = dom.create_element("span")?;
    dom.set_text(label, &config.texts.loading);
    dom.append_child(loader, spinner)?;
    dom.append_child(loader, label)?;
    dom.append_child(container, loader)?;
    Ok(LoaderHandle {
        node: loader,
        live: true,
    })
}

/// Free-function form of [`LoaderHandle::hide`].
pub fn hide_loading<D: Dom>(dom: &mut D, handle: &mut LoaderHandle) -> bool {
    handle.hide(dom)
}
