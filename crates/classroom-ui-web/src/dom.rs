#![forbid(unsafe_code)]

//! [`Dom`] over the live browser document.
//!
//! Elements are interned on first sight into a [`Slots`] table and tagged
//! with their slot index, so lookups never scan. Removing an element through
//! [`Dom::remove`] releases the slots of its whole subtree; a stale
//! [`NodeId`] then resolves to nothing and reports `is_connected() == false`.

use std::cell::RefCell;

use classroom_ui_core::{Dom, NodeId, UiError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
};

use crate::slots::{NODE_ATTR, Slots, parse_slot};

fn host_error(err: &JsValue) -> UiError {
    UiError::Host(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn same(a: &Element, b: &Element) -> bool {
    let a: &JsValue = a.as_ref();
    let b: &JsValue = b.as_ref();
    a == b
}

fn slot_of(element: &Element) -> Option<u32> {
    element.get_attribute(NODE_ATTR).as_deref().and_then(parse_slot)
}

pub struct WebDom {
    document: Document,
    body: NodeId,
    slots: RefCell<Slots<Element>>,
    pending_focus: Option<NodeId>,
}

impl WebDom {
    /// Wrap `document`. Fails when the document has no `<body>` yet.
    pub fn new(document: Document) -> Result<Self, UiError> {
        let body = document
            .body()
            .ok_or_else(|| UiError::Host("document has no body".to_owned()))?;
        let dom = Self {
            document,
            body: NodeId::from_raw(0),
            slots: RefCell::new(Slots::new()),
            pending_focus: None,
        };
        let body = dom.intern(body.into());
        Ok(Self { body, ..dom })
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Id for `element`, interning it if it is new.
    ///
    /// The tag is checked against the stored element, so a clone carrying a
    /// copied attribute gets its own slot.
    pub fn intern(&self, element: Element) -> NodeId {
        let mut slots = self.slots.borrow_mut();
        let known = slot_of(&element)
            .filter(|&slot| slots.get(slot).is_some_and(|known| same(known, &element)));
        if let Some(slot) = known {
            return NodeId::from_raw(slot);
        }
        let slot = slots.insert(element.clone());
        if let Err(err) = element.set_attribute(NODE_ATTR, &slot.to_string()) {
            tracing::debug!(?err, slot, "node tag rejected");
        }
        NodeId::from_raw(slot)
    }

    /// The element behind `node`, unless it was removed.
    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.slots.borrow().get(node.raw()).cloned()
    }

    /// Interned elements still held.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.slots.borrow().live()
    }

    /// Release `root` and every tagged descendant.
    fn release_subtree(&self, root: &Element) {
        let mut doomed = vec![root.clone()];
        if let Ok(list) = root.query_selector_all(&format!("[{NODE_ATTR}]")) {
            doomed.extend(
                (0..list.length())
                    .filter_map(|i| list.item(i))
                    .filter_map(|n| n.dyn_into::<Element>().ok()),
            );
        }
        let mut slots = self.slots.borrow_mut();
        for el in doomed {
            let Some(slot) = slot_of(&el) else {
                continue;
            };
            if slots.get(slot).is_some_and(|known| same(known, &el)) {
                slots.release(slot);
            }
            let _ = el.remove_attribute(NODE_ATTR);
        }
    }

    /// Focus requested during the last dispatch.
    ///
    /// Moving focus synchronously fires `blur` on the previous element, which
    /// would re-enter the page while it is still dispatching. The host applies
    /// the focus after the dispatch returns.
    pub fn take_pending_focus(&mut self) -> Option<HtmlElement> {
        self.pending_focus
            .take()
            .and_then(|node| self.element(node))
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn collect(&self, list: &web_sys::NodeList) -> Vec<NodeId> {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .map(|el| self.intern(el))
            .collect()
    }
}

impl Dom for WebDom {
    fn body(&self) -> NodeId {
        self.body
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document
            .get_element_by_id(id)
            .map(|el| self.intern(el))
    }

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        let list = self.document.get_elements_by_class_name(class);
        (0..list.length())
            .filter_map(|i| list.item(i))
            .map(|el| self.intern(el))
            .collect()
    }

    fn descendants_by_tag(&self, root: NodeId, tags: &[&str]) -> Vec<NodeId> {
        let Some(root) = self.element(root) else {
            return Vec::new();
        };
        match root.query_selector_all(&tags.join(", ")) {
            Ok(list) => self.collect(&list),
            Err(err) => {
                tracing::debug!(?err, "selector rejected");
                Vec::new()
            }
        }
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.element(node).is_some_and(|el| el.has_attribute(name))
    }

    fn value(&self, node: NodeId) -> String {
        let Some(el) = self.element(node) else {
            return String::new();
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            let _ = el.class_list().remove_1(class);
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.html(node)
            .and_then(|el| el.style().get_property_value(property).ok())
            .filter(|v| !v.is_empty())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.html(node) {
            let _ = el.style().set_property(property, value);
        }
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, UiError> {
        let el = self
            .document
            .create_element(tag)
            .map_err(|err| host_error(&err))?;
        Ok(self.intern(el))
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.element(node) {
            el.set_text_content(Some(text));
        }
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), UiError> {
        let parent_el = self.element(parent).ok_or(UiError::UnknownNode(parent))?;
        let child_el = self.element(child).ok_or(UiError::UnknownNode(child))?;
        parent_el
            .append_child(&child_el)
            .map(drop)
            .map_err(|err| host_error(&err))
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), UiError> {
        let reference_el = self
            .element(reference)
            .ok_or(UiError::UnknownNode(reference))?;
        let node_el = self.element(node).ok_or(UiError::UnknownNode(node))?;
        if reference_el.parent_node().is_none() {
            return Err(UiError::Detached(reference));
        }
        reference_el
            .after_with_node_1(&node_el)
            .map_err(|err| host_error(&err))
    }

    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.element(node)
            .and_then(|el| el.next_element_sibling())
            .map(|el| self.intern(el))
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|el| el.is_connected())
    }

    fn remove(&mut self, node: NodeId) -> bool {
        match self.element(node) {
            Some(el) if el.parent_node().is_some() => {
                el.remove();
                self.release_subtree(&el);
                true
            }
            _ => false,
        }
    }

    fn focus(&mut self, node: NodeId) {
        self.pending_focus = Some(node);
    }
}
