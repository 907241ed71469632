#![forbid(unsafe_code)]

//! Document abstraction.
//!
//! Every component in this crate manipulates the page through the [`Dom`]
//! trait, never through a concrete browser binding. Two implementations exist:
//!
//! - [`MemoryDom`]: an arena-backed document used by tests, session replay
//!   and any native host.
//! - `WebDom` in `classroom-ui-web`: a thin mapping onto `web-sys` elements.
//!
//! Nodes are addressed by [`NodeId`]. Ids are never reused, so a handle to a
//! removed node stays safely comparable and simply reports
//! [`Dom::is_connected`] as `false`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::UiError;

const FNV64_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV64_PRIME: u64 = 0x100000001b3;

/// Opaque handle to a document element.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Wrap a raw index. Hosts use this to rebuild ids received over a bridge.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index for bridge transport.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The document operations the page behavior needs.
///
/// Queries return nodes in document order. Mutating an unknown or detached
/// node is a silent no-op unless the method returns a `Result`, matching how a
/// browser treats stale element references.
pub trait Dom {
    /// The `<body>` element.
    fn body(&self) -> NodeId;

    /// Look up an element by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// All attached elements carrying `class`.
    fn elements_by_class(&self, class: &str) -> Vec<NodeId>;

    /// All descendants of `root` whose tag is one of `tags` (lowercase).
    fn descendants_by_tag(&self, root: NodeId, tags: &[&str]) -> Vec<NodeId>;

    fn has_attribute(&self, node: NodeId, name: &str) -> bool;

    /// Current form-control value; empty for non-controls.
    fn value(&self, node: NodeId) -> String;

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    /// Inline style property, if set.
    fn style(&self, node: NodeId, property: &str) -> Option<String>;
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Result<NodeId, UiError>;

    /// Replace the text content of `node`.
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Append `child` as the last child of `parent`, detaching it first.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), UiError>;

    /// Insert `node` directly after `reference` under the same parent.
    fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), UiError>;

    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Whether `node` is currently part of the document tree.
    fn is_connected(&self, node: NodeId) -> bool;

    /// Detach `node` from its parent. Returns `false` if it had none.
    fn remove(&mut self, node: NodeId) -> bool;

    /// Move input focus to `node`.
    fn focus(&mut self, node: NodeId);
}

/// Declarative element description for mounting into a [`MemoryDom`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSpec {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    value: String,
    text: String,
    children: Vec<ElementSpec>,
}

impl ElementSpec {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_owned());
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Shorthand for a boolean `required` attribute.
    #[must_use]
    pub fn required(self) -> Self {
        self.attr("required", "")
    }

    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_owned();
        self
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_owned();
        self
    }

    #[must_use]
    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Default)]
struct MemNode {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    value: String,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed in-memory document.
///
/// Starts as `<html><body></body></html>`. Removed nodes stay in the arena
/// with no parent.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<MemNode>,
    root: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            focused: None,
        };
        let root = dom.alloc("html");
        let body = dom.alloc("body");
        dom.link(root, body);
        dom.root = root;
        dom.body = body;
        dom
    }

    /// Build `spec` and append it under `parent`.
    pub fn mount(&mut self, parent: NodeId, spec: ElementSpec) -> Result<NodeId, UiError> {
        let node = self.build(spec);
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Mount `spec` directly under `<body>`.
    pub fn mount_in_body(&mut self, spec: ElementSpec) -> NodeId {
        let node = self.build(spec);
        let body = self.body;
        self.link(body, node);
        node
    }

    /// Simulate the user editing a form control.
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(n) = self.get_mut(node) {
            n.value = value.to_owned();
        }
    }

    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(|n| n.text.as_str())
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(|n| n.tag.as_str())
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map_or(&[], |n| n.children.as_slice())
    }

    #[must_use]
    pub const fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Serialize the subtree rooted at `node` as HTML-like markup.
    ///
    /// Attributes are emitted in a stable order: `id`, other attributes
    /// sorted by name, `class`, `style`, `value`.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// FNV-1a digest of the whole document plus focus.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let markup = self.outer_html(self.root);
        let mut hash = fnv1a64_extend(FNV64_OFFSET_BASIS, markup.as_bytes());
        let focus = self.focused.map_or(u32::MAX, NodeId::raw);
        hash = fnv1a64_extend(hash, &focus.to_le_bytes());
        hash
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.get(node) else {
            return;
        };
        out.push('<');
        out.push_str(&n.tag);
        if let Some(id) = n.attrs.get("id") {
            out.push_str(&format!(" id=\"{id}\""));
        }
        for (name, value) in n.attrs.iter().filter(|(name, _)| name.as_str() != "id") {
            if value.is_empty() {
                out.push_str(&format!(" {name}"));
            } else {
                out.push_str(&format!(" {name}=\"{value}\""));
            }
        }
        if !n.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", n.classes.join(" ")));
        }
        if !n.styles.is_empty() {
            let style = n
                .styles
                .iter()
                .map(|(k, v)| format!("{k}: {v};"))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!(" style=\"{style}\""));
        }
        if !n.value.is_empty() {
            out.push_str(&format!(" value=\"{}\"", n.value));
        }
        out.push('>');
        out.push_str(&n.text);
        for &child in &n.children {
            self.write_html(child, out);
        }
        out.push_str("</");
        out.push_str(&n.tag);
        out.push('>');
    }

    fn build(&mut self, spec: ElementSpec) -> NodeId {
        let node = self.alloc(&spec.tag);
        if let Some(n) = self.get_mut(node) {
            if let Some(id) = spec.id {
                n.attrs.insert("id".to_owned(), id);
            }
            for (name, value) in spec.attrs {
                n.attrs.insert(name, value);
            }
            n.classes = spec.classes;
            n.value = spec.value;
            n.text = spec.text;
        }
        for child in spec.children {
            let child = self.build(child);
            self.link(node, child);
        }
        node
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(MemNode {
            tag: tag.to_ascii_lowercase(),
            ..MemNode::default()
        });
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.unlink(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn unlink(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.get(node).and_then(|n| n.parent) else {
            return false;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = self.get_mut(node) {
            n.parent = None;
        }
        true
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn walk(&self, root: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children(root) {
            out.push(child);
            self.walk(child, out);
        }
    }

    fn get(&self, node: NodeId) -> Option<&MemNode> {
        self.nodes.get(node.0 as usize)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut MemNode> {
        self.nodes.get_mut(node.0 as usize)
    }
}

impl Dom for MemoryDom {
    fn body(&self) -> NodeId {
        self.body
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut all = Vec::new();
        self.walk(self.root, &mut all);
        all.into_iter().find(|&node| {
            self.get(node)
                .and_then(|n| n.attrs.get("id"))
                .is_some_and(|v| v == id)
        })
    }

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.walk(self.root, &mut all);
        all.retain(|&node| self.has_class(node, class));
        all
    }

    fn descendants_by_tag(&self, root: NodeId, tags: &[&str]) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.walk(root, &mut all);
        all.retain(|&node| {
            self.get(node)
                .is_some_and(|n| tags.iter().any(|t| n.tag == *t))
        });
        all
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get(node).is_some_and(|n| n.attrs.contains_key(name))
    }

    fn value(&self, node: NodeId) -> String {
        self.get(node).map(|n| n.value.clone()).unwrap_or_default()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.get_mut(node)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_owned());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.get_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.get(node).and_then(|n| n.styles.get(property).cloned())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(n) = self.get_mut(node) {
            n.styles.insert(property.to_owned(), value.to_owned());
        }
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, UiError> {
        Ok(self.alloc(tag))
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.get_mut(node) {
            n.text = text.to_owned();
        }
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), UiError> {
        if self.get(parent).is_none() {
            return Err(UiError::UnknownNode(parent));
        }
        if self.get(child).is_none() {
            return Err(UiError::UnknownNode(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(UiError::Detached(child));
        }
        self.link(parent, child);
        Ok(())
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), UiError> {
        if self.get(node).is_none() {
            return Err(UiError::UnknownNode(node));
        }
        let parent = match self.get(reference) {
            None => return Err(UiError::UnknownNode(reference)),
            Some(r) => r.parent.ok_or(UiError::Detached(reference))?,
        };
        if self.is_ancestor_or_self(node, parent) {
            return Err(UiError::Detached(node));
        }
        self.unlink(node);
        let Some(p) = self.get_mut(parent) else {
            return Err(UiError::UnknownNode(parent));
        };
        let at = p
            .children
            .iter()
            .position(|&c| c == reference)
            .map_or(p.children.len(), |i| i + 1);
        p.children.insert(at, node);
        if let Some(n) = self.get_mut(node) {
            n.parent = Some(parent);
        }
        Ok(())
    }

    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let at = siblings.iter().position(|&c| c == node)?;
        siblings.get(at + 1).copied()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.get(node).is_some() && self.is_ancestor_or_self(self.root, node)
    }

    fn remove(&mut self, node: NodeId) -> bool {
        if self.focused.is_some_and(|f| self.is_ancestor_or_self(node, f)) {
            self.focused = None;
        }
        self.unlink(node)
    }

    fn focus(&mut self, node: NodeId) {
        if self.is_connected(node) {
            self.focused = Some(node);
        }
    }
}

#[must_use]
fn fnv1a64_extend(mut hash: u64, bytes: &[u8]) -> u64 {
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV64_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> (MemoryDom, NodeId, NodeId, NodeId) {
        let mut dom = MemoryDom::new();
        let form = dom.mount_in_body(
            ElementSpec::new("form")
                .id("f")
                .child(ElementSpec::new("input").id("a").required())
                .child(ElementSpec::new("textarea").id("b")),
        );
        let a = dom.element_by_id("a").unwrap();
        let b = dom.element_by_id("b").unwrap();
        (dom, form, a, b)
    }

    #[test]
    fn queries_follow_document_order() {
        let (dom, form, a, b) = sample();
        assert_eq!(dom.descendants_by_tag(form, &["input", "textarea"]), vec![a, b]);
        assert_eq!(dom.descendants_by_tag(dom.body(), &["form"]), vec![form]);
        assert!(dom.has_attribute(a, "required"));
        assert!(!dom.has_attribute(b, "required"));
    }

    #[test]
    fn insert_after_places_node_as_next_sibling() {
        let (mut dom, _form, a, b) = sample();
        let note = dom.create_element("div").unwrap();
        dom.insert_after(a, note).unwrap();
        assert_eq!(dom.next_element_sibling(a), Some(note));
        assert_eq!(dom.next_element_sibling(note), Some(b));
    }

    #[test]
    fn remove_is_reported_once() {
        let (mut dom, _form, a, _b) = sample();
        assert!(dom.is_connected(a));
        assert!(dom.remove(a));
        assert!(!dom.is_connected(a));
        assert!(!dom.remove(a));
    }

    #[test]
    fn detached_subtree_is_not_connected() {
        let (mut dom, form, a, _b) = sample();
        dom.remove(form);
        assert!(!dom.is_connected(a));
        assert!(dom.elements_by_class("x").is_empty());
    }

    #[test]
    fn append_child_rejects_cycles_and_unknown_nodes() {
        let (mut dom, form, a, _b) = sample();
        assert_eq!(dom.append_child(a, form), Err(UiError::Detached(form)));
        let ghost = NodeId::from_raw(999);
        assert_eq!(dom.append_child(ghost, a), Err(UiError::UnknownNode(ghost)));
    }

    #[test]
    fn class_list_has_no_duplicates() {
        let (mut dom, form, _a, _b) = sample();
        dom.add_class(form, "active");
        dom.add_class(form, "active");
        assert_eq!(dom.outer_html(form).matches("active").count(), 1);
        dom.remove_class(form, "active");
        assert!(!dom.has_class(form, "active"));
    }

    #[test]
    fn outer_html_is_stable() {
        let mut dom = MemoryDom::new();
        let div = dom.mount_in_body(ElementSpec::new("div").id("x").class("message").text("hi"));
        dom.set_style(div, "opacity", "0");
        assert_eq!(
            dom.outer_html(div),
            "<div id=\"x\" class=\"message\" style=\"opacity: 0;\">hi</div>"
        );
    }

    #[test]
    fn checksum_tracks_mutations_and_focus() {
        let (mut dom, _form, a, _b) = sample();
        let base = dom.checksum();
        assert_eq!(base, dom.clone().checksum());
        dom.focus(a);
        let focused = dom.checksum();
        assert_ne!(base, focused);
        dom.set_value(a, "x");
        assert_ne!(focused, dom.checksum());
    }
}
