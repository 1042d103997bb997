//! Shared in-memory document model.
//!
//! The locator engine runs in-process against a live document tree that the
//! host (or a test) keeps mutating while queries are in flight. [`Document`]
//! is a cheap-clone shared handle over an arena of nodes; [`Element`] is a
//! lightweight reference into that arena. Handles stay valid after an element
//! is detached — the resolution layer never re-validates liveness, callers
//! can check [`Element::is_attached`] when they care.
//!
//! Synthetic input events dispatched by the action layer are appended to a
//! per-document event log so scripts and tests can observe what happened.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

pub(crate) type NodeId = usize;

/// Mouse button used for a synthetic click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button (context menu).
    Right,
}

/// Keyboard modifier held during a synthetic pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    /// Shift key.
    Shift,
    /// Control on Linux/Windows, Meta on macOS.
    ControlOrMeta,
}

/// A synthetic event dispatched on an element.
///
/// Serialized with a `type` tag discriminator so event logs can be exported
/// as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomEvent {
    /// Pointer click.
    Click {
        /// Button that produced the click.
        button: MouseButton,
        /// Modifiers held during the click.
        modifiers: Vec<Modifier>,
    },
    /// Double click.
    DblClick,
    /// Pointer entered the element.
    MouseOver,
    /// Key went down.
    KeyDown {
        /// Key value (e.g. "Enter", "a").
        key: String,
    },
    /// Key produced a character.
    KeyPress {
        /// Key value.
        key: String,
    },
    /// Key was released.
    KeyUp {
        /// Key value.
        key: String,
    },
    /// Value of an input changed incrementally.
    Input,
    /// Value change was committed.
    Change,
    /// Element received focus.
    Focus,
    /// Element was scrolled into view.
    ScrollIntoView,
}

impl DomEvent {
    /// Lowercase event name, matching the native event type string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Click { .. } => "click",
            Self::DblClick => "dblclick",
            Self::MouseOver => "mouseover",
            Self::KeyDown { .. } => "keydown",
            Self::KeyPress { .. } => "keypress",
            Self::KeyUp { .. } => "keyup",
            Self::Input => "input",
            Self::Change => "change",
            Self::Focus => "focus",
            Self::ScrollIntoView => "scrollintoview",
        }
    }
}

/// One entry of the document event log.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Element the event was dispatched on.
    pub target: Element,
    /// The event itself.
    pub event: DomEvent,
}

#[derive(Debug)]
enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<NodeId>,
    },
    Text(String),
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    data: NodeData,
}

#[derive(Debug, Default)]
struct DomTree {
    nodes: Vec<Node>,
    events: Vec<(NodeId, DomEvent)>,
    focused: Option<NodeId>,
}

impl DomTree {
    fn new_element(&mut self, tag: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent: None,
            data: NodeData::Element {
                tag: tag.to_ascii_lowercase(),
                attrs: Vec::new(),
                children: Vec::new(),
            },
        });
        id
    }

    fn new_text(&mut self, content: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent: None,
            data: NodeData::Text(content.to_string()),
        });
        id
    }

    fn tag_of(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    fn children_of(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id].data {
            NodeData::Element { children, .. } => children,
            NodeData::Text(_) => &[],
        }
    }

    fn attr_of(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            if let NodeData::Element { children, .. } = &mut self.nodes[parent].data {
                children.retain(|&c| c != id);
            }
        }
    }

    fn is_ancestor_of(&self, maybe_ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.nodes[id].parent;
        while let Some(p) = current {
            if p == maybe_ancestor {
                return true;
            }
            current = self.nodes[p].parent;
        }
        false
    }

    /// Depth-first pre-order element descendants, excluding `id` itself.
    fn collect_descendant_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children_of(id) {
            if matches!(self.nodes[child].data, NodeData::Element { .. }) {
                out.push(child);
            }
            self.collect_descendant_elements(child, out);
        }
    }

    fn append_text_content(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].data {
            NodeData::Text(content) => out.push_str(content),
            NodeData::Element { children, .. } => {
                for &child in children {
                    self.append_text_content(child, out);
                }
            }
        }
    }

    /// Text runs under `id` in document order as (parent element, content)
    /// pairs, skipping runs whose parent is `head`, `script` or `style`.
    fn collect_text_runs(&self, id: NodeId, out: &mut Vec<(NodeId, String)>) {
        for &child in self.children_of(id) {
            match &self.nodes[child].data {
                NodeData::Text(content) => {
                    if let Some(parent) = self.nodes[child].parent {
                        let excluded = matches!(
                            self.tag_of(parent),
                            Some("head" | "script" | "style")
                        );
                        if !excluded {
                            out.push((parent, content.clone()));
                        }
                    }
                }
                NodeData::Element { .. } => self.collect_text_runs(child, out),
            }
        }
    }
}

/// Shared handle to a live document tree.
///
/// Clones are shallow; all clones see the same tree. Mutation from another
/// task between polling attempts is the expected mode of operation.
#[derive(Debug, Clone)]
pub struct Document {
    inner: Arc<RwLock<DomTree>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with the `<html><head></head><body></body>`
    /// skeleton already in place.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = DomTree::default();
        let root = tree.new_element("#document");
        let html = tree.new_element("html");
        let head = tree.new_element("head");
        let body = tree.new_element("body");
        tree.nodes[html].parent = Some(root);
        tree.nodes[head].parent = Some(html);
        tree.nodes[body].parent = Some(html);
        if let NodeData::Element { children, .. } = &mut tree.nodes[root].data {
            children.push(html);
        }
        if let NodeData::Element { children, .. } = &mut tree.nodes[html].data {
            children.push(head);
            children.push(body);
        }
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    fn tree(&self) -> RwLockReadGuard<'_, DomTree> {
        self.inner.read().expect("dom lock poisoned")
    }

    fn tree_mut(&self) -> RwLockWriteGuard<'_, DomTree> {
        self.inner.write().expect("dom lock poisoned")
    }

    fn element(&self, id: NodeId) -> Element {
        Element {
            document: self.clone(),
            id,
        }
    }

    pub(crate) fn same_document(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The synthetic `#document` container node. Queries scoped here see
    /// every element, `<html>` included.
    pub(crate) fn root(&self) -> Element {
        self.element(0)
    }

    /// The `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> Element {
        let tree = self.tree();
        let id = tree.children_of(0)[0];
        drop(tree);
        self.element(id)
    }

    /// The `<head>` element, if still attached.
    #[must_use]
    pub fn head(&self) -> Option<Element> {
        self.document_element()
            .children()
            .into_iter()
            .find(|el| el.tag() == "head")
    }

    /// The `<body>` element, if still attached.
    #[must_use]
    pub fn body(&self) -> Option<Element> {
        self.document_element()
            .children()
            .into_iter()
            .find(|el| el.tag() == "body")
    }

    /// Create a detached element. Attach it with [`Element::append_child`].
    #[must_use]
    pub fn create_element(&self, tag: &str) -> Element {
        let id = self.tree_mut().new_element(tag);
        self.element(id)
    }

    /// First attached element with the given `id` attribute, in document
    /// order.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        let tree = self.tree();
        let mut out = Vec::new();
        tree.collect_descendant_elements(0, &mut out);
        let found = out
            .into_iter()
            .find(|&node| tree.attr_of(node, "id") == Some(id));
        drop(tree);
        found.map(|node| self.element(node))
    }

    /// Snapshot of the event log, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<EventRecord> {
        let tree = self.tree();
        let records: Vec<(NodeId, DomEvent)> = tree.events.clone();
        drop(tree);
        records
            .into_iter()
            .map(|(id, event)| EventRecord {
                target: self.element(id),
                event,
            })
            .collect()
    }

    /// Discard the event log.
    pub fn clear_events(&self) {
        self.tree_mut().events.clear();
    }

    /// Element currently holding focus, if any.
    #[must_use]
    pub fn focused(&self) -> Option<Element> {
        let id = self.tree().focused;
        id.map(|id| self.element(id))
    }

    pub(crate) fn dispatch(&self, target: &Element, event: DomEvent) {
        trace!(event = event.name(), node = target.id, "dispatch");
        self.tree_mut().events.push((target.id, event));
    }

    pub(crate) fn set_focus(&self, target: &Element) {
        self.tree_mut().focused = Some(target.id);
        self.dispatch(target, DomEvent::Focus);
    }

    /// Text runs under `scope` in document order, paired with their parent
    /// element. Runs inside `head`, `script` and `style` are skipped.
    pub(crate) fn text_runs_under(&self, scope: &Element) -> Vec<(Element, String)> {
        let tree = self.tree();
        let mut out = Vec::new();
        tree.collect_text_runs(scope.id, &mut out);
        drop(tree);
        out.into_iter()
            .map(|(id, content)| (self.element(id), content))
            .collect()
    }
}

/// Lightweight reference to an element node of a [`Document`].
///
/// Cloning is cheap; equality means "same node of the same document".
#[derive(Clone)]
pub struct Element {
    document: Document,
    id: NodeId,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.document.same_document(&other.document)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag())
            .field("node", &self.id)
            .finish()
    }
}

impl Element {
    /// The owning document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self) -> String {
        self.document
            .tree()
            .tag_of(self.id)
            .unwrap_or_default()
            .to_string()
    }

    /// Attribute value, if set.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        self.document
            .tree()
            .attr_of(self.id, &name.to_ascii_lowercase())
            .map(str::to_string)
    }

    /// Whether the attribute is present (possibly empty).
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.document
            .tree()
            .attr_of(self.id, &name.to_ascii_lowercase())
            .is_some()
    }

    /// Set (or replace) an attribute.
    pub fn set_attribute(&self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let mut tree = self.document.tree_mut();
        if let NodeData::Element { attrs, .. } = &mut tree.nodes[self.id].data {
            if let Some(entry) = attrs.iter_mut().find(|(n, _)| *n == name) {
                entry.1 = value.to_string();
            } else {
                attrs.push((name, value.to_string()));
            }
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attribute(&self, name: &str) {
        let name = name.to_ascii_lowercase();
        let mut tree = self.document.tree_mut();
        if let NodeData::Element { attrs, .. } = &mut tree.nodes[self.id].data {
            attrs.retain(|(n, _)| *n != name);
        }
    }

    /// Append `child` as the last child, detaching it from any previous
    /// parent. Appending one of our own ancestors is refused.
    pub fn append_child(&self, child: &Element) {
        let mut tree = self.document.tree_mut();
        if child.id == self.id || tree.is_ancestor_of(child.id, self.id) {
            drop(tree);
            warn!(node = child.id, "refusing to append ancestor as child");
            return;
        }
        tree.detach(child.id);
        tree.nodes[child.id].parent = Some(self.id);
        if let NodeData::Element { children, .. } = &mut tree.nodes[self.id].data {
            children.push(child.id);
        }
    }

    /// Append a text run as the last child.
    pub fn append_text(&self, content: &str) {
        let mut tree = self.document.tree_mut();
        let text = tree.new_text(content);
        tree.nodes[text].parent = Some(self.id);
        if let NodeData::Element { children, .. } = &mut tree.nodes[self.id].data {
            children.push(text);
        }
    }

    /// Replace all children with a single text run.
    pub fn set_text(&self, content: &str) {
        let mut tree = self.document.tree_mut();
        let old: Vec<NodeId> = tree.children_of(self.id).to_vec();
        for child in old {
            tree.nodes[child].parent = None;
        }
        let text = tree.new_text(content);
        tree.nodes[text].parent = Some(self.id);
        if let NodeData::Element { children, .. } = &mut tree.nodes[self.id].data {
            children.clear();
            children.push(text);
        }
    }

    /// Detach this element (and its subtree) from its parent.
    pub fn remove(&self) {
        self.document.tree_mut().detach(self.id);
    }

    /// Parent element, if attached to one.
    #[must_use]
    pub fn parent(&self) -> Option<Element> {
        let parent = self.document.tree().nodes[self.id].parent;
        parent.map(|id| self.document.element(id))
    }

    /// Child elements in order (text runs are not included).
    #[must_use]
    pub fn children(&self) -> Vec<Element> {
        let tree = self.document.tree();
        let ids: Vec<NodeId> = tree
            .children_of(self.id)
            .iter()
            .copied()
            .filter(|&c| tree.tag_of(c).is_some())
            .collect();
        drop(tree);
        ids.into_iter().map(|id| self.document.element(id)).collect()
    }

    /// All element descendants in document order (depth-first pre-order),
    /// excluding this element itself.
    #[must_use]
    pub fn descendants(&self) -> Vec<Element> {
        let tree = self.document.tree();
        let mut ids = Vec::new();
        tree.collect_descendant_elements(self.id, &mut ids);
        drop(tree);
        ids.into_iter().map(|id| self.document.element(id)).collect()
    }

    /// Concatenated text of all descendant text runs, in document order.
    #[must_use]
    pub fn text_content(&self) -> String {
        let tree = self.document.tree();
        let mut out = String::new();
        tree.append_text_content(self.id, &mut out);
        out
    }

    /// Nearest ancestor (self included) with the given tag name.
    #[must_use]
    pub fn closest(&self, tag: &str) -> Option<Element> {
        let tag = tag.to_ascii_lowercase();
        let tree = self.document.tree();
        let mut current = Some(self.id);
        while let Some(id) = current {
            if tree.tag_of(id) == Some(tag.as_str()) {
                drop(tree);
                return Some(self.document.element(id));
            }
            current = tree.nodes[id].parent;
        }
        None
    }

    /// Ancestor elements, nearest first, up to and including `<html>`.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Element> {
        let tree = self.document.tree();
        let mut out = Vec::new();
        let mut current = tree.nodes[self.id].parent;
        while let Some(id) = current {
            if tree.tag_of(id).is_some_and(|t| t != "#document") {
                out.push(id);
            }
            current = tree.nodes[id].parent;
        }
        drop(tree);
        out.into_iter().map(|id| self.document.element(id)).collect()
    }

    /// Whether this element is still reachable from the document root.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        let tree = self.document.tree();
        let mut current = Some(self.id);
        while let Some(id) = current {
            if id == 0 {
                return true;
            }
            current = tree.nodes[id].parent;
        }
        false
    }
}
