//! In-process [`DomApi`] implementation.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Every mutating call
//! is counted in [`OpCounts`], which is how tests check that a render touched
//! only what changed.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::dom::{DomApi, Listener};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Event delivered by [`MemoryDom::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEvent {
    pub name: String,
    pub target: NodeId,
    pub detail: Value,
}

/// Number of mutating DOM calls, by kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpCounts {
    pub created: usize,
    pub inserted: usize,
    pub removed: usize,
    pub text: usize,
    pub attrs: usize,
    pub classes: usize,
    pub styles: usize,
    pub props: usize,
    pub listeners: usize,
}

impl OpCounts {
    pub fn total(&self) -> usize {
        self.created
            + self.inserted
            + self.removed
            + self.text
            + self.attrs
            + self.classes
            + self.styles
            + self.props
            + self.listeners
    }
}

enum Kind {
    Element {
        tag: String,
        ns: Option<String>,
        attrs: IndexMap<String, String>,
        classes: IndexSet<String>,
        style: IndexMap<String, String>,
        props: IndexMap<String, Value>,
        listeners: IndexMap<String, Listener<MemoryEvent>>,
    },
    Text(String),
    Comment(String),
}

struct Node {
    kind: Kind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Default)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    ops: OpCounts,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> OpCounts {
        self.ops
    }

    pub fn reset_ops(&mut self) {
        self.ops = OpCounts::default();
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            Kind::Text(text) | Kind::Comment(text) => Some(text.as_str()),
            Kind::Element { .. } => None,
        }
    }

    pub fn namespace(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            Kind::Element { ns, .. } => ns.as_deref(),
            _ => None,
        }
    }

    pub fn style(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            Kind::Element { style, .. } => style.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn has_class(&self, node: NodeId, name: &str) -> bool {
        matches!(&self.nodes[node.0].kind, Kind::Element { classes, .. } if classes.contains(name))
    }

    pub fn has_listener(&self, node: NodeId, name: &str) -> bool {
        matches!(&self.nodes[node.0].kind, Kind::Element { listeners, .. } if listeners.contains_key(name))
    }

    /// Calls the listener registered for `name` on `target`, if any. Returns
    /// whether one was called.
    pub fn dispatch(&self, target: NodeId, name: &str, detail: Value) -> bool {
        let listener = match &self.nodes[target.0].kind {
            Kind::Element { listeners, .. } => listeners.get(name).cloned(),
            _ => None,
        };
        match listener {
            Some(listener) => {
                listener(&MemoryEvent { name: name.to_string(), target, detail });
                true
            }
            None => false,
        }
    }

    /// Serializes `node` and its subtree. Attributes come first in insertion
    /// order, then `class` and `style`. Properties and listeners are not
    /// shown.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            Kind::Text(text) => out.push_str(&escape(text)),
            Kind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Kind::Element { tag, attrs, classes, style, .. } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push_str(&format!(" {name}=\"{}\"", escape(value)));
                }
                if !classes.is_empty() {
                    let joined: Vec<&str> = classes.iter().map(String::as_str).collect();
                    out.push_str(&format!(" class=\"{}\"", joined.join(" ")));
                }
                if !style.is_empty() {
                    let decls: Vec<String> = style.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                    out.push_str(&format!(" style=\"{}\"", escape(&decls.join("; "))));
                }
                out.push('>');
                for child in &self.nodes[node.0].children {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn alloc(&mut self, kind: Kind) -> NodeId {
        self.nodes.push(Node { kind, parent: None, children: Vec::new() });
        NodeId(self.nodes.len() - 1)
    }

    fn push(&mut self, kind: Kind) -> NodeId {
        self.ops.created += 1;
        self.alloc(kind)
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<ElementMut<'_>> {
        match &mut self.nodes[node.0].kind {
            Kind::Element { attrs, classes, style, props, listeners, .. } => {
                Some(ElementMut { attrs, classes, style, props, listeners })
            }
            _ => None,
        }
    }
}

struct ElementMut<'a> {
    attrs: &'a mut IndexMap<String, String>,
    classes: &'a mut IndexSet<String>,
    style: &'a mut IndexMap<String, String>,
    props: &'a mut IndexMap<String, Value>,
    listeners: &'a mut IndexMap<String, Listener<MemoryEvent>>,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

impl DomApi for MemoryDom {
    type Node = NodeId;
    type Event = MemoryEvent;

    fn create_element(&mut self, tag: &str, ns: Option<&str>) -> NodeId {
        self.push(Kind::Element {
            tag: tag.to_string(),
            ns: ns.map(str::to_string),
            attrs: IndexMap::new(),
            classes: IndexSet::new(),
            style: IndexMap::new(),
            props: IndexMap::new(),
            listeners: IndexMap::new(),
        })
    }

    fn create_text_node(&mut self, text: &str) -> NodeId {
        self.push(Kind::Text(text.to_string()))
    }

    fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Kind::Comment(text.to_string()))
    }

    fn insert_before(&mut self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) {
        self.ops.inserted += 1;
        self.detach(*node);
        let children = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|r| children.iter().position(|child| child == r))
            .unwrap_or(children.len());
        children.insert(index, *node);
        self.nodes[node.0].parent = Some(*parent);
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
        if self.nodes[child.0].parent == Some(*parent) {
            self.ops.removed += 1;
            self.detach(*child);
        }
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.insert_before(parent, child, None);
    }

    fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let index = siblings.iter().position(|child| child == node)?;
        siblings.get(index + 1).copied()
    }

    fn tag_name(&self, node: &NodeId) -> String {
        match &self.nodes[node.0].kind {
            Kind::Element { tag, .. } => tag.to_lowercase(),
            _ => String::new(),
        }
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) {
        self.ops.text += 1;
        if let Kind::Text(data) | Kind::Comment(data) = &mut self.nodes[node.0].kind {
            *data = text.to_string();
            return;
        }
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            let child = self.alloc(Kind::Text(text.to_string()));
            self.nodes[node.0].children.push(child);
            self.nodes[child.0].parent = Some(*node);
        }
    }

    fn get_attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        match &self.nodes[node.0].kind {
            Kind::Element { classes, .. } if name == "class" => {
                (!classes.is_empty()).then(|| classes.iter().cloned().collect::<Vec<_>>().join(" "))
            }
            Kind::Element { attrs, .. } => attrs.get(name).cloned(),
            _ => None,
        }
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        self.ops.attrs += 1;
        if let Some(el) = self.element_mut(*node) {
            el.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        self.ops.attrs += 1;
        if let Some(el) = self.element_mut(*node) {
            el.attrs.shift_remove(name);
        }
    }

    fn add_class(&mut self, node: &NodeId, name: &str) {
        self.ops.classes += 1;
        if let Some(el) = self.element_mut(*node) {
            el.classes.insert(name.to_string());
        }
    }

    fn remove_class(&mut self, node: &NodeId, name: &str) {
        self.ops.classes += 1;
        if let Some(el) = self.element_mut(*node) {
            el.classes.shift_remove(name);
        }
    }

    fn set_style(&mut self, node: &NodeId, name: &str, value: &str) {
        self.ops.styles += 1;
        if let Some(el) = self.element_mut(*node) {
            el.style.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_style(&mut self, node: &NodeId, name: &str) {
        self.ops.styles += 1;
        if let Some(el) = self.element_mut(*node) {
            el.style.shift_remove(name);
        }
    }

    fn get_property(&self, node: &NodeId, name: &str) -> Option<Value> {
        match &self.nodes[node.0].kind {
            Kind::Element { props, .. } => props.get(name).cloned(),
            _ => None,
        }
    }

    fn set_property(&mut self, node: &NodeId, name: &str, value: &Value) {
        self.ops.props += 1;
        if let Some(el) = self.element_mut(*node) {
            el.props.insert(name.to_string(), value.clone());
        }
    }

    fn remove_property(&mut self, node: &NodeId, name: &str) {
        self.ops.props += 1;
        if let Some(el) = self.element_mut(*node) {
            el.props.shift_remove(name);
        }
    }

    fn add_listener(&mut self, node: &NodeId, name: &str, listener: Listener<MemoryEvent>) {
        self.ops.listeners += 1;
        if let Some(el) = self.element_mut(*node) {
            el.listeners.insert(name.to_string(), listener);
        }
    }

    fn remove_listener(&mut self, node: &NodeId, name: &str) {
        self.ops.listeners += 1;
        if let Some(el) = self.element_mut(*node) {
            el.listeners.shift_remove(name);
        }
    }
}
