//! Virtual nodes.
//!
//! A [`VNode`] describes one DOM node: a selector (`tag#id.class1.class2`,
//! `None` for text, `!` for comments), an optional key, the DOM-facing
//! [`VNodeData`], and either children or text. Once mounted it also carries
//! the DOM node it owns.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::dom::{DomApi, Listener};

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    /// Array notation that does not describe a node.
    #[error("invalid node: {0}")]
    InvalidNode(String),
}

fn invalid(message: impl Into<String>) -> RenderError {
    RenderError::InvalidNode(message.into())
}

// ── Data ──────────────────────────────────────────────────────────────────

/// Attribute value. `Bool(true)` sets an empty attribute, `Bool(false)`
/// removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Bool(bool),
    Str(String),
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

pub type Handlers<E> = IndexMap<String, Listener<E>>;

/// Handlers shared between a mounted node's DOM listeners and the vnode that
/// currently owns the node. Patching swaps the map contents in place.
pub(crate) type SharedHandlers<E> = Rc<RefCell<Handlers<E>>>;

/// DOM-facing data of an element, one map per module.
pub struct VNodeData<E> {
    pub attrs: IndexMap<String, AttrValue>,
    pub props: IndexMap<String, Value>,
    pub class: IndexMap<String, bool>,
    /// Keys in camelCase, written as `data-kebab-case` attributes.
    pub dataset: IndexMap<String, String>,
    pub style: IndexMap<String, String>,
    pub on: Handlers<E>,
    pub ns: Option<String>,
}

impl<E> Default for VNodeData<E> {
    fn default() -> Self {
        Self {
            attrs: IndexMap::new(),
            props: IndexMap::new(),
            class: IndexMap::new(),
            dataset: IndexMap::new(),
            style: IndexMap::new(),
            on: IndexMap::new(),
            ns: None,
        }
    }
}

impl<E> Clone for VNodeData<E> {
    fn clone(&self) -> Self {
        Self {
            attrs: self.attrs.clone(),
            props: self.props.clone(),
            class: self.class.clone(),
            dataset: self.dataset.clone(),
            style: self.style.clone(),
            on: self.on.clone(),
            ns: self.ns.clone(),
        }
    }
}

impl<E> fmt::Debug for VNodeData<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VNodeData")
            .field("attrs", &self.attrs)
            .field("props", &self.props)
            .field("class", &self.class)
            .field("dataset", &self.dataset)
            .field("style", &self.style)
            .field("on", &self.on.keys().collect::<Vec<_>>())
            .field("ns", &self.ns)
            .finish()
    }
}

// ── Selector ──────────────────────────────────────────────────────────────

/// Parsed `tag#id.class1.class2` selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selector<'a> {
    pub tag: &'a str,
    pub id: Option<&'a str>,
    pub classes: Vec<&'a str>,
}

impl<'a> Selector<'a> {
    pub fn parse(sel: &'a str) -> Self {
        let tag_end = sel.find(|c: char| c == '#' || c == '.').unwrap_or(sel.len());
        let mut rest = &sel[tag_end..];
        let mut id = None;
        if let Some(after) = rest.strip_prefix('#') {
            let end = after.find('.').unwrap_or(after.len());
            id = Some(&after[..end]);
            rest = &after[end..];
        }
        let classes = rest.split('.').filter(|c| !c.is_empty()).collect();
        Self { tag: &sel[..tag_end], id, classes }
    }
}

// ── VNode ─────────────────────────────────────────────────────────────────

pub struct VNode<D: DomApi> {
    pub sel: Option<String>,
    pub key: Option<String>,
    pub data: VNodeData<D::Event>,
    pub children: Vec<VNode<D>>,
    pub text: Option<String>,
    pub(crate) elm: Option<D::Node>,
    pub(crate) listener: Option<SharedHandlers<D::Event>>,
}

impl<D: DomApi> VNode<D> {
    fn with_sel(sel: Option<String>, text: Option<String>) -> Self {
        Self {
            sel,
            key: None,
            data: VNodeData::default(),
            children: Vec::new(),
            text,
            elm: None,
            listener: None,
        }
    }

    /// Element with the given selector and no data.
    pub fn element(sel: impl Into<String>) -> Self {
        Self::with_sel(Some(sel.into()), None)
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        Self::with_sel(None, Some(text.into()))
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::with_sel(Some("!".to_string()), Some(text.into()))
    }

    /// A node with nothing in it, used as the "old" side when creating.
    pub(crate) fn empty() -> Self {
        Self::with_sel(None, None)
    }

    /// Wraps an existing element so that it can be patched.
    pub(crate) fn empty_at(dom: &D, elm: D::Node) -> Self {
        let mut sel = dom.tag_name(&elm);
        if let Some(id) = dom.get_attribute(&elm, "id").filter(|id| !id.is_empty()) {
            sel.push('#');
            sel.push_str(&id);
        }
        if let Some(class) = dom.get_attribute(&elm, "class") {
            for name in class.split_whitespace() {
                sel.push('.');
                sel.push_str(name);
            }
        }
        let mut vnode = Self::element(sel);
        vnode.elm = Some(elm);
        vnode
    }

    /// The DOM node this vnode owns, once mounted.
    pub fn elm(&self) -> Option<&D::Node> {
        self.elm.as_ref()
    }

    /// Tag part of the selector.
    pub fn tag(&self) -> Option<&str> {
        self.sel.as_deref().map(|sel| Selector::parse(sel).tag)
    }

    /// Two vnodes describe the same DOM node when selector and key agree.
    pub fn is_same(&self, other: &Self) -> bool {
        self.sel == other.sel && self.key == other.key
    }

    // ── Array notation ────────────────────────────────────────────────────

    /// Builds a node from `["tag", {data}?, ...children]` or a string.
    ///
    /// Children may be strings and numbers (text nodes), nested node arrays,
    /// or arrays of children which are flattened. `null` and booleans render
    /// nothing. Event handlers cannot be expressed in JSON, so `on` is
    /// ignored.
    ///
    /// ```
    /// use hat_renderer::{memory_dom::MemoryDom, VNode};
    /// use serde_json::json;
    ///
    /// let node = VNode::<MemoryDom>::from_json(&json!(
    ///     ["ul#list", {"class": {"open": true}}, [["li", "a"], ["li", "b"]], null]
    /// ))
    /// .unwrap();
    /// assert_eq!(node.tag(), Some("ul"));
    /// assert_eq!(node.children.len(), 2);
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, RenderError> {
        match value {
            Value::String(text) => Ok(Self::text_node(text.clone())),
            Value::Array(items) => match items.first() {
                Some(Value::String(sel)) => Self::element_from_json(sel, &items[1..]),
                _ => Err(invalid("node array must start with a selector")),
            },
            other => Err(invalid(format!("expected node, found {other}"))),
        }
    }

    /// Converts a list of children in array notation, flattening nested
    /// lists.
    pub fn children_from_json(value: &Value) -> Result<Vec<Self>, RenderError> {
        let mut out = Vec::new();
        push_child(&mut out, value)?;
        Ok(out)
    }

    fn element_from_json(sel: &str, rest: &[Value]) -> Result<Self, RenderError> {
        let mut vnode = Self::element(sel);
        let children = match rest.first() {
            Some(Value::Object(data)) => {
                vnode.apply_json_data(data)?;
                &rest[1..]
            }
            _ => rest,
        };
        for child in children {
            push_child(&mut vnode.children, child)?;
        }
        Ok(vnode)
    }

    fn apply_json_data(&mut self, data: &Map<String, Value>) -> Result<(), RenderError> {
        for (field, value) in data {
            match field.as_str() {
                "key" => self.key = Some(scalar_string(field, value)?),
                "ns" => self.data.ns = Some(scalar_string(field, value)?),
                "attrs" => {
                    for (name, v) in object(field, value)? {
                        let attr = match v {
                            Value::Bool(b) => AttrValue::Bool(*b),
                            other => AttrValue::Str(scalar_string(name, other)?),
                        };
                        self.data.attrs.insert(name.clone(), attr);
                    }
                }
                "props" => {
                    for (name, v) in object(field, value)? {
                        self.data.props.insert(name.clone(), v.clone());
                    }
                }
                "class" => {
                    for (name, v) in object(field, value)? {
                        let on = v
                            .as_bool()
                            .ok_or_else(|| invalid(format!("class {name:?} must be a boolean")))?;
                        self.data.class.insert(name.clone(), on);
                    }
                }
                "dataset" => {
                    for (name, v) in object(field, value)? {
                        self.data.dataset.insert(name.clone(), scalar_string(name, v)?);
                    }
                }
                "style" => {
                    for (name, v) in object(field, value)? {
                        self.data.style.insert(name.clone(), scalar_string(name, v)?);
                    }
                }
                other => log::trace!("ignoring node data field {other:?}"),
            }
        }
        Ok(())
    }
}

fn push_child<D: DomApi>(out: &mut Vec<VNode<D>>, value: &Value) -> Result<(), RenderError> {
    match value {
        Value::Null | Value::Bool(_) => Ok(()),
        Value::String(text) => {
            out.push(VNode::text_node(text.clone()));
            Ok(())
        }
        Value::Number(n) => {
            out.push(VNode::text_node(n.to_string()));
            Ok(())
        }
        Value::Array(items) => match items.first() {
            Some(Value::String(_)) => {
                out.push(VNode::from_json(value)?);
                Ok(())
            }
            _ => items.iter().try_for_each(|item| push_child(out, item)),
        },
        Value::Object(_) => Err(invalid("node data must directly follow the selector")),
    }
}

fn object<'v>(field: &str, value: &'v Value) -> Result<&'v Map<String, Value>, RenderError> {
    value
        .as_object()
        .ok_or_else(|| invalid(format!("{field} must be an object")))
}

fn scalar_string(field: &str, value: &Value) -> Result<String, RenderError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(invalid(format!("{field} must be a string or number, found {other}"))),
    }
}

impl<D: DomApi> fmt::Debug for VNode<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VNode")
            .field("sel", &self.sel)
            .field("key", &self.key)
            .field("data", &self.data)
            .field("children", &self.children)
            .field("text", &self.text)
            .field("elm", &self.elm)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_dom::MemoryDom;
    use serde_json::json;

    type Node = VNode<MemoryDom>;

    #[test]
    fn selector_parts() {
        let s = Selector::parse("div#main.a.b");
        assert_eq!((s.tag, s.id, s.classes), ("div", Some("main"), vec!["a", "b"]));
        let s = Selector::parse("span.x");
        assert_eq!((s.tag, s.id, s.classes), ("span", None, vec!["x"]));
        let s = Selector::parse("p");
        assert_eq!((s.tag, s.id, s.classes.len()), ("p", None, 0));
    }

    #[test]
    fn from_json_reads_data() {
        let node = Node::from_json(&json!([
            "input",
            {
                "key": 3,
                "attrs": {"type": "checkbox", "disabled": false, "tabindex": 1},
                "props": {"checked": true},
                "dataset": {"rowId": "r1"},
                "style": {"color": "red"},
                "on": {"click": null}
            }
        ]))
        .unwrap();
        assert_eq!(node.key.as_deref(), Some("3"));
        assert_eq!(node.data.attrs["type"], AttrValue::from("checkbox"));
        assert_eq!(node.data.attrs["disabled"], AttrValue::Bool(false));
        assert_eq!(node.data.attrs["tabindex"], AttrValue::from("1"));
        assert_eq!(node.data.props["checked"], json!(true));
        assert_eq!(node.data.dataset["rowId"], "r1");
        assert!(node.data.on.is_empty());
    }

    #[test]
    fn children_are_flattened() {
        let node = Node::from_json(&json!(["div", "a", [["b", "x"], 1, [false, "c"]], null])).unwrap();
        let kinds: Vec<_> = node
            .children
            .iter()
            .map(|c| c.sel.clone().or_else(|| c.text.clone()).unwrap_or_default())
            .collect();
        assert_eq!(kinds, vec!["a", "b", "1", "c"]);
        assert_eq!(node.children[1].children[0].text.as_deref(), Some("x"));
    }

    #[test]
    fn malformed_notation_is_rejected() {
        assert!(Node::from_json(&json!(5)).is_err());
        assert!(Node::from_json(&json!([1, 2])).is_err());
        assert!(Node::from_json(&json!(["div", "x", {"a": 1}])).is_err());
        assert!(Node::from_json(&json!(["div", {"class": {"a": "yes"}}])).is_err());
        assert!(Node::from_json(&json!(["div", {"attrs": []}])).is_err());
    }

    #[test]
    fn sameness_uses_selector_and_key() {
        let mut a = Node::element("li");
        let mut b = Node::element("li");
        assert!(a.is_same(&b));
        a.key = Some("1".into());
        assert!(!a.is_same(&b));
        b.key = Some("1".into());
        assert!(a.is_same(&b));
        assert!(!a.is_same(&Node::element("li.x")));
    }
}
