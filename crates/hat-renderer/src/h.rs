//! Builder for [`VNode`] trees.
//!
//! ```
//! use hat_renderer::h::{h, text};
//! use hat_renderer::memory_dom::MemoryDom;
//! use hat_renderer::VNode;
//!
//! let node: VNode<MemoryDom> = h("ul.items")
//!     .attr("role", "list")
//!     .children((0..3).map(|i| h("li").key(i).child(text(format!("item {i}")))));
//! assert_eq!(node.children.len(), 3);
//! assert_eq!(node.children[2].key.as_deref(), Some("2"));
//! ```

use std::rc::Rc;

use serde_json::Value;

use crate::dom::DomApi;
use crate::vnode::{AttrValue, VNode};

/// Starts an element with the given selector.
pub fn h<D: DomApi>(sel: impl Into<String>) -> VNode<D> {
    VNode::element(sel)
}

/// A text node.
pub fn text<D: DomApi>(text: impl Into<String>) -> VNode<D> {
    VNode::text_node(text)
}

/// A comment node.
pub fn comment<D: DomApi>(text: impl Into<String>) -> VNode<D> {
    VNode::comment(text)
}

impl<D: DomApi> VNode<D> {
    pub fn key(mut self, key: impl ToString) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.data.attrs.insert(name.into(), value.into());
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.props.insert(name.into(), value.into());
        self
    }

    pub fn class(mut self, name: impl Into<String>, on: bool) -> Self {
        self.data.class.insert(name.into(), on);
        self
    }

    pub fn dataset(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.dataset.insert(name.into(), value.into());
        self
    }

    pub fn style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.style.insert(name.into(), value.into());
        self
    }

    pub fn ns(mut self, ns: impl Into<String>) -> Self {
        self.data.ns = Some(ns.into());
        self
    }

    /// Sets the handler for event `name`.
    pub fn on(mut self, name: impl Into<String>, handler: impl Fn(&D::Event) + 'static) -> Self {
        self.data.on.insert(name.into(), Rc::new(handler));
        self
    }

    pub fn child(mut self, child: VNode<D>) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = VNode<D>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Sets the text content. An element has either text or children.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}
