//! Host DOM abstraction.
//!
//! The reconciler never talks to a document directly; everything goes through
//! a [`DomApi`] implementation. [`MemoryDom`](crate::memory_dom::MemoryDom)
//! keeps the tree in process, `WebDom` (feature `web`) drives a browser.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// Event callback registered on a node.
pub type Listener<E> = Rc<dyn Fn(&E)>;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Operations the reconciler needs from a document.
///
/// Node handles are cheap to clone and compare equal when they refer to the
/// same node.
pub trait DomApi {
    type Node: Clone + PartialEq + fmt::Debug;
    type Event: 'static;

    fn create_element(&mut self, tag: &str, ns: Option<&str>) -> Self::Node;
    fn create_text_node(&mut self, text: &str) -> Self::Node;
    fn create_comment(&mut self, text: &str) -> Self::Node;

    /// Inserts `node` before `reference`, or appends it when `reference` is
    /// `None`. A node that is already attached somewhere is moved.
    fn insert_before(&mut self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>);
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
    fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    /// Lowercase tag name, empty for text and comment nodes.
    fn tag_name(&self, node: &Self::Node) -> String;
    fn set_text_content(&mut self, node: &Self::Node, text: &str);

    fn get_attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    fn add_class(&mut self, node: &Self::Node, name: &str);
    fn remove_class(&mut self, node: &Self::Node, name: &str);

    fn set_style(&mut self, node: &Self::Node, name: &str, value: &str);
    fn remove_style(&mut self, node: &Self::Node, name: &str);

    fn get_property(&self, node: &Self::Node, name: &str) -> Option<Value>;
    fn set_property(&mut self, node: &Self::Node, name: &str, value: &Value);
    fn remove_property(&mut self, node: &Self::Node, name: &str);

    /// Registers the single listener for `name` on `node`, replacing any
    /// previous one.
    fn add_listener(&mut self, node: &Self::Node, name: &str, listener: Listener<Self::Event>);
    fn remove_listener(&mut self, node: &Self::Node, name: &str);
}
