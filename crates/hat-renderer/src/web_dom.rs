//! [`DomApi`] on a browser document through `web-sys`.
//!
//! DOM calls that fail are programming errors and throw into JavaScript.

use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue, UnwrapThrowExt};
use web_sys::{Document, Element, Event, HtmlElement, Node, SvgElement};

use crate::dom::{DomApi, Listener};

struct Registered {
    node: Node,
    name: String,
    closure: Closure<dyn FnMut(Event)>,
}

pub struct WebDom {
    document: Document,
    listeners: Vec<Registered>,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document, listeners: Vec::new() }
    }

    /// The document of the global `window`.
    pub fn from_window() -> Self {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .expect_throw("no document");
        Self::new(document)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn position(&self, node: &Node, name: &str) -> Option<usize> {
        self.listeners.iter().position(|r| &r.node == node && r.name == name)
    }
}

fn element(node: &Node) -> &Element {
    node.dyn_ref::<Element>().expect_throw("not an element")
}

fn style(node: &Node) -> Option<web_sys::CssStyleDeclaration> {
    if let Some(html) = node.dyn_ref::<HtmlElement>() {
        return Some(html.style());
    }
    node.dyn_ref::<SvgElement>().map(SvgElement::style)
}

impl DomApi for WebDom {
    type Node = Node;
    type Event = Event;

    fn create_element(&mut self, tag: &str, ns: Option<&str>) -> Node {
        let element = match ns {
            Some(ns) => self.document.create_element_ns(Some(ns), tag),
            None => self.document.create_element(tag),
        };
        element.unwrap_throw().into()
    }

    fn create_text_node(&mut self, text: &str) -> Node {
        self.document.create_text_node(text).into()
    }

    fn create_comment(&mut self, text: &str) -> Node {
        self.document.create_comment(text).into()
    }

    fn insert_before(&mut self, parent: &Node, node: &Node, reference: Option<&Node>) {
        parent.insert_before(node, reference).unwrap_throw();
    }

    fn remove_child(&mut self, parent: &Node, child: &Node) {
        if child.parent_node().as_ref() == Some(parent) {
            parent.remove_child(child).unwrap_throw();
        }
    }

    fn append_child(&mut self, parent: &Node, child: &Node) {
        parent.append_child(child).unwrap_throw();
    }

    fn parent_node(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn next_sibling(&self, node: &Node) -> Option<Node> {
        node.next_sibling()
    }

    fn tag_name(&self, node: &Node) -> String {
        node.dyn_ref::<Element>().map(|e| e.tag_name().to_lowercase()).unwrap_or_default()
    }

    fn set_text_content(&mut self, node: &Node, text: &str) {
        node.set_text_content(Some(text));
    }

    fn get_attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) {
        element(node).set_attribute(name, value).unwrap_throw();
    }

    fn remove_attribute(&mut self, node: &Node, name: &str) {
        element(node).remove_attribute(name).unwrap_throw();
    }

    fn add_class(&mut self, node: &Node, name: &str) {
        element(node).class_list().add_1(name).unwrap_throw();
    }

    fn remove_class(&mut self, node: &Node, name: &str) {
        element(node).class_list().remove_1(name).unwrap_throw();
    }

    fn set_style(&mut self, node: &Node, name: &str, value: &str) {
        if let Some(style) = style(node) {
            style.set_property(name, value).unwrap_throw();
        }
    }

    fn remove_style(&mut self, node: &Node, name: &str) {
        if let Some(style) = style(node) {
            style.remove_property(name).unwrap_throw();
        }
    }

    fn get_property(&self, node: &Node, name: &str) -> Option<Value> {
        let value = js_sys::Reflect::get(node, &JsValue::from_str(name)).ok()?;
        serde_wasm_bindgen::from_value(value).ok()
    }

    fn set_property(&mut self, node: &Node, name: &str, value: &Value) {
        let value = serde_wasm_bindgen::to_value(value).unwrap_throw();
        js_sys::Reflect::set(node, &JsValue::from_str(name), &value).unwrap_throw();
    }

    fn remove_property(&mut self, node: &Node, name: &str) {
        js_sys::Reflect::set(node, &JsValue::from_str(name), &JsValue::UNDEFINED).unwrap_throw();
    }

    fn add_listener(&mut self, node: &Node, name: &str, listener: Listener<Event>) {
        self.remove_listener(node, name);
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| listener(&event));
        node.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .unwrap_throw();
        self.listeners.push(Registered { node: node.clone(), name: name.to_string(), closure });
    }

    fn remove_listener(&mut self, node: &Node, name: &str) {
        let Some(index) = self.position(node, name) else {
            return;
        };
        let registered = self.listeners.swap_remove(index);
        node.remove_event_listener_with_callback(name, registered.closure.as_ref().unchecked_ref())
            .unwrap_throw();
    }
}
