//! Reconciliation of vnode trees against the DOM.
//!
//! [`Patcher::patch`] compares an old, mounted tree with a new one. Nodes with
//! the same selector and key are patched in place: every module updates its
//! facet, then children are reconciled with a four-pointer walk over both
//! child lists that matches the ends first and falls back to a key lookup for
//! the middle. Anything else is created from scratch and replaces the old
//! subtree.

use std::collections::HashMap;

use crate::dom::{DomApi, SVG_NS};
use crate::modules::{default_modules, Module};
use crate::vnode::{Selector, VNode};

pub struct Patcher<D: DomApi> {
    dom: D,
    modules: Vec<Box<dyn Module<D>>>,
}

impl<D: DomApi> Patcher<D> {
    /// Patcher with all built-in modules.
    pub fn new(dom: D) -> Self {
        Self::with_modules(dom, default_modules())
    }

    pub fn with_modules(dom: D, modules: Vec<Box<dyn Module<D>>>) -> Self {
        Self { dom, modules }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Wraps an existing element so that a first [`patch`](Self::patch) can
    /// render into it.
    pub fn empty_at(&self, elm: D::Node) -> VNode<D> {
        VNode::empty_at(&self.dom, elm)
    }

    /// Makes the DOM under `old` match `new` and returns `new`, now mounted.
    ///
    /// `old` must be mounted, either by an earlier call or through
    /// [`empty_at`](Self::empty_at).
    pub fn patch(&mut self, old: VNode<D>, mut new: VNode<D>) -> VNode<D> {
        if old.is_same(&new) {
            self.patch_vnode(old, &mut new);
            return new;
        }
        let Some(old_elm) = old.elm.clone() else {
            log::warn!("patching from an unmounted vnode; creating without attaching");
            self.create_elm(&mut new, None);
            return new;
        };
        let elm = self.create_elm(&mut new, None);
        if let Some(parent) = self.dom.parent_node(&old_elm) {
            let next = self.dom.next_sibling(&old_elm);
            self.dom.insert_before(&parent, &elm, next.as_ref());
            self.remove_vnodes(&parent, vec![Some(old)]);
        }
        new
    }

    // ── Creation ──────────────────────────────────────────────────────────

    fn create_elm(&mut self, vnode: &mut VNode<D>, parent_ns: Option<&str>) -> D::Node {
        let sel = vnode.sel.clone();
        let elm = match sel.as_deref() {
            None => self.dom.create_text_node(vnode.text.as_deref().unwrap_or_default()),
            Some("!") => self.dom.create_comment(vnode.text.as_deref().unwrap_or_default()),
            Some(sel) => {
                let selector = Selector::parse(sel);
                let ns = match (vnode.data.ns.as_deref(), selector.tag) {
                    (Some(ns), _) => Some(ns.to_string()),
                    (None, "svg") => Some(SVG_NS.to_string()),
                    (None, _) => parent_ns.map(str::to_string),
                };
                let elm = self.dom.create_element(selector.tag, ns.as_deref());
                if let Some(id) = selector.id {
                    self.dom.set_attribute(&elm, "id", id);
                }
                for class in &selector.classes {
                    self.dom.add_class(&elm, class);
                }
                let child_ns = if selector.tag == "foreignObject" { None } else { ns };
                vnode.elm = Some(elm.clone());
                for module in &self.modules {
                    module.create(&mut self.dom, vnode);
                }
                for child in &mut vnode.children {
                    let child_elm = self.create_elm(child, child_ns.as_deref());
                    self.dom.append_child(&elm, &child_elm);
                }
                if vnode.children.is_empty() {
                    if let Some(text) = vnode.text.as_deref() {
                        let text_elm = self.dom.create_text_node(text);
                        self.dom.append_child(&elm, &text_elm);
                    }
                }
                return elm;
            }
        };
        vnode.elm = Some(elm.clone());
        elm
    }

    fn add_vnodes(&mut self, parent: &D::Node, before: Option<&D::Node>, vnodes: &mut [VNode<D>]) {
        let ns = self.namespace_of(parent);
        for vnode in vnodes {
            let elm = self.create_elm(vnode, ns.as_deref());
            self.dom.insert_before(parent, &elm, before);
        }
    }

    /// Namespace children of `parent` inherit. Only SVG is tracked.
    fn namespace_of(&self, parent: &D::Node) -> Option<String> {
        // Walk up until an svg or foreignObject ancestor decides it.
        let mut current = Some(parent.clone());
        while let Some(node) = current {
            match self.dom.tag_name(&node).as_str() {
                "svg" => return Some(SVG_NS.to_string()),
                "foreignobject" => return None,
                _ => current = self.dom.parent_node(&node),
            }
        }
        None
    }

    // ── Removal ───────────────────────────────────────────────────────────

    fn invoke_destroy(&mut self, vnode: &VNode<D>) {
        if vnode.sel.is_none() {
            return;
        }
        for module in &self.modules {
            module.destroy(&mut self.dom, vnode);
        }
        for child in &vnode.children {
            self.invoke_destroy(child);
        }
    }

    fn remove_vnodes(&mut self, parent: &D::Node, vnodes: Vec<Option<VNode<D>>>) {
        for vnode in vnodes.into_iter().flatten() {
            self.invoke_destroy(&vnode);
            if let Some(elm) = &vnode.elm {
                self.dom.remove_child(parent, elm);
            }
        }
    }

    // ── Patching ──────────────────────────────────────────────────────────

    fn patch_vnode(&mut self, old: VNode<D>, new: &mut VNode<D>) {
        let Some(elm) = old.elm.clone() else {
            return;
        };
        new.elm = Some(elm.clone());
        if new.sel.is_some() {
            for module in &self.modules {
                module.update(&mut self.dom, &old, new);
            }
        }
        let VNode { children: old_children, text: old_text, .. } = old;
        match new.text.as_deref() {
            None => {
                match (old_children.is_empty(), new.children.is_empty()) {
                    (false, false) => self.update_children(&elm, old_children, &mut new.children),
                    (true, false) => {
                        if old_text.is_some() {
                            self.dom.set_text_content(&elm, "");
                        }
                        self.add_vnodes(&elm, None, &mut new.children);
                    }
                    (false, true) => {
                        self.remove_vnodes(&elm, old_children.into_iter().map(Some).collect());
                    }
                    (true, true) => {
                        if old_text.is_some() {
                            self.dom.set_text_content(&elm, "");
                        }
                    }
                }
            }
            Some(text) if old_text.as_deref() != Some(text) => {
                if !old_children.is_empty() {
                    self.remove_vnodes(&elm, old_children.into_iter().map(Some).collect());
                }
                self.dom.set_text_content(&elm, text);
            }
            Some(_) => {}
        }
    }

    fn update_children(&mut self, parent: &D::Node, old: Vec<VNode<D>>, new: &mut [VNode<D>]) {
        let mut old: Vec<Option<VNode<D>>> = old.into_iter().map(Some).collect();
        let (mut old_start, mut old_end) = (0, old.len());
        let (mut new_start, mut new_end) = (0, new.len());
        let mut old_keys: Option<HashMap<String, usize>> = None;

        while old_start < old_end && new_start < new_end {
            let Some(old_first) = &old[old_start] else {
                old_start += 1;
                continue;
            };
            let Some(old_last) = &old[old_end - 1] else {
                old_end -= 1;
                continue;
            };

            if old_first.is_same(&new[new_start]) {
                let vnode = take(&mut old, old_start);
                self.patch_vnode(vnode, &mut new[new_start]);
                old_start += 1;
                new_start += 1;
            } else if old_last.is_same(&new[new_end - 1]) {
                let vnode = take(&mut old, old_end - 1);
                self.patch_vnode(vnode, &mut new[new_end - 1]);
                old_end -= 1;
                new_end -= 1;
            } else if old_first.is_same(&new[new_end - 1]) {
                // Moved right.
                let reference = old_last.elm.as_ref().and_then(|elm| self.dom.next_sibling(elm));
                let vnode = take(&mut old, old_start);
                self.patch_vnode(vnode, &mut new[new_end - 1]);
                self.insert(parent, &new[new_end - 1], reference.as_ref());
                old_start += 1;
                new_end -= 1;
            } else if old_last.is_same(&new[new_start]) {
                // Moved left.
                let reference = old_first.elm.clone();
                let vnode = take(&mut old, old_end - 1);
                self.patch_vnode(vnode, &mut new[new_start]);
                self.insert(parent, &new[new_start], reference.as_ref());
                old_end -= 1;
                new_start += 1;
            } else {
                let reference = old_first.elm.clone();
                let keys = old_keys.get_or_insert_with(|| key_map(&old, old_start, old_end));
                let found = new[new_start].key.as_ref().and_then(|key| keys.get(key)).copied();
                match found {
                    Some(index) if old[index].as_ref().is_some_and(|o| o.sel == new[new_start].sel) => {
                        let vnode = take(&mut old, index);
                        self.patch_vnode(vnode, &mut new[new_start]);
                        self.insert(parent, &new[new_start], reference.as_ref());
                    }
                    _ => {
                        let ns = self.namespace_of(parent);
                        let elm = self.create_elm(&mut new[new_start], ns.as_deref());
                        self.dom.insert_before(parent, &elm, reference.as_ref());
                    }
                }
                new_start += 1;
            }
        }

        if new_start < new_end && old[old_start..old_end].iter().all(Option::is_none) {
            let before = new.get(new_end).and_then(|vnode| vnode.elm.clone());
            self.add_vnodes(parent, before.as_ref(), &mut new[new_start..new_end]);
        } else if old_start < old_end {
            let rest = old.drain(old_start..old_end).collect();
            self.remove_vnodes(parent, rest);
        }
    }

    fn insert(&mut self, parent: &D::Node, vnode: &VNode<D>, reference: Option<&D::Node>) {
        if let Some(elm) = &vnode.elm {
            self.dom.insert_before(parent, elm, reference);
        }
    }
}

fn take<D: DomApi>(old: &mut [Option<VNode<D>>], index: usize) -> VNode<D> {
    match old[index].take() {
        Some(vnode) => vnode,
        None => unreachable!("slot {index} was checked to be occupied"),
    }
}

fn key_map<D: DomApi>(old: &[Option<VNode<D>>], start: usize, end: usize) -> HashMap<String, usize> {
    (start..end)
        .filter_map(|i| old[i].as_ref()?.key.clone().map(|key| (key, i)))
        .collect()
}
