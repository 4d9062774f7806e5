use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::{DomApi, Listener};
use crate::modules::Module;
use crate::vnode::{SharedHandlers, VNode};

/// Event listeners.
///
/// The DOM gets one listener per event name, which looks the handler up in a
/// map shared with the vnode that currently owns the element. Patching only
/// swaps the map contents, so changing a handler closure never touches the
/// DOM.
pub struct Listeners;

fn dom_listener<E: 'static>(slot: &SharedHandlers<E>, name: &str) -> Listener<E> {
    let slot = Rc::clone(slot);
    let name = name.to_string();
    Rc::new(move |event: &E| {
        let handler = slot.borrow().get(&name).cloned();
        if let Some(handler) = handler {
            handler(event);
        }
    })
}

impl<D: DomApi> Module<D> for Listeners {
    fn update(&self, dom: &mut D, old: &VNode<D>, vnode: &mut VNode<D>) {
        let (old_on, on) = (&old.data.on, &vnode.data.on);
        if old_on.is_empty() && on.is_empty() {
            return;
        }
        let Some(elm) = vnode.elm.clone() else {
            return;
        };
        for name in old_on.keys() {
            if !on.contains_key(name) {
                dom.remove_listener(&elm, name);
            }
        }
        let slot = old.listener.clone().unwrap_or_else(|| Rc::new(RefCell::new(Default::default())));
        *slot.borrow_mut() = on.clone();
        for name in on.keys() {
            if !old_on.contains_key(name) {
                dom.add_listener(&elm, name, dom_listener(&slot, name));
            }
        }
        vnode.listener = Some(slot);
    }

    fn destroy(&self, dom: &mut D, vnode: &VNode<D>) {
        let Some(elm) = vnode.elm.as_ref() else {
            return;
        };
        for name in vnode.data.on.keys() {
            dom.remove_listener(elm, name);
        }
        if let Some(slot) = &vnode.listener {
            slot.borrow_mut().clear();
        }
    }
}
