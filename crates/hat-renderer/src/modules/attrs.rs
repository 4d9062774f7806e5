use crate::dom::DomApi;
use crate::modules::Module;
use crate::vnode::{AttrValue, VNode};

/// Element attributes.
pub struct Attrs;

impl<D: DomApi> Module<D> for Attrs {
    fn update(&self, dom: &mut D, old: &VNode<D>, vnode: &mut VNode<D>) {
        let (old_attrs, attrs) = (&old.data.attrs, &vnode.data.attrs);
        if old_attrs.is_empty() && attrs.is_empty() {
            return;
        }
        let Some(elm) = vnode.elm.as_ref() else {
            return;
        };
        for (name, value) in attrs {
            if old_attrs.get(name) == Some(value) {
                continue;
            }
            match value {
                AttrValue::Bool(true) => dom.set_attribute(elm, name, ""),
                AttrValue::Bool(false) => dom.remove_attribute(elm, name),
                AttrValue::Str(value) => dom.set_attribute(elm, name, value),
            }
        }
        for name in old_attrs.keys() {
            if !attrs.contains_key(name) {
                dom.remove_attribute(elm, name);
            }
        }
    }
}
