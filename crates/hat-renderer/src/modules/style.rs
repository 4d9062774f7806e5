use crate::dom::DomApi;
use crate::modules::Module;
use crate::vnode::VNode;

/// Inline style declarations.
pub struct Style;

impl<D: DomApi> Module<D> for Style {
    fn update(&self, dom: &mut D, old: &VNode<D>, vnode: &mut VNode<D>) {
        let (old_style, style) = (&old.data.style, &vnode.data.style);
        if old_style.is_empty() && style.is_empty() {
            return;
        }
        let Some(elm) = vnode.elm.as_ref() else {
            return;
        };
        for name in old_style.keys() {
            if !style.contains_key(name) {
                dom.remove_style(elm, name);
            }
        }
        for (name, value) in style {
            if old_style.get(name) != Some(value) {
                dom.set_style(elm, name, value);
            }
        }
    }
}
