use crate::dom::DomApi;
use crate::modules::Module;
use crate::vnode::VNode;

/// Toggled classes. Classes from the selector are set at creation and are
/// not managed here.
pub struct Class;

impl<D: DomApi> Module<D> for Class {
    fn update(&self, dom: &mut D, old: &VNode<D>, vnode: &mut VNode<D>) {
        let (old_class, class) = (&old.data.class, &vnode.data.class);
        if old_class.is_empty() && class.is_empty() {
            return;
        }
        let Some(elm) = vnode.elm.as_ref() else {
            return;
        };
        for (name, was_on) in old_class {
            if *was_on && !class.contains_key(name) {
                dom.remove_class(elm, name);
            }
        }
        for (name, on) in class {
            match (old_class.get(name).copied(), *on) {
                (Some(was_on), on) if was_on == on => {}
                (None, false) => {}
                (_, true) => dom.add_class(elm, name),
                (_, false) => dom.remove_class(elm, name),
            }
        }
    }
}
