use crate::dom::DomApi;
use crate::modules::Module;
use crate::vnode::VNode;

/// Element properties, compared against the previous vnode. `value` is also
/// compared against the live element so user input is not overwritten with
/// the same value.
pub struct Props;

impl<D: DomApi> Module<D> for Props {
    fn update(&self, dom: &mut D, old: &VNode<D>, vnode: &mut VNode<D>) {
        let (old_props, props) = (&old.data.props, &vnode.data.props);
        if old_props.is_empty() && props.is_empty() {
            return;
        }
        let Some(elm) = vnode.elm.as_ref() else {
            return;
        };
        for name in old_props.keys() {
            if !props.contains_key(name) {
                dom.remove_property(elm, name);
            }
        }
        for (name, value) in props {
            if old_props.get(name) == Some(value) {
                continue;
            }
            if name == "value" && dom.get_property(elm, name).as_ref() == Some(value) {
                continue;
            }
            dom.set_property(elm, name, value);
        }
    }
}
