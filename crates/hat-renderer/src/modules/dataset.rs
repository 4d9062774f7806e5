use crate::dom::DomApi;
use crate::modules::Module;
use crate::vnode::VNode;

/// `data-*` attributes.
pub struct Dataset;

/// `rowId` → `data-row-id`.
fn attr_name(key: &str) -> String {
    let mut out = String::from("data-");
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

impl<D: DomApi> Module<D> for Dataset {
    fn update(&self, dom: &mut D, old: &VNode<D>, vnode: &mut VNode<D>) {
        let (old_data, data) = (&old.data.dataset, &vnode.data.dataset);
        if old_data.is_empty() && data.is_empty() {
            return;
        }
        let Some(elm) = vnode.elm.as_ref() else {
            return;
        };
        for key in old_data.keys() {
            if !data.contains_key(key) {
                dom.remove_attribute(elm, &attr_name(key));
            }
        }
        for (key, value) in data {
            if old_data.get(key) != Some(value) {
                dom.set_attribute(elm, &attr_name(key), value);
            }
        }
    }
}
