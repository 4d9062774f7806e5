//! Per-facet node updaters.
//!
//! Each module owns one facet of an element (attributes, classes, dataset,
//! listeners, properties, inline style) and only touches that facet when the
//! reconciler creates, patches or destroys a node.

pub mod attrs;
pub mod class;
pub mod dataset;
pub mod listeners;
pub mod props;
pub mod style;

use crate::dom::DomApi;
use crate::vnode::VNode;

pub use attrs::Attrs;
pub use class::Class;
pub use dataset::Dataset;
pub use listeners::Listeners;
pub use props::Props;
pub use style::Style;

pub trait Module<D: DomApi> {
    /// Called once the element exists. Defaults to an update from an empty
    /// node.
    fn create(&self, dom: &mut D, vnode: &mut VNode<D>) {
        self.update(dom, &VNode::empty(), vnode);
    }

    /// Brings the facet of `vnode.elm` from `old`'s data to `vnode`'s.
    fn update(&self, dom: &mut D, old: &VNode<D>, vnode: &mut VNode<D>);

    /// Called before the element is removed.
    fn destroy(&self, _dom: &mut D, _vnode: &VNode<D>) {}
}

/// All built-in modules.
pub fn default_modules<D: DomApi>() -> Vec<Box<dyn Module<D>>> {
    vec![
        Box::new(Attrs),
        Box::new(Class),
        Box::new(Dataset),
        Box::new(Listeners),
        Box::new(Props),
        Box::new(Style),
    ]
}
