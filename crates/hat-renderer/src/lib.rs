//! hat-renderer - virtual-tree rendering with keyed reconciliation.
//!
//! - [`vnode`] node descriptions and the JSON array notation
//! - [`h`] builder functions
//! - [`dom`] the [`DomApi`] host abstraction
//! - [`memory_dom`] in-process DOM with operation counters
//! - [`modules`] per-facet updaters (attributes, class, dataset, listeners, props, style)
//! - [`patch`] the reconciler
//! - [`renderer`] state container with change batching and a render throttle
//! - `web_dom` browser DOM on `web-sys` (feature `web`)

pub mod dom;
pub mod h;
pub mod memory_dom;
pub mod modules;
pub mod patch;
pub mod renderer;
pub mod vnode;
#[cfg(feature = "web")]
pub mod web_dom;

pub use dom::{DomApi, Listener, SVG_NS};
pub use patch::Patcher;
pub use renderer::{ChangeQueue, Renderer, RendererSettings};
pub use vnode::{AttrValue, RenderError, VNode, VNodeData};
