//! Render state: a JSON state value, a queue of pending mutations and the
//! mounted vnode tree.
//!
//! Time is passed in by the host as a monotonic [`Duration`]. Mutations are
//! only applied by [`Renderer::process`]; renders only happen in
//! [`Renderer::poll`] (or an explicit [`Renderer::render`]). A host loop looks
//! like:
//!
//! ```
//! use std::time::Duration;
//! use hat_renderer::h::h;
//! use hat_renderer::memory_dom::MemoryDom;
//! use hat_renderer::{DomApi, Renderer, RendererSettings};
//! use hat_util::state_path::path;
//! use serde_json::json;
//!
//! let mut dom = MemoryDom::new();
//! let root = dom.create_element("div", None);
//! let mut renderer = Renderer::new(dom, root, RendererSettings::default());
//! renderer.set_view(|state| h("div").text(state["title"].as_str().unwrap_or_default()));
//!
//! renderer.set(path(["title"]), json!("hello"));
//! let now = Duration::ZERO;
//! renderer.process(now);
//! renderer.poll(now);
//! assert_eq!(renderer.dom().to_html(root), "<div>hello</div>");
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use hat_util::state_path::{self, StatePath};
use hat_util::deep_equal;
use serde_json::Value;

use crate::dom::DomApi;
use crate::patch::Patcher;
use crate::vnode::VNode;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererSettings {
    /// Upper bound on renders per second. `None` renders as soon as a change
    /// is processed.
    pub max_fps: Option<u32>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self { max_fps: Some(30) }
    }
}

impl RendererSettings {
    /// Minimum time between two renders.
    pub fn min_interval(&self) -> Duration {
        match self.max_fps {
            Some(fps) if fps > 0 => Duration::from_secs(1) / fps,
            _ => Duration::ZERO,
        }
    }
}

// ── Change queue ──────────────────────────────────────────────────────────

type ChangeFn = Box<dyn FnOnce(Value) -> Value>;

struct Change {
    path: StatePath,
    f: ChangeFn,
}

#[derive(Default)]
struct QueueState {
    changes: VecDeque<Change>,
    processing: bool,
}

/// Handle for enqueueing state mutations.
///
/// Clones share one queue, so event handlers can capture a handle and
/// enqueue changes that the owning [`Renderer`] applies on its next
/// [`process`](Renderer::process).
#[derive(Clone, Default)]
pub struct ChangeQueue {
    inner: Rc<RefCell<QueueState>>,
}

impl ChangeQueue {
    /// Enqueues `f`, which maps the value at `path` to its replacement.
    pub fn change(&self, path: StatePath, f: impl FnOnce(Value) -> Value + 'static) {
        self.inner.borrow_mut().changes.push_back(Change { path, f: Box::new(f) });
    }

    pub fn set(&self, path: StatePath, value: Value) {
        self.change(path, move |_| value);
    }

    /// Number of changes waiting to be processed.
    pub fn pending(&self) -> usize {
        self.inner.borrow().changes.len()
    }

    fn pop(&self) -> Option<Change> {
        self.inner.borrow_mut().changes.pop_front()
    }

    /// Marks a drain as running. Returns `false` if one already is.
    fn begin(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        !std::mem::replace(&mut inner.processing, true)
    }

    fn end(&self) {
        self.inner.borrow_mut().processing = false;
    }
}

impl std::fmt::Debug for ChangeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeQueue").field("pending", &self.pending()).finish()
    }
}

// ── Renderer ──────────────────────────────────────────────────────────────

type View<D> = Box<dyn Fn(&Value) -> VNode<D>>;
type Observer = Box<dyn FnMut(&Value)>;

pub struct Renderer<D: DomApi> {
    patcher: Patcher<D>,
    settings: RendererSettings,
    state: Value,
    queue: ChangeQueue,
    view: Option<View<D>>,
    vnode: VNode<D>,
    last_render: Option<Duration>,
    render_due: Option<Duration>,
    on_change: Vec<Observer>,
    on_render: Vec<Observer>,
}

impl<D: DomApi> Renderer<D> {
    /// Renderer that takes over `root`. The state starts as `null`.
    pub fn new(dom: D, root: D::Node, settings: RendererSettings) -> Self {
        let patcher = Patcher::new(dom);
        let vnode = patcher.empty_at(root);
        Self::with_patcher(patcher, vnode, settings)
    }

    /// Renderer on a preconfigured patcher, rendering over `vnode`.
    pub fn with_patcher(patcher: Patcher<D>, vnode: VNode<D>, settings: RendererSettings) -> Self {
        Self {
            patcher,
            settings,
            state: Value::Null,
            queue: ChangeQueue::default(),
            view: None,
            vnode,
            last_render: None,
            render_due: None,
            on_change: Vec::new(),
            on_render: Vec::new(),
        }
    }

    /// Sets the function from state to tree and schedules a render.
    pub fn set_view(&mut self, view: impl Fn(&Value) -> VNode<D> + 'static) {
        self.view = Some(Box::new(view));
        self.render_due.get_or_insert(self.last_render.map_or(Duration::ZERO, |last| {
            last + self.settings.min_interval()
        }));
    }

    pub fn dom(&self) -> &D {
        self.patcher.dom()
    }

    pub fn dom_mut(&mut self) -> &mut D {
        self.patcher.dom_mut()
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// A handle onto this renderer's change queue.
    pub fn queue(&self) -> ChangeQueue {
        self.queue.clone()
    }

    /// The currently mounted tree.
    pub fn vnode(&self) -> &VNode<D> {
        &self.vnode
    }

    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Value at `path`, `null` where nothing is stored.
    pub fn get(&self, path: &[state_path::Segment]) -> &Value {
        state_path::get(&self.state, path).unwrap_or(&NULL)
    }

    pub fn change(&self, path: StatePath, f: impl FnOnce(Value) -> Value + 'static) {
        self.queue.change(path, f);
    }

    pub fn set(&self, path: StatePath, value: Value) {
        self.queue.set(path, value);
    }

    /// Called with the new state after every pass that changed it.
    pub fn on_change(&mut self, observer: impl FnMut(&Value) + 'static) {
        self.on_change.push(Box::new(observer));
    }

    /// Called with the rendered state after every render.
    pub fn on_render(&mut self, observer: impl FnMut(&Value) + 'static) {
        self.on_render.push(Box::new(observer));
    }

    /// Applies every queued change in order and returns whether the state
    /// changed.
    ///
    /// Every change is stored. One whose result equals the previous value
    /// at its path does not count as a change, unless the resulting state
    /// is `null`. A change that cannot be written is logged and dropped.
    /// Changes enqueued by observers during the pass wait for the next one.
    pub fn process(&mut self, now: Duration) -> bool {
        if !self.queue.begin() {
            return false;
        }
        let mut changed = false;
        let mut applied = 0usize;
        while let Some(Change { path, f }) = self.queue.pop() {
            let old = self.get(&path).clone();
            let new = f(old.clone());
            let same = deep_equal(&old, &new);
            if let Err(err) = state_path::set(&mut self.state, &path, new) {
                log::warn!("state change dropped: {err}");
                continue;
            }
            // Checked against the state after the write.
            if same && !self.state.is_null() {
                continue;
            }
            changed = true;
            applied += 1;
        }
        self.queue.end();
        if !changed {
            return false;
        }
        log::trace!("applied {applied} state changes");
        self.schedule(now);
        let state = &self.state;
        for observer in &mut self.on_change {
            observer(state);
        }
        true
    }

    fn schedule(&mut self, now: Duration) {
        if self.render_due.is_some() {
            return;
        }
        let due = match self.last_render {
            Some(last) => now.max(last + self.settings.min_interval()),
            None => now,
        };
        log::trace!("render scheduled at {due:?}");
        self.render_due = Some(due);
    }

    /// When the host should call [`poll`](Self::poll) next.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.queue.pending() > 0 {
            return Some(Duration::ZERO);
        }
        self.render_due
    }

    /// Processes queued changes and renders if a render is due. Returns
    /// whether it rendered.
    pub fn poll(&mut self, now: Duration) -> bool {
        self.process(now);
        match self.render_due {
            Some(due) if due <= now => {
                self.render(now);
                true
            }
            _ => false,
        }
    }

    /// Renders the current state right away.
    pub fn render(&mut self, now: Duration) {
        self.render_due = None;
        self.last_render = Some(now);
        let Some(view) = &self.view else {
            log::debug!("render without a view");
            return;
        };
        let next = view(&self.state);
        let old = std::mem::replace(&mut self.vnode, VNode::empty());
        self.vnode = self.patcher.patch(old, next);
        log::debug!("rendered at {now:?}");
        let state = &self.state;
        for observer in &mut self.on_render {
            observer(state);
        }
    }
}
