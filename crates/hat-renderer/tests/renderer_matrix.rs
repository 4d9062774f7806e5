use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use hat_renderer::h::h;
use hat_renderer::memory_dom::{MemoryDom, NodeId};
use hat_renderer::{DomApi, Patcher, Renderer, RendererSettings, VNode};
use hat_util::state_path::path;
use serde_json::{json, Value};

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

fn keyed(keys: &[&str]) -> VNode<MemoryDom> {
    h("ul").children(keys.iter().map(|k| h("li").key(*k).attr("title", *k)))
}

fn mounted(view: VNode<MemoryDom>) -> (Patcher<MemoryDom>, NodeId, VNode<MemoryDom>) {
    let mut dom = MemoryDom::new();
    let root = dom.create_element("ul", None);
    let mut patcher = Patcher::new(dom);
    let empty = patcher.empty_at(root);
    let vnode = patcher.patch(empty, view);
    (patcher, root, vnode)
}

fn child_ids(vnode: &VNode<MemoryDom>) -> Vec<NodeId> {
    vnode.children.iter().filter_map(|c| c.elm().copied()).collect()
}

// ── Reconciliation ────────────────────────────────────────────────────────

#[test]
fn identical_tree_patches_with_zero_operations() {
    let view = || {
        h("ul#list.main")
            .attr("role", "list")
            .class("open", true)
            .style("color", "red")
            .dataset("itemCount", "2")
            .prop("value", json!("x"))
            .on("click", |_| {})
            .children([h("li").key("a").text("a"), h("li").key("b").text("b")])
    };
    let (mut patcher, _, vnode) = mounted(view());
    patcher.dom_mut().reset_ops();
    patcher.patch(vnode, view());
    assert_eq!(patcher.dom().ops().total(), 0, "{:?}", patcher.dom().ops());
}

#[test]
fn keyed_reorder_keeps_node_identity() {
    let (mut patcher, root, vnode) = mounted(keyed(&["a", "b", "c", "d", "e"]));
    let before: Vec<(String, NodeId)> = vnode
        .children
        .iter()
        .map(|c| (c.key.clone().unwrap_or_default(), *c.elm().unwrap()))
        .collect();
    patcher.dom_mut().reset_ops();

    let vnode = patcher.patch(vnode, keyed(&["e", "x", "c", "a", "y", "d"]));
    let ops = patcher.dom().ops();
    assert_eq!(ops.created, 2);
    assert_eq!(ops.removed, 1);

    for child in &vnode.children {
        let key = child.key.as_deref().unwrap_or_default();
        if let Some((_, id)) = before.iter().find(|(k, _)| k == key) {
            assert_eq!(child.elm(), Some(id), "key {key} lost its node");
        }
    }
    assert_eq!(patcher.dom().children(root), child_ids(&vnode).as_slice());
    assert_eq!(
        patcher.dom().to_html(root),
        "<ul>\
         <li title=\"e\"></li><li title=\"x\"></li><li title=\"c\"></li>\
         <li title=\"a\"></li><li title=\"y\"></li><li title=\"d\"></li>\
         </ul>"
    );
}

#[test]
fn same_key_with_new_tag_is_recreated() {
    let (mut patcher, root, vnode) = mounted(h("ul").children([h("li").key("a"), h("li").key("b")]));
    let vnode = patcher.patch(vnode, h("ul").children([h("li").key("b"), h("p").key("a")]));
    assert_eq!(patcher.dom().to_html(root), "<ul><li></li><p></p></ul>");
    assert_eq!(patcher.dom().children(root), child_ids(&vnode).as_slice());
}

#[test]
fn unkeyed_children_patch_in_place() {
    let (mut patcher, root, vnode) = mounted(h("ul").children([h("li").text("1"), h("li").text("2")]));
    let ids = child_ids(&vnode);
    patcher.dom_mut().reset_ops();
    let vnode = patcher.patch(
        vnode,
        h("ul").children([h("li").text("1"), h("li").text("two"), h("li").text("3")]),
    );
    assert_eq!(&child_ids(&vnode)[..2], ids.as_slice());
    // The new item and its text node.
    assert_eq!(patcher.dom().ops().created, 2);
    assert_eq!(patcher.dom().to_html(root), "<ul><li>1</li><li>two</li><li>3</li></ul>");
}

#[test]
fn modules_touch_only_changed_facets() {
    let (mut patcher, root, vnode) = mounted(
        h("ul")
            .attr("title", "t")
            .attr("hidden", true)
            .class("a", true)
            .class("b", true)
            .style("color", "red")
            .dataset("fooBar", "1"),
    );
    patcher.dom_mut().reset_ops();
    patcher.patch(
        vnode,
        h("ul")
            .attr("title", "t")
            .attr("hidden", false)
            .class("a", true)
            .class("b", false)
            .style("width", "1px")
            .dataset("fooBar", "1"),
    );
    let ops = patcher.dom().ops();
    assert_eq!(ops.attrs, 1);
    assert_eq!(ops.classes, 1);
    assert_eq!(ops.styles, 2);
    let dom = patcher.dom();
    assert!(dom.has_class(root, "a"));
    assert!(!dom.has_class(root, "b"));
    assert_eq!(dom.style(root, "color"), None);
    assert_eq!(dom.style(root, "width"), Some("1px"));
    assert_eq!(dom.get_attribute(&root, "data-foo-bar").as_deref(), Some("1"));
    assert_eq!(dom.get_attribute(&root, "hidden"), None);
}

#[test]
fn listeners_follow_the_latest_handler() {
    let hits = Rc::new(RefCell::new(Vec::new()));
    let handler = |tag: &'static str| {
        let hits = Rc::clone(&hits);
        move |_: &hat_renderer::memory_dom::MemoryEvent| hits.borrow_mut().push(tag)
    };
    let (mut patcher, root, vnode) = mounted(h("ul").on("click", handler("first")));
    assert!(patcher.dom().dispatch(root, "click", Value::Null));

    patcher.dom_mut().reset_ops();
    let vnode = patcher.patch(vnode, h("ul").on("click", handler("second")));
    assert_eq!(patcher.dom().ops().listeners, 0);
    assert!(patcher.dom().dispatch(root, "click", Value::Null));

    patcher.patch(vnode, h("ul"));
    assert!(!patcher.dom().has_listener(root, "click"));
    assert!(!patcher.dom().dispatch(root, "click", Value::Null));
    assert_eq!(*hits.borrow(), vec!["first", "second"]);
}

#[test]
fn removed_subtree_drops_its_listeners() {
    let clicks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&clicks);
    let (mut patcher, _, vnode) =
        mounted(h("ul").child(h("li").on("click", move |_| counter.set(counter.get() + 1))));
    let li = *vnode.children[0].elm().unwrap();
    patcher.patch(vnode, h("ul"));
    assert!(!patcher.dom().has_listener(li, "click"));
    assert_eq!(clicks.get(), 0);
}

#[test]
fn json_notation_renders() {
    let tree = json!(["ul", {"attrs": {"role": "list"}}, [["li", "a"], ["li", 2]], null, "end"]);
    let (patcher, root, _) = mounted(VNode::from_json(&tree).unwrap());
    assert_eq!(
        patcher.dom().to_html(root),
        "<ul role=\"list\"><li>a</li><li>2</li>end</ul>"
    );
}

// ── Render state ──────────────────────────────────────────────────────────

fn counter_app() -> (Renderer<MemoryDom>, NodeId) {
    let mut dom = MemoryDom::new();
    let root = dom.create_element("div", None);
    let mut renderer = Renderer::new(dom, root, RendererSettings::default());
    let queue = renderer.queue();
    renderer.set_view(move |state| {
        let queue = queue.clone();
        h("div").child(
            h("button")
                .on("click", move |_| {
                    queue.change(path(["count"]), |v| json!(v.as_i64().unwrap_or(0) + 1))
                })
                .text(state["count"].as_i64().unwrap_or(0).to_string()),
        )
    });
    (renderer, root)
}

fn button(renderer: &Renderer<MemoryDom>) -> NodeId {
    *renderer.vnode().children[0].elm().unwrap()
}

#[test]
fn second_render_of_same_state_is_free() {
    let (mut renderer, _) = counter_app();
    renderer.poll(ms(0));
    renderer.dom_mut().reset_ops();
    renderer.render(ms(100));
    assert_eq!(renderer.dom().ops().total(), 0);
}

#[test]
fn changes_in_one_pass_notify_once() {
    let (mut renderer, root) = counter_app();
    let notified = Rc::new(Cell::new(0));
    let seen = Rc::clone(&notified);
    renderer.on_change(move |_| seen.set(seen.get() + 1));
    renderer.poll(ms(0));

    let target = button(&renderer);
    for _ in 0..3 {
        assert!(renderer.dom().dispatch(target, "click", Value::Null));
    }
    assert_eq!(renderer.queue().pending(), 3);
    assert!(renderer.process(ms(50)));
    assert_eq!(notified.get(), 1);
    assert_eq!(renderer.get(&path(["count"])), &json!(3));

    assert!(renderer.poll(ms(50)));
    assert_eq!(renderer.dom().to_html(root), "<div><button>3</button></div>");
}

#[test]
fn renders_are_throttled_not_duplicated() {
    let (mut renderer, _) = counter_app();
    let renders = Rc::new(Cell::new(0));
    let count = Rc::clone(&renders);
    renderer.on_render(move |_| count.set(count.get() + 1));
    assert!(renderer.poll(ms(0)));

    let interval = Duration::from_secs(1) / 30;
    let mut now = ms(0);
    while now < ms(100) {
        now += ms(5);
        renderer.set(path(["count"]), json!(now.as_millis() as u64));
        renderer.poll(now);
    }
    assert!(renders.get() <= 1 + (100 / interval.as_millis()) as usize + 1);
    assert!(renders.get() >= 3);
    renderer.poll(ms(1000));
    assert_eq!(renderer.get(&path(["count"])), &json!(100));
}

#[test]
fn unthrottled_renders_immediately() {
    let mut dom = MemoryDom::new();
    let root = dom.create_element("p", None);
    let mut renderer = Renderer::new(dom, root, RendererSettings { max_fps: None });
    renderer.set_view(|state| h("p").text(state.as_str().unwrap_or_default()));
    renderer.poll(ms(0));
    renderer.set(vec![], json!("a"));
    assert!(renderer.poll(ms(1)));
    renderer.set(vec![], json!("b"));
    assert!(renderer.poll(ms(1)));
    assert_eq!(renderer.dom().to_html(root), "<p>b</p>");
}

// ── Keyed lists under random edits ────────────────────────────────────────

mod keyed_properties {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::subsequence;

    fn key_list() -> impl Strategy<Value = Vec<String>> {
        let keys: Vec<String> = (0..12).map(|i| format!("k{i}")).collect();
        subsequence(keys, 0..=12).prop_shuffle()
    }

    fn list(keys: &[String]) -> VNode<MemoryDom> {
        h("ul").children(keys.iter().map(|k| h("li").key(k).attr("title", k.as_str())))
    }

    proptest! {
        #[test]
        fn creates_only_new_keys(a in key_list(), b in key_list()) {
            let (mut patcher, root, vnode) = mounted(list(&a));
            let ids: Vec<(String, NodeId)> =
                a.iter().cloned().zip(child_ids(&vnode)).collect();
            patcher.dom_mut().reset_ops();

            let vnode = patcher.patch(vnode, list(&b));
            let fresh = b.iter().filter(|k| !a.contains(k)).count();
            let gone = a.iter().filter(|k| !b.contains(k)).count();
            prop_assert_eq!(patcher.dom().ops().created, fresh);
            prop_assert_eq!(patcher.dom().ops().removed, gone);

            let expected: Vec<String> = b.iter().map(|k| format!("<li title=\"{k}\"></li>")).collect();
            prop_assert_eq!(patcher.dom().to_html(root), format!("<ul>{}</ul>", expected.concat()));
            for (key, id) in b.iter().zip(child_ids(&vnode)) {
                if let Some((_, old)) = ids.iter().find(|(k, _)| k == key) {
                    prop_assert_eq!(*old, id);
                }
            }
        }
    }
}
