use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use hat_json_patch::{apply_patch, to_json_patch, Op};
use hat_juggler::{Application, ConnectionState, Frame, JugglerError, Settings};
use hat_renderer::h::h;
use hat_renderer::memory_dom::MemoryDom;
use hat_renderer::{DomApi, Renderer, RendererSettings};
use hat_util::state_path::path;
use serde_json::{json, Value};

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

fn renderer() -> Renderer<MemoryDom> {
    let mut dom = MemoryDom::new();
    let root = dom.create_element("div", None);
    let mut renderer = Renderer::new(dom, root, RendererSettings::default());
    renderer.set_view(|state| h("div").text(state["remote"].to_string()));
    renderer
}

fn app() -> Application {
    Application::new(Settings::default(), Some(path(["local"])), Some(path(["remote"])))
}

fn data_frame(ops: Vec<Op>) -> String {
    json!({"type": "DATA", "payload": to_json_patch(&ops)}).to_string()
}

fn connect(app: &mut Application, renderer: &mut Renderer<MemoryDom>, now: Duration) {
    assert!(app.poll_connect(now));
    app.handle_open(renderer, now);
    assert!(app.is_open());
}

// ── Sync ──────────────────────────────────────────────────────────────────

#[test]
fn local_state_is_pushed_after_sync_delay() {
    let mut renderer = renderer();
    let mut app = app();
    renderer.set(path(["local"]), json!({"items": ["x", "y", "z"]}));
    renderer.process(ms(0));
    connect(&mut app, &mut renderer, ms(0));

    app.poll(ms(99));
    assert!(app.poll_transmit().is_none());
    app.poll(ms(100));
    let Some(Frame::Data(first)) = app.poll_transmit() else {
        panic!("expected DATA");
    };
    let mirrored = apply_patch(&Value::Null, &first).unwrap();
    assert_eq!(mirrored, json!({"items": ["x", "y", "z"]}));

    // Three changes inside one window.
    for (i, items) in [json!(["x", "z"]), json!(["x", "z", "q"]), json!(["x", "z", "w"])].into_iter().enumerate() {
        renderer.set(path(["local", "items"]), items);
        let now = ms(200 + 10 * i as u64);
        renderer.process(now);
        app.state_changed(&renderer, now);
    }
    assert_eq!(app.next_deadline(), Some(ms(300)));
    app.poll(ms(300));
    let Some(Frame::Data(second)) = app.poll_transmit() else {
        panic!("expected DATA");
    };
    assert!(app.poll_transmit().is_none());
    assert_eq!(
        second,
        vec![
            Op::Test { path: vec!["items".into(), "1".into()], value: json!("y") },
            Op::Remove { path: vec!["items".into(), "1".into()] },
            Op::Add { path: vec!["items".into(), "2".into()], value: json!("w") },
        ]
    );
    assert_eq!(apply_patch(&mirrored, &second).unwrap(), json!({"items": ["x", "z", "w"]}));
}

#[test]
fn remote_data_lands_in_renderer_state() {
    let mut renderer = renderer();
    let mut app = app();
    connect(&mut app, &mut renderer, ms(0));

    let frame = data_frame(vec![Op::Replace { path: vec![], value: json!({"count": 1}) }]);
    app.handle_text(&mut renderer, &frame, ms(5)).unwrap();
    assert_eq!(renderer.get(&path(["remote"])), &json!({"count": 1}));
    let frame = data_frame(vec![Op::Replace { path: vec!["count".into()], value: json!(2) }]);
    app.handle_text(&mut renderer, &frame, ms(6)).unwrap();
    assert_eq!(renderer.get(&path(["remote", "count"])), &json!(2));
    assert_eq!(app.connection().map(|c| c.remote_data().clone()), Some(json!({"count": 2})));
}

#[test]
fn messages_reach_the_handler_and_can_be_sent() {
    let mut renderer = renderer();
    let mut app = app();
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    app.on_message(move |msg| sink.borrow_mut().push(msg.clone()));

    assert!(matches!(app.send(json!("early")), Err(JugglerError::NotOpen)));
    connect(&mut app, &mut renderer, ms(0));
    app.handle_text(&mut renderer, r#"{"type": "MESSAGE", "payload": {"hello": 1}}"#, ms(1)).unwrap();
    assert_eq!(*received.borrow(), vec![json!({"hello": 1})]);

    app.send(json!({"action": "ping"})).unwrap();
    assert_eq!(app.poll_transmit(), Some(Frame::Message(json!({"action": "ping"}))));
}

// ── Failure and reconnect ─────────────────────────────────────────────────

#[test]
fn close_nulls_remote_and_retries_after_delay() {
    let mut renderer = renderer();
    let mut app = app();
    connect(&mut app, &mut renderer, ms(0));
    let frame = data_frame(vec![Op::Replace { path: vec![], value: json!([1, 2]) }]);
    app.handle_text(&mut renderer, &frame, ms(10)).unwrap();
    assert_eq!(renderer.get(&path(["remote"])), &json!([1, 2]));

    app.handle_close(&mut renderer, ms(1000));
    assert_eq!(renderer.get(&path(["remote"])), &Value::Null);
    assert!(!app.is_open());
    assert!(matches!(app.send(json!(1)), Err(JugglerError::NotOpen)));
    assert_eq!(app.next_deadline(), Some(ms(6000)));

    assert!(!app.poll_connect(ms(1000)));
    assert!(!app.poll_connect(ms(5999)));
    assert!(app.poll_connect(ms(6000)));
    assert!(!app.poll_connect(ms(6001)), "only one attempt per close");
    assert_eq!(app.connection().map(|c| c.state()), Some(ConnectionState::Connecting));
}

#[test]
fn failed_attempts_retry_at_fixed_interval() {
    let mut renderer = renderer();
    let mut app = app();
    let mut attempts = Vec::new();
    let mut now = ms(0);
    while now <= ms(16_000) {
        if app.poll_connect(now) {
            attempts.push(now);
            app.handle_close(&mut renderer, now);
        }
        now += ms(250);
    }
    assert_eq!(attempts, vec![ms(0), ms(5000), ms(10_000), ms(15_000)]);
}

#[test]
fn protocol_violation_requests_close() {
    let mut renderer = renderer();
    let mut app = app();
    connect(&mut app, &mut renderer, ms(0));
    let err = app
        .handle_text(&mut renderer, r#"{"type": "STATE", "payload": {}}"#, ms(1))
        .unwrap_err();
    assert!(matches!(err, JugglerError::Protocol(_)));
    assert!(app.wants_close());
    app.handle_close(&mut renderer, ms(2));
    assert_eq!(app.next_deadline(), Some(ms(5002)));
}

#[test]
fn local_changes_while_closed_are_sent_on_reconnect() {
    let mut renderer = renderer();
    let mut app = app();
    assert!(app.poll_connect(ms(0)));
    app.handle_close(&mut renderer, ms(0));

    renderer.set(path(["local"]), json!({"draft": true}));
    renderer.process(ms(100));
    app.state_changed(&renderer, ms(100));
    assert!(app.poll_transmit().is_none());

    connect(&mut app, &mut renderer, ms(5000));
    app.poll(ms(5100));
    let Some(Frame::Data(patch)) = app.poll_transmit() else {
        panic!("expected DATA");
    };
    assert_eq!(apply_patch(&Value::Null, &patch).unwrap(), json!({"draft": true}));
}
