//! One juggler connection as a sans-IO state machine.
//!
//! The host owns the transport. It reports transport events through
//! [`Connection::handle_open`], [`Connection::handle_text`] and
//! [`Connection::handle_close`], sends whatever
//! [`Connection::poll_transmit`] hands out, and calls [`Connection::poll`]
//! once [`Connection::next_deadline`] has passed.
//!
//! ```
//! use std::time::Duration;
//! use hat_juggler::{Connection, Frame};
//! use serde_json::json;
//!
//! let mut conn = Connection::new(Duration::from_millis(100));
//! conn.handle_open();
//! conn.set_local_data(json!({"a": 1}), Duration::ZERO).unwrap();
//! conn.set_local_data(json!({"a": 2}), Duration::from_millis(50)).unwrap();
//!
//! conn.poll(Duration::from_millis(99));
//! assert!(conn.poll_transmit().is_none());
//! conn.poll(Duration::from_millis(100));
//! assert!(matches!(conn.poll_transmit(), Some(Frame::Data(_))));
//! assert!(conn.poll_transmit().is_none());
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use hat_json_patch::{apply_patch, diff};
use serde_json::Value;

use crate::frame::Frame;
use crate::JugglerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    /// Close requested locally, transport not yet closed.
    Closing,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    Opened,
    /// The mirrored remote value changed.
    RemoteData(Value),
    Message(Value),
    Closed,
}

#[derive(Debug)]
pub struct Connection {
    sync_delay: Duration,
    state: ConnectionState,
    local: Value,
    synced: Value,
    remote: Value,
    sync_due: Option<Duration>,
    transmit: VecDeque<Frame>,
    events: VecDeque<ConnectionEvent>,
}

impl Connection {
    pub fn new(sync_delay: Duration) -> Self {
        Self {
            sync_delay,
            state: ConnectionState::Connecting,
            local: Value::Null,
            synced: Value::Null,
            remote: Value::Null,
            sync_due: None,
            transmit: VecDeque::new(),
            events: VecDeque::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn local_data(&self) -> &Value {
        &self.local
    }

    /// Mirror of the peer's value. `null` unless open.
    pub fn remote_data(&self) -> &Value {
        &self.remote
    }

    // ── Transport events ──────────────────────────────────────────────────

    pub fn handle_open(&mut self) {
        if self.state != ConnectionState::Connecting {
            log::warn!("open reported in state {:?}", self.state);
            return;
        }
        log::debug!("connection open");
        self.state = ConnectionState::Open;
        self.events.push_back(ConnectionEvent::Opened);
    }

    /// Handles one inbound text frame. A frame that violates the protocol
    /// or cannot be applied starts closing the connection and is returned
    /// as the error.
    pub fn handle_text(&mut self, text: &str) -> Result<(), JugglerError> {
        let result = Frame::decode(text).and_then(|frame| self.handle_frame(frame));
        if let Err(err) = &result {
            log::warn!("closing connection: {err}");
            self.close();
        }
        result
    }

    fn handle_frame(&mut self, frame: Frame) -> Result<(), JugglerError> {
        if !self.is_open() {
            return Err(JugglerError::NotOpen);
        }
        match frame {
            Frame::Data(patch) => {
                let remote = apply_patch(&self.remote, &patch)
                    .map_err(|e| JugglerError::Protocol(format!("cannot apply DATA: {e}")))?;
                log::trace!("remote data changed by {} operations", patch.len());
                self.remote = remote;
                self.events.push_back(ConnectionEvent::RemoteData(self.remote.clone()));
            }
            Frame::Message(payload) => self.events.push_back(ConnectionEvent::Message(payload)),
        }
        Ok(())
    }

    /// The transport is gone. Resets the remote mirror and cancels the sync
    /// timer.
    pub fn handle_close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        log::debug!("connection closed");
        self.state = ConnectionState::Closed;
        self.remote = Value::Null;
        self.sync_due = None;
        self.transmit.clear();
        self.events.push_back(ConnectionEvent::Closed);
    }

    // ── Local actions ─────────────────────────────────────────────────────

    /// Asks the host to close the transport.
    pub fn close(&mut self) {
        if matches!(self.state, ConnectionState::Connecting | ConnectionState::Open) {
            self.state = ConnectionState::Closing;
            self.sync_due = None;
        }
    }

    /// Replaces the local value. The difference to the last synced value is
    /// sent once the debounce window that this call opens (or joins) ends.
    pub fn set_local_data(&mut self, data: Value, now: Duration) -> Result<(), JugglerError> {
        if !self.is_open() {
            return Err(JugglerError::NotOpen);
        }
        self.local = data;
        if self.sync_due.is_none() {
            self.sync_due = Some(now + self.sync_delay);
        }
        Ok(())
    }

    /// Queues a `MESSAGE` frame.
    pub fn send(&mut self, msg: Value) -> Result<(), JugglerError> {
        if !self.is_open() {
            return Err(JugglerError::NotOpen);
        }
        self.transmit.push_back(Frame::Message(msg));
        Ok(())
    }

    // ── Polling ───────────────────────────────────────────────────────────

    /// Flushes local changes if the debounce window has ended.
    pub fn poll(&mut self, now: Duration) {
        match self.sync_due {
            Some(due) if due <= now => self.sync_due = None,
            _ => return,
        }
        if !self.is_open() {
            return;
        }
        let patch = diff(&self.synced, &self.local);
        if patch.is_empty() {
            return;
        }
        log::trace!("syncing {} operations", patch.len());
        self.transmit.push_back(Frame::Data(patch));
        self.synced = self.local.clone();
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.sync_due
    }

    pub fn poll_transmit(&mut self) -> Option<Frame> {
        self.transmit.pop_front()
    }

    pub fn poll_event(&mut self) -> Option<ConnectionEvent> {
        self.events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hat_json_patch::Op;
    use serde_json::json;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn open() -> Connection {
        let mut conn = Connection::new(ms(100));
        conn.handle_open();
        assert_eq!(conn.poll_event(), Some(ConnectionEvent::Opened));
        conn
    }

    #[test]
    fn not_open_rejects_local_actions() {
        let mut conn = Connection::new(ms(100));
        assert!(matches!(conn.set_local_data(json!(1), ms(0)), Err(JugglerError::NotOpen)));
        assert!(matches!(conn.send(json!("hi")), Err(JugglerError::NotOpen)));
        conn.handle_open();
        conn.handle_close();
        assert!(matches!(conn.send(json!("hi")), Err(JugglerError::NotOpen)));
    }

    #[test]
    fn data_frames_update_remote() {
        let mut conn = open();
        conn.handle_text(r#"{"type": "DATA", "payload": [{"op": "replace", "path": "", "value": {"x": 1}}]}"#)
            .unwrap();
        conn.handle_text(r#"{"type": "DATA", "payload": [{"op": "add", "path": "/y", "value": 2}]}"#)
            .unwrap();
        assert_eq!(conn.remote_data(), &json!({"x": 1, "y": 2}));
        assert_eq!(conn.poll_event(), Some(ConnectionEvent::RemoteData(json!({"x": 1}))));
        assert_eq!(conn.poll_event(), Some(ConnectionEvent::RemoteData(json!({"x": 1, "y": 2}))));
    }

    #[test]
    fn messages_become_events() {
        let mut conn = open();
        conn.handle_text(r#"{"type": "MESSAGE", "payload": "ping"}"#).unwrap();
        assert_eq!(conn.poll_event(), Some(ConnectionEvent::Message(json!("ping"))));
        assert_eq!(conn.remote_data(), &Value::Null);
    }

    #[test]
    fn unknown_frame_closes() {
        let mut conn = open();
        let err = conn.handle_text(r#"{"type": "HELLO", "payload": null}"#).unwrap_err();
        assert!(matches!(err, JugglerError::Protocol(_)));
        assert_eq!(conn.state(), ConnectionState::Closing);
        conn.handle_close();
        assert_eq!(conn.poll_event(), Some(ConnectionEvent::Closed));
    }

    #[test]
    fn unappliable_patch_closes() {
        let mut conn = open();
        let err = conn
            .handle_text(r#"{"type": "DATA", "payload": [{"op": "remove", "path": "/missing"}]}"#)
            .unwrap_err();
        assert!(matches!(err, JugglerError::Protocol(_)));
        assert_eq!(conn.state(), ConnectionState::Closing);
    }

    #[test]
    fn close_resets_remote_and_cancels_sync() {
        let mut conn = open();
        conn.handle_text(r#"{"type": "DATA", "payload": [{"op": "replace", "path": "", "value": 5}]}"#)
            .unwrap();
        conn.set_local_data(json!(1), ms(0)).unwrap();
        conn.handle_close();
        assert_eq!(conn.remote_data(), &Value::Null);
        assert_eq!(conn.next_deadline(), None);
        conn.poll(ms(1000));
        assert!(conn.poll_transmit().is_none());
    }

    #[test]
    fn debounce_coalesces_into_one_frame() {
        let mut conn = open();
        conn.set_local_data(json!({"n": 1}), ms(0)).unwrap();
        conn.set_local_data(json!({"n": 2, "a": true}), ms(30)).unwrap();
        conn.set_local_data(json!({"n": 3, "a": true}), ms(60)).unwrap();
        assert_eq!(conn.next_deadline(), Some(ms(100)));

        conn.poll(ms(100));
        let Some(Frame::Data(patch)) = conn.poll_transmit() else {
            panic!("expected a DATA frame");
        };
        assert!(conn.poll_transmit().is_none());
        assert_eq!(hat_json_patch::apply_patch(&Value::Null, &patch).unwrap(), json!({"n": 3, "a": true}));

        // Next window starts from the synced value.
        conn.set_local_data(json!({"n": 4, "a": true}), ms(150)).unwrap();
        conn.poll(ms(250));
        let Some(Frame::Data(patch)) = conn.poll_transmit() else {
            panic!("expected a DATA frame");
        };
        assert_eq!(patch, vec![
            Op::Test { path: vec!["n".into()], value: json!(3) },
            Op::Replace { path: vec!["n".into()], value: json!(4) },
        ]);
    }

    #[test]
    fn unchanged_local_data_sends_nothing() {
        let mut conn = open();
        conn.set_local_data(json!([1]), ms(0)).unwrap();
        conn.poll(ms(100));
        assert!(conn.poll_transmit().is_some());
        conn.set_local_data(json!([1]), ms(200)).unwrap();
        conn.poll(ms(300));
        assert!(conn.poll_transmit().is_none());
        assert_eq!(conn.next_deadline(), None);
    }
}
