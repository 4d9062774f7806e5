//! Reconnecting application bound to a renderer's state.
//!
//! [`Application`] keeps at most one [`Connection`] alive. The first attempt
//! is due immediately; after every close exactly one new attempt becomes due
//! `retry_delay` later. While a connection is open, the value at the local
//! path of the renderer state is pushed to the peer, and the peer's value is
//! written to the remote path (`null` while disconnected).

use std::time::Duration;

use hat_renderer::{DomApi, Renderer};
use hat_util::StatePath;
use serde_json::Value;

use crate::connection::{Connection, ConnectionEvent, ConnectionState};
use crate::frame::Frame;
use crate::settings::Settings;
use crate::JugglerError;

type MessageHandler = Box<dyn FnMut(&Value)>;

pub struct Application {
    settings: Settings,
    local_path: Option<StatePath>,
    remote_path: Option<StatePath>,
    connection: Option<Connection>,
    next_attempt: Option<Duration>,
    on_message: Option<MessageHandler>,
}

impl Application {
    pub fn new(settings: Settings, local_path: Option<StatePath>, remote_path: Option<StatePath>) -> Self {
        Self {
            settings,
            local_path,
            remote_path,
            connection: None,
            next_attempt: Some(Duration::ZERO),
            on_message: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Called with the payload of every `MESSAGE` frame.
    pub fn on_message(&mut self, handler: impl FnMut(&Value) + 'static) {
        self.on_message = Some(Box::new(handler));
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::is_open)
    }

    /// Starts a connection attempt if one is due. Returns `true` when the
    /// host should open a transport now.
    pub fn poll_connect(&mut self, now: Duration) -> bool {
        match self.next_attempt {
            Some(due) if due <= now && self.connection.is_none() => {
                log::info!("connecting");
                self.next_attempt = None;
                self.connection = Some(Connection::new(self.settings.sync_delay));
                true
            }
            _ => false,
        }
    }

    pub fn handle_open<D: DomApi>(&mut self, renderer: &mut Renderer<D>, now: Duration) {
        if let Some(conn) = &mut self.connection {
            conn.handle_open();
        }
        self.state_changed(renderer, now);
        self.drain_events(renderer, now);
    }

    /// Feeds one inbound text frame. A protocol error is logged, starts
    /// closing the connection and is returned.
    pub fn handle_text<D: DomApi>(
        &mut self,
        renderer: &mut Renderer<D>,
        text: &str,
        now: Duration,
    ) -> Result<(), JugglerError> {
        let conn = self.connection.as_mut().ok_or(JugglerError::NotOpen)?;
        let result = conn.handle_text(text);
        self.drain_events(renderer, now);
        result
    }

    /// The transport closed, or failed to open.
    pub fn handle_close<D: DomApi>(&mut self, renderer: &mut Renderer<D>, now: Duration) {
        if let Some(conn) = &mut self.connection {
            conn.handle_close();
        }
        self.drain_events(renderer, now);
        self.connection = None;
        let due = now + self.settings.retry_delay;
        log::info!("reconnecting in {:?}", self.settings.retry_delay);
        self.next_attempt = Some(due);
    }

    /// Pushes the current local value after the renderer state changed.
    pub fn state_changed<D: DomApi>(&mut self, renderer: &Renderer<D>, now: Duration) {
        let (Some(conn), Some(path)) = (&mut self.connection, &self.local_path) else {
            return;
        };
        if conn.is_open() {
            let data = renderer.get(path).clone();
            if let Err(err) = conn.set_local_data(data, now) {
                log::debug!("local data not pushed: {err}");
            }
        }
    }

    /// Sends a `MESSAGE` frame.
    pub fn send(&mut self, msg: Value) -> Result<(), JugglerError> {
        match &mut self.connection {
            Some(conn) => conn.send(msg),
            None => Err(JugglerError::NotOpen),
        }
    }

    /// Asks the host to close the current transport.
    pub fn close(&mut self) {
        if let Some(conn) = &mut self.connection {
            conn.close();
        }
    }

    /// Runs the sync timer.
    pub fn poll(&mut self, now: Duration) {
        if let Some(conn) = &mut self.connection {
            conn.poll(now);
        }
    }

    pub fn poll_transmit(&mut self) -> Option<Frame> {
        self.connection.as_mut()?.poll_transmit()
    }

    /// Whether the host should close its transport.
    pub fn wants_close(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|conn| conn.state() == ConnectionState::Closing)
    }

    /// Earliest of the sync deadline and the next connection attempt.
    pub fn next_deadline(&self) -> Option<Duration> {
        let sync = self.connection.as_ref().and_then(Connection::next_deadline);
        match (sync, self.next_attempt) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn drain_events<D: DomApi>(&mut self, renderer: &mut Renderer<D>, now: Duration) {
        let Some(conn) = &mut self.connection else {
            return;
        };
        while let Some(event) = conn.poll_event() {
            match event {
                ConnectionEvent::Opened => log::info!("connected"),
                ConnectionEvent::RemoteData(value) => {
                    if let Some(path) = &self.remote_path {
                        renderer.set(path.clone(), value);
                    }
                }
                ConnectionEvent::Message(payload) => match &mut self.on_message {
                    Some(handler) => handler(&payload),
                    None => log::debug!("unhandled message {payload}"),
                },
                ConnectionEvent::Closed => {
                    log::info!("disconnected");
                    if let Some(path) = &self.remote_path {
                        renderer.set(path.clone(), Value::Null);
                    }
                }
            }
        }
        if renderer.process(now) {
            self.state_changed(renderer, now);
        }
    }
}
