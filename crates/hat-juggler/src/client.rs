//! Async driver on tokio.
//!
//! [`run`] connects with tokio-tungstenite and reconnects forever.
//! [`run_session`] drives one established connection and works on any text
//! sink and stream, so tests can use in-memory channels.

use std::fmt::Display;
use std::pin::pin;
use std::time::Duration;

use futures_util::{future, Sink, SinkExt, Stream, StreamExt, TryStreamExt};
use hat_renderer::{DomApi, Renderer};
use tokio::time::{sleep_until, Instant};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::address;
use crate::application::Application;
use crate::JugglerError;

/// Monotonic time since the driver started, as the sans-IO types expect it.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    pub fn instant(&self, at: Duration) -> Instant {
        self.origin + at
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Connects to the configured address, or the one derived from `page`, and
/// keeps reconnecting after every close. The renderer keeps being polled
/// while no connection is open. Only returns on a configuration error.
pub async fn run<D: DomApi>(
    app: &mut Application,
    renderer: &mut Renderer<D>,
    page: Option<&str>,
) -> Result<(), JugglerError> {
    let url = address::resolve(app.settings().address.as_deref(), page)?;
    let clock = Clock::new();
    loop {
        pump(app, renderer, clock.now());
        if !app.poll_connect(clock.now()) {
            match next_deadline(app, renderer) {
                Some(due) => sleep_until(clock.instant(due)).await,
                None => future::pending::<()>().await,
            }
            continue;
        }
        log::debug!("connecting to {url}");
        let mut connect = pin!(tokio_tungstenite::connect_async(url.as_str()));
        let connected = loop {
            let deadline = renderer.next_deadline();
            tokio::select! {
                result = &mut connect => break result,
                _ = sleep_until(clock.instant(deadline.unwrap_or_default())), if deadline.is_some() => {
                    pump(app, renderer, clock.now());
                }
            }
        };
        match connected {
            Ok((ws, _)) => {
                let (sink, stream) = ws.split();
                let tx = sink.with(|text: String| future::ready(Ok::<_, WsError>(Message::Text(text))));
                let rx = stream.try_filter_map(|msg| {
                    future::ready(Ok(match msg {
                        Message::Text(text) => Some(text),
                        _ => None,
                    }))
                });
                if let Err(err) = run_session(app, renderer, &clock, tx, rx).await {
                    log::warn!("session ended: {err}");
                }
            }
            Err(err) => {
                log::warn!("cannot connect to {url}: {err}");
                app.handle_close(renderer, clock.now());
            }
        }
    }
}

/// Applies queued state changes, renders if due and runs the sync timer.
fn pump<D: DomApi>(app: &mut Application, renderer: &mut Renderer<D>, now: Duration) {
    if renderer.process(now) {
        app.state_changed(renderer, now);
    }
    renderer.poll(now);
    app.poll(now);
}

fn next_deadline<D: DomApi>(app: &Application, renderer: &Renderer<D>) -> Option<Duration> {
    match (app.next_deadline(), renderer.next_deadline()) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Drives one open connection until the peer closes it, the transport
/// fails, or a protocol violation closes it locally. The application is
/// closed and its retry scheduled when this returns.
pub async fn run_session<D, Tx, Rx, E>(
    app: &mut Application,
    renderer: &mut Renderer<D>,
    clock: &Clock,
    tx: Tx,
    rx: Rx,
) -> Result<(), JugglerError>
where
    D: DomApi,
    Tx: Sink<String>,
    Tx::Error: Display,
    Rx: Stream<Item = Result<String, E>>,
    E: Display,
{
    let mut tx = pin!(tx);
    let mut rx = pin!(rx);
    app.handle_open(renderer, clock.now());

    loop {
        pump(app, renderer, clock.now());

        while let Some(frame) = app.poll_transmit() {
            if let Err(err) = tx.send(frame.encode()).await {
                app.handle_close(renderer, clock.now());
                return Err(JugglerError::Transport(err.to_string()));
            }
        }
        if app.wants_close() {
            if let Err(err) = tx.close().await {
                log::debug!("close failed: {err}");
            }
            app.handle_close(renderer, clock.now());
            return Ok(());
        }

        let deadline = next_deadline(app, renderer);
        tokio::select! {
            msg = rx.next() => match msg {
                Some(Ok(text)) => {
                    if let Err(err) = app.handle_text(renderer, &text, clock.now()) {
                        log::debug!("frame rejected: {err}");
                    }
                }
                Some(Err(err)) => {
                    app.handle_close(renderer, clock.now());
                    return Err(JugglerError::Transport(err.to_string()));
                }
                None => {
                    app.handle_close(renderer, clock.now());
                    return Ok(());
                }
            },
            _ = sleep_until(clock.instant(deadline.unwrap_or_default())), if deadline.is_some() => {}
        }
    }
}
