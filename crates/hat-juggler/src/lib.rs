//! hat-juggler - keeps a local and a remote JSON value in sync over a
//! persistent text connection.
//!
//! - [`frame`] wire frames (`DATA` patches and opaque `MESSAGE`s)
//! - [`settings`] timing and address settings, loadable from TOML
//! - [`address`] derives the `ws[s]://host[:port]/ws` endpoint
//! - [`connection`] sans-IO state machine for one connection
//! - [`application`] reconnect loop bridged to a [`hat_renderer::Renderer`]
//! - `client` async driver on tokio and tungstenite (feature `client`)
//!
//! Nothing here reads the clock: every call that depends on time takes `now`
//! as a monotonic [`Duration`](std::time::Duration), and every timer is a
//! deadline the caller polls.

pub mod address;
pub mod application;
#[cfg(feature = "client")]
pub mod client;
pub mod connection;
pub mod frame;
pub mod settings;

pub use application::Application;
pub use connection::{Connection, ConnectionEvent, ConnectionState};
pub use frame::Frame;
pub use settings::Settings;

use hat_json_patch::PatchError;

#[derive(Debug, thiserror::Error)]
pub enum JugglerError {
    #[error("connection is not open")]
    NotOpen,

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),
}
