//! wfsremote-osc/src/lib.rs
//!
//! The OSC engine for the WFS remote: wire codec, UDP transport, address
//! dispatch, outgoing throttling, and the manager that ties them together.

pub mod api;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod eventbus;
pub mod manager;
pub mod protocol;
pub mod throttle;
pub mod transport;

use thiserror::Error;

pub use api::RemoteApi;
pub use codec::{DecodeError, EncodeError};
pub use config::{SettingsStore, SharedConfig};
pub use dispatch::{Dispatcher, HandlerError, RouteOutcome, ValidationError};
pub use eventbus::EventBus;
pub use manager::RemoteOscManager;
pub use throttle::{FlushReport, OscSink, ThrottleEngine, THROTTLE_INTERVAL};
pub use transport::OscTransport;

#[derive(Error, Debug)]
pub enum OscError {
    #[error("OSC encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Could not bind UDP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("OSC send error: {0}")]
    Send(String),

    #[error("OSC transport is not running")]
    NotRunning,

    #[error("OSC I/O error: {0}")]
    IoError(String),

    #[error(transparent)]
    Common(#[from] wfsremote_common::Error),
}

pub type Result<T> = std::result::Result<T, OscError>;
