//! wfsremote-osc/src/dispatch/mod.rs
//!
//! Exact-address routing of incoming messages to typed handlers.

pub mod args;

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, trace, warn};
use wfsremote_common::models::{OscArgument, OscMessage};

pub use args::{FromOscArg, FromOscArgs};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("expected {expected} argument(s), found {found}")]
    Arity { expected: String, found: usize },

    #[error("argument {index}: expected type '{expected}', found '{found}'")]
    ArgumentType {
        index: usize,
        expected: char,
        found: char,
    },

    #[error("{name} = {value} is outside {allowed}")]
    OutOfRange {
        name: &'static str,
        value: String,
        allowed: String,
    },
}

/// Why a handler refused a message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HandlerError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("password mismatch")]
    Unauthorized,
}

/// What happened to a routed message.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Handled,
    /// No handler for the address.
    Ignored,
    /// Wrong arity, type or value; the handler never ran.
    Rejected(ValidationError),
    /// The find-device password did not match.
    Suppressed,
}

type BoxedHandler = Box<dyn Fn(&[OscArgument]) -> Result<(), HandlerError> + Send + Sync>;

/// Address -> handler table. Built once at startup, then shared read-only.
#[derive(Default)]
pub struct Dispatcher {
    routes: HashMap<String, BoxedHandler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for the exact `address`. The argument list is
    /// converted to `A` before the handler runs; a mismatch rejects the
    /// message.
    pub fn register<A, F>(&mut self, address: impl Into<String>, handler: F)
    where
        A: FromOscArgs + 'static,
        F: Fn(A) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let address = address.into();
        let wrapped = move |args: &[OscArgument]| -> Result<(), HandlerError> {
            let typed = A::from_osc_args(args)?;
            handler(typed)
        };
        if self.routes.insert(address.clone(), Box::new(wrapped)).is_some() {
            warn!("Replaced existing OSC handler for {}", address);
        }
    }

    pub fn is_registered(&self, address: &str) -> bool {
        self.routes.contains_key(address)
    }

    pub fn addresses(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        out.sort_unstable();
        out
    }

    pub fn route(&self, message: &OscMessage) -> RouteOutcome {
        let Some(handler) = self.routes.get(&message.address) else {
            trace!("No OSC handler for {}", message.address);
            return RouteOutcome::Ignored;
        };

        match handler(&message.args) {
            Ok(()) => {
                debug!("OSC message => {}", message);
                RouteOutcome::Handled
            }
            Err(HandlerError::Unauthorized) => {
                debug!("Suppressed {}: password mismatch", message.address);
                RouteOutcome::Suppressed
            }
            Err(HandlerError::Invalid(e)) => {
                warn!("Rejected {}: {}", message, e);
                RouteOutcome::Rejected(e)
            }
        }
    }
}
