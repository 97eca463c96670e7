//! wfsremote-osc/src/eventbus.rs
//!
//! Fans validated remote changes out to UI subscribers.
//!
//! Publishing never blocks: it runs on the receive loop, so a subscriber
//! whose queue is full loses the event (logged) instead of stalling
//! reception.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;
use wfsremote_common::models::{ParameterFamily, RemoteEvent};

/// Default size for each subscriber's buffer.
const DEFAULT_BUFFER_SIZE: usize = 1024;

struct Subscriber {
    family: Option<ParameterFamily>,
    tx: mpsc::Sender<RemoteEvent>,
}

#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a receiver for events of `family`, or of every family when
    /// `None`.
    pub fn subscribe(
        &self,
        family: Option<ParameterFamily>,
        buffer_size: Option<usize>,
    ) -> mpsc::Receiver<RemoteEvent> {
        let (tx, rx) = mpsc::channel(buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE));
        self.subscribers.lock().push(Subscriber { family, tx });
        rx
    }

    /// Delivers `event` to every matching subscriber. Returns how many
    /// received it. Dropped receivers are pruned here.
    pub fn publish(&self, event: RemoteEvent) -> usize {
        let family = event.family();
        let mut subs = self.subscribers.lock();
        subs.retain(|s| !s.tx.is_closed());

        let mut delivered = 0;
        for sub in subs.iter().filter(|s| s.family.is_none_or(|f| f == family)) {
            match sub.tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(ev)) => {
                    warn!("Subscriber queue full, dropping {:?}", ev);
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subs = self.subscribers.lock();
        subs.retain(|s| !s.tx.is_closed());
        subs.len()
    }
}
