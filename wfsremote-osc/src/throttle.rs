//! wfsremote-osc/src/throttle.rs
//!
//! Coalesces outgoing parameter updates so each key goes out at most once
//! per interval, always carrying its most recent value.
//!
//! Producers call `update` from any thread. The flush loop wakes every
//! `THROTTLE_INTERVAL`, swaps the pending table out under the lock, and
//! sends the snapshot with the lock released. A key updated N times between
//! two ticks is sent once, with the N-th value. A value whose send fails is
//! gone: it left the table when the snapshot was taken.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace, warn};
use wfsremote_common::models::{OscArgument, OscMessage, ParameterKey, PendingUpdate};

use crate::Result;

/// 50 Hz.
pub const THROTTLE_INTERVAL: Duration = Duration::from_millis(20);

/// Somewhere flushed messages go. The UDP transport in production, a
/// recorder in tests.
#[async_trait]
pub trait OscSink: Send + Sync {
    async fn send(&self, message: &OscMessage) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub sent: usize,
    pub failed: usize,
}

pub struct ThrottleEngine {
    pending: Mutex<HashMap<ParameterKey, PendingUpdate>>,
}

impl Default for ThrottleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ThrottleEngine {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Records `value` as the latest for `key`, replacing anything not yet
    /// flushed. Last writer wins; the whole value is swapped under the lock.
    pub fn update(&self, key: ParameterKey, value: Vec<OscArgument>) {
        let mut pending = self.pending.lock();
        let now = Instant::now();
        match pending.entry(key) {
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                entry.value = value;
                entry.last_write = now;
            }
            Entry::Vacant(slot) => {
                let key = slot.key().clone();
                slot.insert(PendingUpdate {
                    key,
                    value,
                    last_write: now,
                });
            }
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Takes every pending update and leaves the table empty. Sorted by key
    /// so flush order is stable.
    pub fn take_pending(&self) -> Vec<PendingUpdate> {
        let drained = std::mem::take(&mut *self.pending.lock());
        let mut batch: Vec<PendingUpdate> = drained.into_values().collect();
        batch.sort_by(|a, b| a.key.cmp(&b.key));
        batch
    }

    /// One tick: send everything pending. Failures are logged and counted;
    /// they do not stop the rest of the batch.
    pub async fn flush(&self, sink: &dyn OscSink) -> FlushReport {
        let batch = self.take_pending();
        let mut report = FlushReport::default();
        if batch.is_empty() {
            return report;
        }

        for update in batch {
            let message = update.to_message();
            match sink.send(&message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!("Dropped update for {}: {}", update.key, e);
                }
            }
        }
        trace!("Flushed {} update(s), {} failed", report.sent, report.failed);
        report
    }
}

/// Runs `engine.flush` every `THROTTLE_INTERVAL` until `stop_rx` turns true or its
/// sender is dropped.
pub async fn run_flush_loop(
    engine: Arc<ThrottleEngine>,
    sink: Arc<dyn OscSink>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(THROTTLE_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                engine.flush(sink.as_ref()).await;
            }
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }
    debug!("Throttle flush loop stopped");
}
