// tests/test_utils/mod.rs (shared mocks for the integration tests)
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use wfsremote_common::models::OscMessage;
use wfsremote_osc::{OscError, OscSink};

/// Records every message it is asked to send, with the (tokio) time of the
/// send.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub sent: Arc<Mutex<Vec<(Instant, OscMessage)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<OscMessage> {
        self.sent.lock().await.iter().map(|(_, m)| m.clone()).collect()
    }

    pub async fn messages_for(&self, address: &str) -> Vec<OscMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(_, m)| m.address == address)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl OscSink for RecordingSink {
    async fn send(&self, message: &OscMessage) -> Result<(), OscError> {
        self.sent.lock().await.push((Instant::now(), message.clone()));
        Ok(())
    }
}

/// Fails every send whose address matches `fail_address`, records the rest.
#[derive(Clone)]
pub struct FailingSink {
    pub fail_address: String,
    pub inner: RecordingSink,
}

impl FailingSink {
    pub fn new(fail_address: &str) -> Self {
        Self {
            fail_address: fail_address.to_string(),
            inner: RecordingSink::new(),
        }
    }
}

#[async_trait]
impl OscSink for FailingSink {
    async fn send(&self, message: &OscMessage) -> Result<(), OscError> {
        if message.address == self.fail_address {
            return Err(OscError::Send(format!("refusing {}", message.address)));
        }
        self.inner.send(message).await
    }
}

pub fn shared(sink: &RecordingSink) -> Arc<dyn OscSink> {
    Arc::new(sink.clone())
}
