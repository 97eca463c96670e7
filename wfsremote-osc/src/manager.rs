//! wfsremote-osc/src/manager.rs
//!
//! `RemoteOscManager` owns everything with a lifecycle: the shared config,
//! the transport and its timer, the throttle engine, the handler table and
//! the event bus. UI code talks to this and nothing else.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};
use wfsremote_common::models::{
    NetworkConfig, OscArgument, OscMessage, OscStatus, ParameterFamily, ParameterKey, RemoteEvent,
};

use crate::config::{SettingsStore, SharedConfig};
use crate::dispatch::Dispatcher;
use crate::eventbus::EventBus;
use crate::protocol;
use crate::throttle::ThrottleEngine;
use crate::transport::OscTransport;
use crate::{OscError, Result};

pub struct RemoteOscManager {
    inner: Arc<Mutex<OscManagerInner>>,
    config: SharedConfig,
    throttle: Arc<ThrottleEngine>,
    dispatcher: Arc<Dispatcher>,
    events: EventBus,
    store: Option<SettingsStore>,
}

struct OscManagerInner {
    transport: Option<OscTransport>,
}

impl RemoteOscManager {
    pub fn new(config: NetworkConfig) -> Self {
        let config = SharedConfig::new(config);
        let events = EventBus::new();
        let mut dispatcher = Dispatcher::new();
        protocol::register_remote_handlers(&mut dispatcher, events.clone(), config.clone());

        Self {
            inner: Arc::new(Mutex::new(OscManagerInner { transport: None })),
            config,
            throttle: Arc::new(ThrottleEngine::new()),
            dispatcher: Arc::new(dispatcher),
            events,
            store: None,
        }
    }

    /// Persist config on every successful `apply_settings`.
    pub fn with_settings_store(mut self, store: SettingsStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Binds and starts receiving and flushing. Returns the bound incoming
    /// port. Calling it while running is a no-op.
    pub async fn start(&self) -> Result<u16> {
        let mut guard = self.inner.lock().await;
        if let Some(transport) = guard.transport.as_ref() {
            return Ok(transport.local_port());
        }
        let transport = self.start_transport().await?;
        let port = transport.local_port();
        guard.transport = Some(transport);
        Ok(port)
    }

    /// Closes both sockets and stops the timer. Pending updates stay queued
    /// for the next start. Calling it while stopped is a no-op.
    pub async fn stop(&self) -> Result<()> {
        let mut guard = self.inner.lock().await;
        if let Some(transport) = guard.transport.take() {
            transport.stop().await;
        }
        Ok(())
    }

    /// Stops the transport, installs `config`, saves it if a store is
    /// attached, and starts again. On a bind failure the new config stays
    /// installed and the transport stays stopped, so the caller can retry
    /// with another port.
    pub async fn apply_settings(&self, config: NetworkConfig) -> Result<u16> {
        config.validate()?;

        let mut guard = self.inner.lock().await;
        if let Some(transport) = guard.transport.take() {
            transport.stop().await;
        }

        let previous = self.config.replace(config.clone());
        if previous != config {
            info!(
                "Applying network settings: in={} out={}:{}",
                config.incoming_port, config.remote_host, config.outgoing_port
            );
        }
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&config) {
                warn!("Could not save network settings to {}: {}", store.path().display(), e);
            }
        }

        let transport = self.start_transport().await?;
        let port = transport.local_port();
        guard.transport = Some(transport);
        Ok(port)
    }

    async fn start_transport(&self) -> Result<OscTransport> {
        let config = self.config.snapshot();
        OscTransport::start(&config, self.dispatcher.clone(), self.throttle.clone()).await
    }

    /// Queues `value` for `key`; it goes out on the next tick unless
    /// overwritten first.
    pub fn update(&self, key: ParameterKey, value: Vec<OscArgument>) {
        self.throttle.update(key, value);
    }

    /// Sends immediately, bypassing the throttle.
    pub async fn send_now(&self, message: OscMessage) -> Result<()> {
        let sink = {
            let guard = self.inner.lock().await;
            guard.transport.as_ref().map(|t| t.sink()).ok_or(OscError::NotRunning)?
        };
        sink.send(&message).await
    }

    pub fn subscribe(&self, family: Option<ParameterFamily>) -> mpsc::Receiver<RemoteEvent> {
        self.events.subscribe(family, None)
    }

    pub async fn status(&self) -> OscStatus {
        let configured_target = self.config.read().remote_addr();
        let guard = self.inner.lock().await;
        OscStatus {
            is_running: guard.transport.is_some(),
            incoming_port: guard.transport.as_ref().map(|t| t.local_port()),
            remote_target: guard
                .transport
                .as_ref()
                .map(|t| t.remote_addr())
                .unwrap_or(configured_target),
            pending_updates: self.throttle.pending_len(),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.transport.is_some()
    }

    pub fn config(&self) -> NetworkConfig {
        self.config.snapshot()
    }
}
