//! wfsremote-osc/src/api.rs
//!
//! The surface a front end (console, mobile UI bridge) drives the engine
//! through, so it can hold an `Arc<dyn RemoteApi>` instead of the concrete
//! manager.

use async_trait::async_trait;
use tokio::sync::mpsc;
use wfsremote_common::models::{
    NetworkConfig, OscArgument, OscMessage, OscStatus, ParameterFamily, ParameterKey, RemoteEvent,
};

use crate::manager::RemoteOscManager;
use crate::Result;

#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn osc_start(&self) -> Result<u16>;
    async fn osc_stop(&self) -> Result<()>;
    async fn osc_restart(&self) -> Result<u16> {
        self.osc_stop().await?;
        self.osc_start().await
    }
    async fn osc_status(&self) -> OscStatus;
    async fn osc_apply_settings(&self, config: NetworkConfig) -> Result<u16>;
    async fn osc_send(&self, message: OscMessage) -> Result<()>;

    fn osc_update(&self, key: ParameterKey, value: Vec<OscArgument>);
    fn osc_subscribe(&self, family: Option<ParameterFamily>) -> mpsc::Receiver<RemoteEvent>;
    fn osc_config(&self) -> NetworkConfig;
}

#[async_trait]
impl RemoteApi for RemoteOscManager {
    async fn osc_start(&self) -> Result<u16> {
        self.start().await
    }

    async fn osc_stop(&self) -> Result<()> {
        self.stop().await
    }

    async fn osc_status(&self) -> OscStatus {
        self.status().await
    }

    async fn osc_apply_settings(&self, config: NetworkConfig) -> Result<u16> {
        self.apply_settings(config).await
    }

    async fn osc_send(&self, message: OscMessage) -> Result<()> {
        self.send_now(message).await
    }

    fn osc_update(&self, key: ParameterKey, value: Vec<OscArgument>) {
        self.update(key, value)
    }

    fn osc_subscribe(&self, family: Option<ParameterFamily>) -> mpsc::Receiver<RemoteEvent> {
        self.subscribe(family)
    }

    fn osc_config(&self) -> NetworkConfig {
        self.config()
    }
}
