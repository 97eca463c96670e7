//! wfsremote-osc/src/config.rs
//!
//! The process-wide network configuration and its JSON settings file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, info};
use wfsremote_common::Error;
use wfsremote_common::models::NetworkConfig;

/// Shared handle to the active `NetworkConfig`. Read by the transport at
/// start and by the find-device handler on every message; replaced only by
/// an apply.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<NetworkConfig>>,
}

impl SharedConfig {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, NetworkConfig> {
        self.inner.read()
    }

    pub fn snapshot(&self) -> NetworkConfig {
        self.inner.read().clone()
    }

    /// Swaps in `config`, returning the previous one.
    pub fn replace(&self, config: NetworkConfig) -> NetworkConfig {
        std::mem::replace(&mut *self.inner.write(), config)
    }
}

/// Loads and saves `NetworkConfig` as JSON.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/wfs-remote/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wfs-remote").join("settings.json"))
    }

    pub fn at_default_location() -> Result<Self, Error> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| Error::InvalidConfig("no user configuration directory".into()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the settings file. A missing or empty file yields the defaults.
    pub fn load(&self) -> Result<NetworkConfig, Error> {
        if !self.path.exists() {
            info!("No settings at {}, using defaults", self.path.display());
            return Ok(NetworkConfig::default());
        }

        let bytes = fs::read(&self.path)?;
        // Editors on some platforms save JSON with a BOM.
        let content = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        if content.iter().all(u8::is_ascii_whitespace) {
            debug!("Settings file {} is empty, using defaults", self.path.display());
            return Ok(NetworkConfig::default());
        }

        let config: NetworkConfig = serde_json::from_slice(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &NetworkConfig) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(config)?;
        fs::write(&self.path, json)?;
        debug!("Saved network settings to {}", self.path.display());
        Ok(())
    }
}
