use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_INCOMING_PORT: u16 = 8000;
pub const DEFAULT_OUTGOING_PORT: u16 = 8001;
pub const DEFAULT_REMOTE_HOST: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 100);

/// Where to listen, where to send, and the optional find-device password.
///
/// `incoming_port` 0 asks the OS for an ephemeral port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConfig {
    pub incoming_port: u16,
    pub outgoing_port: u16,
    pub remote_host: Ipv4Addr,
    pub find_device_password: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            incoming_port: DEFAULT_INCOMING_PORT,
            outgoing_port: DEFAULT_OUTGOING_PORT,
            remote_host: DEFAULT_REMOTE_HOST,
            find_device_password: None,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.outgoing_port == 0 {
            return Err(Error::InvalidConfig("outgoing port must be non-zero".into()));
        }
        if self.remote_host.is_unspecified() {
            return Err(Error::InvalidConfig(format!(
                "remote host {} is not a usable destination",
                self.remote_host
            )));
        }
        Ok(())
    }

    pub fn remote_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.remote_host, self.outgoing_port))
    }

    /// The find-device gate: with a non-empty password configured the
    /// supplied one must match exactly; otherwise anything passes.
    pub fn password_matches(&self, supplied: Option<&str>) -> bool {
        match self.find_device_password.as_deref() {
            Some(expected) if !expected.is_empty() => supplied == Some(expected),
            _ => true,
        }
    }
}
