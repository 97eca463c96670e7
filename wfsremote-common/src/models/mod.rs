// File: wfsremote-common/src/models/mod.rs
pub mod osc;
pub mod parameter;
pub mod network;
pub mod remote;

pub use osc::{OscArgument, OscMessage, OscStatus};
pub use parameter::{ParameterKey, PendingUpdate};
pub use network::NetworkConfig;
pub use remote::{Axis, ParameterFamily, RemoteEvent, StepDirection};
