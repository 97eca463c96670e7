use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::models::osc::{OscArgument, OscMessage};

/// Identifies one controllable parameter instance on the server.
///
/// `target_id` is the input channel (1-64), cluster (1-10) or array (1-5)
/// number, or 0 for global parameters such as `/inputs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterKey {
    pub address: String,
    pub target_id: i32,
}

impl ParameterKey {
    pub fn new(address: impl Into<String>, target_id: i32) -> Self {
        Self {
            address: address.into(),
            target_id,
        }
    }

    pub fn global(address: impl Into<String>) -> Self {
        Self::new(address, 0)
    }

    pub fn is_global(&self) -> bool {
        self.target_id == 0
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_global() {
            write!(f, "{}", self.address)
        } else {
            write!(f, "{}[{}]", self.address, self.target_id)
        }
    }
}

/// The most recent value waiting to be flushed for a key.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub key: ParameterKey,
    pub value: Vec<OscArgument>,
    pub last_write: Instant,
}

impl PendingUpdate {
    /// Rebuilds the outgoing message: the address, the target id as the
    /// first argument unless the key is global, then the value.
    pub fn to_message(&self) -> OscMessage {
        let mut args = Vec::with_capacity(self.value.len() + 1);
        if !self.key.is_global() {
            args.push(OscArgument::Int32(self.key.target_id));
        }
        args.extend(self.value.iter().cloned());
        OscMessage::new(self.key.address.clone(), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targeted_update_prepends_target_id() {
        let update = PendingUpdate {
            key: ParameterKey::new("/marker/positionXY", 12),
            value: vec![1.5f32.into(), (-2.0f32).into()],
            last_write: Instant::now(),
        };
        let msg = update.to_message();
        assert_eq!(msg.address, "/marker/positionXY");
        assert_eq!(
            msg.args,
            vec![
                OscArgument::Int32(12),
                OscArgument::Float32(1.5),
                OscArgument::Float32(-2.0)
            ]
        );
    }

    #[test]
    fn global_update_sends_value_only() {
        let update = PendingUpdate {
            key: ParameterKey::global("/inputs"),
            value: vec![32i32.into()],
            last_write: Instant::now(),
        };
        assert_eq!(update.to_message().args, vec![OscArgument::Int32(32)]);
        assert_eq!(update.key.to_string(), "/inputs");
    }
}
