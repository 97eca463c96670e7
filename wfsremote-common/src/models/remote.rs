//! Notifications delivered to the UI when the server changes a parameter.

use serde::{Deserialize, Serialize};

/// Groups of addresses a subscriber can listen to together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterFamily {
    Global,
    Input,
    Marker,
    Cluster,
    Array,
    Device,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepDirection {
    Inc,
    Dec,
}

impl StepDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inc" => Some(StepDirection::Inc),
            "dec" => Some(StepDirection::Dec),
            _ => None,
        }
    }
}

/// A validated, typed change reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RemoteEvent {
    /// `/inputs`: number of inputs the server exposes.
    InputCount(i32),

    InputAttenuation { input: i32, db: f32 },

    InputMute { input: i32, muted: bool },

    InputPositionStep {
        input: i32,
        axis: Axis,
        direction: StepDirection,
        amount: f32,
    },

    MarkerPosition { input: i32, x: f32, y: f32 },

    ClusterPosition { cluster: i32, x: f32, y: f32 },

    ArrayDelayLatency { array: i32, delta_ms: f32 },

    ArrayAttenuation { array: i32, delta_db: f32 },

    /// `/findDevice` passed the password gate.
    FindDevice,
}

impl RemoteEvent {
    pub fn family(&self) -> ParameterFamily {
        match self {
            RemoteEvent::InputCount(_) => ParameterFamily::Global,
            RemoteEvent::InputAttenuation { .. }
            | RemoteEvent::InputMute { .. }
            | RemoteEvent::InputPositionStep { .. } => ParameterFamily::Input,
            RemoteEvent::MarkerPosition { .. } => ParameterFamily::Marker,
            RemoteEvent::ClusterPosition { .. } => ParameterFamily::Cluster,
            RemoteEvent::ArrayDelayLatency { .. } | RemoteEvent::ArrayAttenuation { .. } => {
                ParameterFamily::Array
            }
            RemoteEvent::FindDevice => ParameterFamily::Device,
        }
    }

    /// The id of the input, cluster or array the event concerns, if any.
    pub fn target_id(&self) -> Option<i32> {
        match self {
            RemoteEvent::InputAttenuation { input, .. }
            | RemoteEvent::InputMute { input, .. }
            | RemoteEvent::InputPositionStep { input, .. }
            | RemoteEvent::MarkerPosition { input, .. } => Some(*input),
            RemoteEvent::ClusterPosition { cluster, .. } => Some(*cluster),
            RemoteEvent::ArrayDelayLatency { array, .. }
            | RemoteEvent::ArrayAttenuation { array, .. } => Some(*array),
            RemoteEvent::InputCount(_) | RemoteEvent::FindDevice => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_follows_the_addressed_object() {
        let step = RemoteEvent::InputPositionStep {
            input: 5,
            axis: Axis::Z,
            direction: StepDirection::Dec,
            amount: 0.1,
        };
        assert_eq!(step.target_id(), Some(5));
        assert_eq!(step.family(), ParameterFamily::Input);

        let cluster = RemoteEvent::ClusterPosition { cluster: 2, x: 0.0, y: 1.0 };
        assert_eq!(cluster.target_id(), Some(2));
        assert_eq!(cluster.family(), ParameterFamily::Cluster);

        assert_eq!(RemoteEvent::InputCount(32).target_id(), None);
        assert_eq!(RemoteEvent::FindDevice.target_id(), None);
        assert_eq!(RemoteEvent::FindDevice.family(), ParameterFamily::Device);
    }

    #[test]
    fn step_direction_words() {
        assert_eq!(StepDirection::parse("inc"), Some(StepDirection::Inc));
        assert_eq!(StepDirection::parse("dec"), Some(StepDirection::Dec));
        assert_eq!(StepDirection::parse("up"), None);
    }
}
