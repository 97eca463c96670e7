//! wfsremote-osc/src/protocol.rs
//!
//! The WFS server's address space: argument shapes and valid ranges for
//! every incoming address, and the handlers that turn them into
//! `RemoteEvent`s.
//!
//!   /inputs                    <i:count>
//!   /remoteInput/attenuation   <i:input> <f:dB>              dB in [-92, 0]
//!   /remoteInput/mute          <i:input> <i:0|1>
//!   /remoteInput/positionX|Y|Z <i:input> <s:inc|dec> <f:amount>
//!   /marker/positionXY         <i:input> <f:x> <f:y>
//!   /cluster/positionXY        <i:cluster> <f:x> <f:y>
//!   /arrayAdjust/delayLatency  <i:array> <f:delta>            delta in {±1, ±0.1}
//!   /arrayAdjust/attenuation   <i:array> <f:delta>            delta in {±1, ±0.1}
//!   /findDevice                [s:password]

use std::ops::RangeInclusive;

use wfsremote_common::models::{Axis, RemoteEvent, StepDirection};

use crate::config::SharedConfig;
use crate::dispatch::{Dispatcher, HandlerError, ValidationError};
use crate::eventbus::EventBus;

pub const INPUTS: &str = "/inputs";
pub const INPUT_ATTENUATION: &str = "/remoteInput/attenuation";
pub const INPUT_MUTE: &str = "/remoteInput/mute";
pub const INPUT_POSITION_X: &str = "/remoteInput/positionX";
pub const INPUT_POSITION_Y: &str = "/remoteInput/positionY";
pub const INPUT_POSITION_Z: &str = "/remoteInput/positionZ";
pub const MARKER_POSITION_XY: &str = "/marker/positionXY";
pub const CLUSTER_POSITION_XY: &str = "/cluster/positionXY";
pub const ARRAY_DELAY_LATENCY: &str = "/arrayAdjust/delayLatency";
pub const ARRAY_ATTENUATION: &str = "/arrayAdjust/attenuation";
pub const FIND_DEVICE: &str = "/findDevice";

pub const MAX_INPUTS: i32 = 64;
pub const MAX_CLUSTERS: i32 = 10;
pub const MAX_ARRAYS: i32 = 5;

pub const ATTENUATION_DB: RangeInclusive<f32> = -92.0..=0.0;

/// The only deltas the array adjust buttons produce.
pub const ARRAY_ADJUST_STEPS: [f32; 4] = [1.0, -1.0, 0.1, -0.1];
const STEP_TOLERANCE: f32 = 1e-4;

pub fn check_id(name: &'static str, value: i32, max: i32) -> Result<i32, ValidationError> {
    if (1..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            name,
            value: value.to_string(),
            allowed: format!("1..={max}"),
        })
    }
}

/// NaN is never in range.
pub fn check_range(
    name: &'static str,
    value: f32,
    range: &RangeInclusive<f32>,
) -> Result<f32, ValidationError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            name,
            value: value.to_string(),
            allowed: format!("[{}, {}]", range.start(), range.end()),
        })
    }
}

pub fn check_finite(name: &'static str, value: f32) -> Result<f32, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            name,
            value: value.to_string(),
            allowed: "finite values".into(),
        })
    }
}

/// Snaps `value` onto one of `ARRAY_ADJUST_STEPS`.
pub fn check_step(name: &'static str, value: f32) -> Result<f32, ValidationError> {
    ARRAY_ADJUST_STEPS
        .iter()
        .copied()
        .find(|step| (value - step).abs() < STEP_TOLERANCE)
        .ok_or_else(|| ValidationError::OutOfRange {
            name,
            value: value.to_string(),
            allowed: "{±1.0, ±0.1}".into(),
        })
}

fn check_flag(name: &'static str, value: i32) -> Result<bool, ValidationError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ValidationError::OutOfRange {
            name,
            value: other.to_string(),
            allowed: "{0, 1}".into(),
        }),
    }
}

fn check_direction(value: &str) -> Result<StepDirection, ValidationError> {
    StepDirection::parse(value).ok_or_else(|| ValidationError::OutOfRange {
        name: "direction",
        value: value.to_string(),
        allowed: "{inc, dec}".into(),
    })
}

/// Registers every address above on `dispatcher`. Valid messages are
/// published on `events`; `/findDevice` is checked against `config`.
pub fn register_remote_handlers(dispatcher: &mut Dispatcher, events: EventBus, config: SharedConfig) {
    let bus = events.clone();
    dispatcher.register(INPUTS, move |(count,): (i32,)| {
        let count = check_id("inputs", count, MAX_INPUTS)?;
        bus.publish(RemoteEvent::InputCount(count));
        Ok(())
    });

    let bus = events.clone();
    dispatcher.register(INPUT_ATTENUATION, move |(input, db): (i32, f32)| {
        let input = check_id("input", input, MAX_INPUTS)?;
        let db = check_range("attenuation", db, &ATTENUATION_DB)?;
        bus.publish(RemoteEvent::InputAttenuation { input, db });
        Ok(())
    });

    let bus = events.clone();
    dispatcher.register(INPUT_MUTE, move |(input, state): (i32, i32)| {
        let input = check_id("input", input, MAX_INPUTS)?;
        let muted = check_flag("mute", state)?;
        bus.publish(RemoteEvent::InputMute { input, muted });
        Ok(())
    });

    for (address, axis) in [
        (INPUT_POSITION_X, Axis::X),
        (INPUT_POSITION_Y, Axis::Y),
        (INPUT_POSITION_Z, Axis::Z),
    ] {
        let bus = events.clone();
        dispatcher.register(
            address,
            move |(input, direction, amount): (i32, String, f32)| {
                let input = check_id("input", input, MAX_INPUTS)?;
                let direction = check_direction(&direction)?;
                let amount = check_range("amount", amount, &(0.0..=f32::MAX))?;
                bus.publish(RemoteEvent::InputPositionStep {
                    input,
                    axis,
                    direction,
                    amount,
                });
                Ok(())
            },
        );
    }

    let bus = events.clone();
    dispatcher.register(MARKER_POSITION_XY, move |(input, x, y): (i32, f32, f32)| {
        let input = check_id("input", input, MAX_INPUTS)?;
        let x = check_finite("x", x)?;
        let y = check_finite("y", y)?;
        bus.publish(RemoteEvent::MarkerPosition { input, x, y });
        Ok(())
    });

    let bus = events.clone();
    dispatcher.register(CLUSTER_POSITION_XY, move |(cluster, x, y): (i32, f32, f32)| {
        let cluster = check_id("cluster", cluster, MAX_CLUSTERS)?;
        let x = check_finite("x", x)?;
        let y = check_finite("y", y)?;
        bus.publish(RemoteEvent::ClusterPosition { cluster, x, y });
        Ok(())
    });

    let bus = events.clone();
    dispatcher.register(ARRAY_DELAY_LATENCY, move |(array, delta): (i32, f32)| {
        let array = check_id("array", array, MAX_ARRAYS)?;
        let delta_ms = check_step("delay delta", delta)?;
        bus.publish(RemoteEvent::ArrayDelayLatency { array, delta_ms });
        Ok(())
    });

    let bus = events.clone();
    dispatcher.register(ARRAY_ATTENUATION, move |(array, delta): (i32, f32)| {
        let array = check_id("array", array, MAX_ARRAYS)?;
        let delta_db = check_step("attenuation delta", delta)?;
        bus.publish(RemoteEvent::ArrayAttenuation { array, delta_db });
        Ok(())
    });

    let bus = events;
    dispatcher.register(FIND_DEVICE, move |password: Option<String>| {
        if !config.read().password_matches(password.as_deref()) {
            return Err(HandlerError::Unauthorized);
        }
        bus.publish(RemoteEvent::FindDevice);
        Ok(())
    });
}
