use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use rosc::OscType;
use serde::{Deserialize, Serialize};

/// One typed OSC argument. Only the three types the WFS server speaks are
/// representable; everything else is rejected at the codec boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OscArgument {
    Int32(i32),
    Float32(f32),
    Str(String),
}

impl OscArgument {
    /// The OSC type tag character for this argument.
    pub fn type_tag(&self) -> char {
        match self {
            OscArgument::Int32(_) => 'i',
            OscArgument::Float32(_) => 'f',
            OscArgument::Str(_) => 's',
        }
    }

    /// Converts a decoded `rosc` value. Returns the offending type tag for
    /// anything outside `i`, `f` and `s`.
    pub fn from_osc_type(value: OscType) -> Result<Self, char> {
        match value {
            OscType::Int(v) => Ok(OscArgument::Int32(v)),
            OscType::Float(v) => Ok(OscArgument::Float32(v)),
            OscType::String(v) => Ok(OscArgument::Str(v)),
            other => Err(rosc_type_tag(&other)),
        }
    }

    pub fn to_osc_type(&self) -> OscType {
        match self {
            OscArgument::Int32(v) => OscType::Int(*v),
            OscArgument::Float32(v) => OscType::Float(*v),
            OscArgument::Str(v) => OscType::String(v.clone()),
        }
    }
}

fn rosc_type_tag(value: &OscType) -> char {
    match value {
        OscType::Int(_) => 'i',
        OscType::Float(_) => 'f',
        OscType::String(_) => 's',
        OscType::Blob(_) => 'b',
        OscType::Time(_) => 't',
        OscType::Long(_) => 'h',
        OscType::Double(_) => 'd',
        OscType::Char(_) => 'c',
        OscType::Bool(true) => 'T',
        OscType::Bool(false) => 'F',
        OscType::Nil => 'N',
        OscType::Inf => 'I',
        _ => '?',
    }
}

impl From<i32> for OscArgument {
    fn from(v: i32) -> Self {
        OscArgument::Int32(v)
    }
}

impl From<f32> for OscArgument {
    fn from(v: f32) -> Self {
        OscArgument::Float32(v)
    }
}

impl From<&str> for OscArgument {
    fn from(v: &str) -> Self {
        OscArgument::Str(v.to_string())
    }
}

impl From<String> for OscArgument {
    fn from(v: String) -> Self {
        OscArgument::Str(v)
    }
}

impl fmt::Display for OscArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscArgument::Int32(v) => write!(f, "i:{v}"),
            OscArgument::Float32(v) => write!(f, "f:{v}"),
            OscArgument::Str(v) => write!(f, "s:{v}"),
        }
    }
}

/// Parses the `i:3`, `f:-1.5`, `s:inc` notation used on the console.
/// An untagged token is taken as an int if it parses as one, then a float,
/// then a string.
impl FromStr for OscArgument {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("i", v)) => v
                .parse::<i32>()
                .map(OscArgument::Int32)
                .map_err(|e| format!("Failed to parse int '{}': {}", v, e)),
            Some(("f", v)) => v
                .parse::<f32>()
                .map(OscArgument::Float32)
                .map_err(|e| format!("Failed to parse float '{}': {}", v, e)),
            Some(("s", v)) => Ok(OscArgument::Str(v.to_string())),
            _ => {
                if let Ok(v) = s.parse::<i32>() {
                    Ok(OscArgument::Int32(v))
                } else if let Ok(v) = s.parse::<f32>() {
                    Ok(OscArgument::Float32(v))
                } else {
                    Ok(OscArgument::Str(s.to_string()))
                }
            }
        }
    }
}

/// An addressed OSC message with typed arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArgument>,
}

impl OscMessage {
    pub fn new(address: impl Into<String>, args: Vec<OscArgument>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    pub fn to_rosc(&self) -> rosc::OscMessage {
        rosc::OscMessage {
            addr: self.address.clone(),
            args: self.args.iter().map(OscArgument::to_osc_type).collect(),
        }
    }
}

impl fmt::Display for OscMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OscStatus {
    pub is_running: bool,
    /// The port actually bound for incoming traffic, if running.
    pub incoming_port: Option<u16>,
    pub remote_target: SocketAddr,
    pub pending_updates: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_console_notation() {
        assert_eq!("i:3".parse::<OscArgument>().unwrap(), OscArgument::Int32(3));
        assert_eq!("f:-1.5".parse::<OscArgument>().unwrap(), OscArgument::Float32(-1.5));
        assert_eq!("s:inc".parse::<OscArgument>().unwrap(), OscArgument::Str("inc".into()));
        assert_eq!("42".parse::<OscArgument>().unwrap(), OscArgument::Int32(42));
        assert_eq!("0.1".parse::<OscArgument>().unwrap(), OscArgument::Float32(0.1));
        assert_eq!("dec".parse::<OscArgument>().unwrap(), OscArgument::Str("dec".into()));
        assert!("i:abc".parse::<OscArgument>().is_err());
    }

    #[test]
    fn display_lists_arguments_in_order() {
        let msg = OscMessage::new(
            "/remoteInput/positionX",
            vec![3i32.into(), "inc".into(), 0.5f32.into()],
        );
        assert_eq!(msg.to_string(), "/remoteInput/positionX i:3 s:inc f:0.5");
    }

    #[test]
    fn rejects_unsupported_rosc_types() {
        assert_eq!(OscArgument::from_osc_type(OscType::Double(1.0)), Err('d'));
        assert_eq!(OscArgument::from_osc_type(OscType::Bool(true)), Err('T'));
        assert_eq!(
            OscArgument::from_osc_type(OscType::Int(7)),
            Ok(OscArgument::Int32(7))
        );
    }
}
