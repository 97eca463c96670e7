//! wfsremote-osc/src/codec.rs
//!
//! OSC datagram <-> `OscMessage` conversion.
//!
//! Layout of a message:
//!   address string, NUL-padded to 4 bytes
//!   type tag string (`,` then one of `i` `f` `s` per argument), NUL-padded
//!   arguments, big-endian 4-byte ints/floats, strings NUL-padded
//!
//! `rosc` does the byte-level work. This module frames and checks what
//! `rosc` is lenient about (missing type tags, argument types the server
//! never sends, trailing bytes) and converts into the typed model.

use rosc::{decoder, encoder, OscPacket};
use thiserror::Error;
use wfsremote_common::models::{OscArgument, OscMessage};

const BUNDLE_TAG: &[u8] = b"#bundle\0";
/// Tag plus time tag.
const BUNDLE_HEADER_LEN: usize = 16;
const MAX_BUNDLE_DEPTH: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty datagram")]
    Empty,

    #[error("address does not start with '/'")]
    InvalidAddress,

    #[error("type tag string is missing")]
    MissingTypeTags,

    #[error("unsupported type tag '{0}'")]
    UnsupportedType(char),

    #[error("datagram truncated: {0}")]
    Truncated(&'static str),

    #[error("{0} byte(s) left over after the declared arguments")]
    TrailingBytes(usize),

    #[error("bundle where a single message was expected")]
    UnexpectedBundle,

    #[error("malformed packet: {0}")]
    Malformed(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("address '{0}' must start with '/' and contain no NUL byte")]
    InvalidAddress(String),

    #[error("string argument {index} contains a NUL byte")]
    NulInString { index: usize },

    #[error("encoder failed: {0}")]
    Encoder(String),
}

/// Serializes one message into a UDP payload.
pub fn encode(message: &OscMessage) -> Result<Vec<u8>, EncodeError> {
    if !message.address.starts_with('/') || message.address.contains('\0') {
        return Err(EncodeError::InvalidAddress(message.address.clone()));
    }
    for (index, arg) in message.args.iter().enumerate() {
        if let OscArgument::Str(s) = arg {
            if s.contains('\0') {
                return Err(EncodeError::NulInString { index });
            }
        }
    }

    let packet = OscPacket::Message(message.to_rosc());
    encoder::encode(&packet).map_err(|e| EncodeError::Encoder(format!("{e:?}")))
}

/// Parses a datagram that must hold exactly one message.
pub fn decode(bytes: &[u8]) -> Result<OscMessage, DecodeError> {
    match bytes.first() {
        None => return Err(DecodeError::Empty),
        Some(b'/') => {}
        Some(_) if bytes.starts_with(BUNDLE_TAG) => return Err(DecodeError::UnexpectedBundle),
        Some(_) => return Err(DecodeError::InvalidAddress),
    }
    check_message_frame(bytes)?;

    let (rest, packet) = decoder::decode_udp(bytes).map_err(rosc_error)?;
    if !rest.is_empty() {
        return Err(DecodeError::TrailingBytes(rest.len()));
    }
    match packet {
        OscPacket::Message(msg) => convert_message(msg),
        OscPacket::Bundle(_) => Err(DecodeError::UnexpectedBundle),
    }
}

/// Parses a datagram holding either a message or a bundle. Bundles are
/// flattened, nested ones included, keeping their order. Every message
/// element gets the same checks as `decode`.
pub fn decode_datagram(bytes: &[u8]) -> Result<Vec<OscMessage>, DecodeError> {
    if !bytes.starts_with(BUNDLE_TAG) {
        return decode(bytes).map(|msg| vec![msg]);
    }

    let mut out = Vec::new();
    flatten_bundle(bytes, 1, &mut out)?;
    Ok(out)
}

/// Walks one bundle by its element size prefixes:
///   `#bundle\0`, 8-byte time tag, then (i32 size, element) repeated
fn flatten_bundle(bytes: &[u8], depth: usize, out: &mut Vec<OscMessage>) -> Result<(), DecodeError> {
    if depth > MAX_BUNDLE_DEPTH {
        return Err(DecodeError::Malformed("bundle nested too deep".into()));
    }
    if bytes.len() < BUNDLE_HEADER_LEN {
        return Err(DecodeError::Truncated("bundle header"));
    }

    let mut rest = &bytes[BUNDLE_HEADER_LEN..];
    while !rest.is_empty() {
        let Some((size, body)) = rest.split_first_chunk::<4>() else {
            return Err(DecodeError::TrailingBytes(rest.len()));
        };
        let size = i32::from_be_bytes(*size);
        let size = usize::try_from(size)
            .ok()
            .filter(|&n| n > 0 && n % 4 == 0)
            .ok_or_else(|| DecodeError::Malformed(format!("bundle element size {size}")))?;
        if size > body.len() {
            return Err(DecodeError::Truncated("bundle element"));
        }

        let (element, next) = body.split_at(size);
        if element.starts_with(BUNDLE_TAG) {
            flatten_bundle(element, depth + 1, out)?;
        } else {
            out.push(decode(element)?);
        }
        rest = next;
    }
    Ok(())
}

fn convert_message(msg: rosc::OscMessage) -> Result<OscMessage, DecodeError> {
    if !msg.addr.starts_with('/') {
        return Err(DecodeError::InvalidAddress);
    }
    let args = msg
        .args
        .into_iter()
        .map(|arg| OscArgument::from_osc_type(arg).map_err(DecodeError::UnsupportedType))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(OscMessage {
        address: msg.addr,
        args,
    })
}

fn rosc_error(e: rosc::OscError) -> DecodeError {
    DecodeError::Malformed(format!("{e:?}"))
}

/// Checks the address and type tag framing before handing the bytes to
/// `rosc`, which accepts some shapes the protocol does not.
fn check_message_frame(bytes: &[u8]) -> Result<(), DecodeError> {
    let addr_len = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::Truncated("address is not terminated"))?;

    let tags_start = padded_len(addr_len + 1);
    if tags_start >= bytes.len() || bytes[tags_start] != b',' {
        return Err(DecodeError::MissingTypeTags);
    }

    let tags = &bytes[tags_start + 1..];
    let tags_len = tags
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::Truncated("type tag string is not terminated"))?;

    match tags[..tags_len].iter().find(|&&t| !matches!(t, b'i' | b'f' | b's')) {
        Some(&t) => Err(DecodeError::UnsupportedType(t as char)),
        None => Ok(()),
    }
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_rounds_up_to_four() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 4);
        assert_eq!(padded_len(4), 4);
        assert_eq!(padded_len(8), 8);
        assert_eq!(padded_len(9), 12);
    }

    #[test]
    fn encodes_wire_layout() {
        let msg = OscMessage::new("/inputs", vec![OscArgument::Int32(32)]);
        let bytes = encode(&msg).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(b"/inputs\0");
        expected.extend_from_slice(b",i\0\0");
        expected.extend_from_slice(&32i32.to_be_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn encodes_strings_padded() {
        let msg = OscMessage::new("/findDevice", vec![OscArgument::Str("secret".into())]);
        let bytes = encode(&msg).unwrap();
        // "/findDevice" = 11 bytes + NUL -> 12, ",s" -> 4, "secret" + NUL -> 8
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[12..16], b",s\0\0");
        assert_eq!(&bytes[16..24], b"secret\0\0");
    }

    #[test]
    fn frame_check_flags_missing_tags() {
        assert_eq!(check_message_frame(b"/abc\0\0\0\0"), Err(DecodeError::MissingTypeTags));
        assert_eq!(
            check_message_frame(b"/abc\0\0\0\0xi\0\0"),
            Err(DecodeError::MissingTypeTags)
        );
        assert_eq!(
            check_message_frame(b"/abc\0\0\0\0,d\0\0"),
            Err(DecodeError::UnsupportedType('d'))
        );
        assert_eq!(
            check_message_frame(b"/abc"),
            Err(DecodeError::Truncated("address is not terminated"))
        );
    }
}
