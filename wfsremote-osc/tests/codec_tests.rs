//! tests/codec_tests.rs
use rosc::{OscBundle, OscPacket, OscTime, OscType};

use wfsremote_common::models::{OscArgument, OscMessage};
use wfsremote_osc::codec::{decode, decode_datagram, encode};
use wfsremote_osc::DecodeError;

/// Hand-built bundle: tag, time tag 1, then each element with its size
/// prefix.
fn bundle(elements: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"#bundle\0");
    out.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 1]);
    for element in elements {
        out.extend_from_slice(&(element.len() as i32).to_be_bytes());
        out.extend_from_slice(element);
    }
    out
}

fn inputs_message(count: i32) -> Vec<u8> {
    encode(&OscMessage::new("/inputs", vec![OscArgument::Int32(count)])).unwrap()
}

fn nested(depth: usize) -> Vec<u8> {
    let mut bytes = inputs_message(8);
    for _ in 0..depth {
        bytes = bundle(&[bytes]);
    }
    bytes
}

fn sample_messages() -> Vec<OscMessage> {
    vec![
        OscMessage::new("/inputs", vec![OscArgument::Int32(32)]),
        OscMessage::new(
            "/remoteInput/attenuation",
            vec![OscArgument::Int32(3), OscArgument::Float32(-12.5)],
        ),
        OscMessage::new(
            "/remoteInput/positionX",
            vec![
                OscArgument::Int32(64),
                OscArgument::Str("inc".into()),
                OscArgument::Float32(0.25),
            ],
        ),
        OscMessage::new(
            "/marker/positionXY",
            vec![
                OscArgument::Int32(1),
                OscArgument::Float32(f32::MIN_POSITIVE),
                OscArgument::Float32(-0.0),
            ],
        ),
        OscMessage::new("/findDevice", vec![]),
        OscMessage::new("/findDevice", vec![OscArgument::Str("".into())]),
        OscMessage::new("/findDevice", vec![OscArgument::Str("abc".into())]),
        OscMessage::new("/findDevice", vec![OscArgument::Str("abcd".into())]),
        OscMessage::new("/x", vec![OscArgument::Int32(i32::MIN), OscArgument::Int32(i32::MAX)]),
    ]
}

#[test]
fn encoded_messages_decode_to_the_same_message() {
    for msg in sample_messages() {
        let bytes = encode(&msg).unwrap();
        assert_eq!(bytes.len() % 4, 0, "{msg} is not 4-byte aligned");
        let back = decode(&bytes).unwrap();
        assert_eq!(back, msg);
    }
}

#[test]
fn negative_zero_keeps_its_bits() {
    let msg = OscMessage::new("/marker/positionXY", vec![OscArgument::Float32(-0.0)]);
    let back = decode(&encode(&msg).unwrap()).unwrap();
    match back.args[0] {
        OscArgument::Float32(f) => assert_eq!(f.to_bits(), (-0.0f32).to_bits()),
        ref other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn encode_rejects_bad_addresses_and_strings() {
    assert!(encode(&OscMessage::new("inputs", vec![])).is_err());
    assert!(encode(&OscMessage::new("/in\0puts", vec![])).is_err());
    assert!(encode(&OscMessage::new("/findDevice", vec![OscArgument::Str("a\0b".into())])).is_err());
}

#[test]
fn empty_and_non_osc_input_is_rejected() {
    assert_eq!(decode(&[]), Err(DecodeError::Empty));
    assert_eq!(decode(b"hello world!"), Err(DecodeError::InvalidAddress));
    assert!(decode(b"/inputs\0").is_err());
}

#[test]
fn every_truncation_of_a_numeric_message_is_rejected() {
    let msg = OscMessage::new(
        "/remoteInput/attenuation",
        vec![OscArgument::Int32(3), OscArgument::Float32(-6.0)],
    );
    let bytes = encode(&msg).unwrap();
    for len in 0..bytes.len() {
        assert!(
            decode(&bytes[..len]).is_err(),
            "prefix of {len} bytes decoded"
        );
    }
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut bytes = encode(&OscMessage::new("/inputs", vec![OscArgument::Int32(8)])).unwrap();
    bytes.extend_from_slice(&[0, 0, 0, 1]);
    assert!(decode(&bytes).is_err());
}

#[test]
fn unsupported_type_tags_are_rejected() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"/inputs\0");
    bytes.extend_from_slice(b",d\0\0");
    bytes.extend_from_slice(&1.0f64.to_be_bytes());
    assert_eq!(decode(&bytes), Err(DecodeError::UnsupportedType('d')));
}

#[test]
fn random_bytes_never_panic() {
    // Small LCG so the run is reproducible.
    let mut state: u32 = 0x1234_5678;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 24) as u8
    };

    for round in 0..2000 {
        let len = (round % 64) + 1;
        let mut bytes: Vec<u8> = (0..len).map(|_| next()).collect();
        if bytes[0] == b'/' || bytes[0] == b'#' {
            bytes[0] = b'x';
        }
        assert!(decode(&bytes).is_err());
        assert!(decode_datagram(&bytes).is_err());
    }

    // Flip bytes inside valid encodings: any outcome is fine, panics are not.
    for msg in sample_messages() {
        let bytes = encode(&msg).unwrap();
        for i in 0..bytes.len() {
            let mut mutated = bytes.clone();
            mutated[i] ^= next() | 1;
            let _ = decode(&mutated);
            let _ = decode_datagram(&mutated);
        }
    }
}

#[test]
fn bundles_are_flattened_in_order() {
    let inner = OscPacket::Bundle(OscBundle {
        timetag: OscTime {
            seconds: 0,
            fractional: 1,
        },
        content: vec![OscPacket::Message(rosc::OscMessage {
            addr: "/remoteInput/mute".into(),
            args: vec![OscType::Int(2), OscType::Int(1)],
        })],
    });
    let bundle = OscPacket::Bundle(OscBundle {
        timetag: OscTime {
            seconds: 0,
            fractional: 1,
        },
        content: vec![
            OscPacket::Message(rosc::OscMessage {
                addr: "/inputs".into(),
                args: vec![OscType::Int(16)],
            }),
            inner,
        ],
    });
    let bytes = rosc::encoder::encode(&bundle).unwrap();

    let messages = decode_datagram(&bytes).unwrap();
    assert_eq!(
        messages,
        vec![
            OscMessage::new("/inputs", vec![OscArgument::Int32(16)]),
            OscMessage::new(
                "/remoteInput/mute",
                vec![OscArgument::Int32(2), OscArgument::Int32(1)]
            ),
        ]
    );

    // A single-message decode refuses a bundle.
    assert_eq!(decode(&bytes), Err(DecodeError::UnexpectedBundle));
}

#[test]
fn bundle_nesting_is_capped() {
    assert_eq!(decode_datagram(&nested(8)).unwrap().len(), 1);
    assert_eq!(
        decode_datagram(&nested(9)),
        Err(DecodeError::Malformed("bundle nested too deep".into()))
    );

    // Far deeper than any receive buffer allows; must fail, not overflow.
    let deep = nested(1000);
    assert!(deep.len() > 16_000);
    assert!(decode_datagram(&deep).is_err());
}

#[test]
fn bundle_elements_get_message_checks() {
    // Extra bytes inside an element.
    let mut padded = inputs_message(32);
    padded.extend_from_slice(&[0, 0, 0, 7]);
    assert_eq!(decode_datagram(&bundle(&[padded])), Err(DecodeError::TrailingBytes(4)));

    // An element without type tags.
    let no_tags = b"/findDevice\0".to_vec();
    assert_eq!(decode(&no_tags), Err(DecodeError::MissingTypeTags));
    assert_eq!(decode_datagram(&bundle(&[no_tags])), Err(DecodeError::MissingTypeTags));

    // A good element next to a bad one fails the whole datagram.
    let mixed = bundle(&[inputs_message(1), b"/x\0\0,d\0\0\0\0\0\0\0\0\0\0".to_vec()]);
    assert_eq!(decode_datagram(&mixed), Err(DecodeError::UnsupportedType('d')));
}

#[test]
fn bundle_framing_errors_are_rejected() {
    // Bytes after the last element.
    let mut trailing = bundle(&[inputs_message(32)]);
    trailing.extend_from_slice(&[1, 2, 3]);
    assert_eq!(decode_datagram(&trailing), Err(DecodeError::TrailingBytes(3)));

    // Size prefix pointing past the end.
    let mut short = bundle(&[inputs_message(32)]);
    short.truncate(short.len() - 4);
    assert_eq!(decode_datagram(&short), Err(DecodeError::Truncated("bundle element")));

    // Negative, zero and unaligned sizes.
    for size in [-4i32, 0, 6] {
        let mut bytes = bundle(&[]);
        bytes.extend_from_slice(&size.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 8]);
        assert!(matches!(decode_datagram(&bytes), Err(DecodeError::Malformed(_))), "size {size}");
    }

    // Header cut short.
    assert_eq!(decode_datagram(b"#bundle\0\0\0"), Err(DecodeError::Truncated("bundle header")));

    // An empty bundle carries no messages.
    assert_eq!(decode_datagram(&bundle(&[])), Ok(vec![]));
}
