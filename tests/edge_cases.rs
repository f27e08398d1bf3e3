#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge-case tests for the public codec surface
//! Boundary sizes, malformed input and records declared outside the crate

use gate_protocol::config::MAX_DATAGRAM_SIZE;
use gate_protocol::core::codec::{
    make_packet, open, parse_packet, seal, Direction, Envelope, Key, KEY_LEN, TAG_LEN,
};
use gate_protocol::core::device_id::DeviceId;
use gate_protocol::core::packet::{PacketHead, HEADER_SIZE, NONCE_LEN};
use gate_protocol::core::wire::{Fixed, Wire};
use gate_protocol::error::{AddressParseError, BadMessage, DecodeError, ProtocolError};
use gate_protocol::protocol::{MsgType, RequestHead, ResponseHead};
use gate_protocol::wire_struct;

wire_struct! {
    /// Card swipe report from a reader.
    pub struct CardSwipe {
        pub reader: u8,
        pub card: [u8; 7],
        pub seq: u32,
    }
}

impl Envelope for CardSwipe {
    const DIRECTION: Direction = Direction::Request;
}

fn head() -> PacketHead {
    PacketHead::for_request(DeviceId([0x02, 0, 0, 0, 0, 0x2a]), [0x5a; NONCE_LEN])
}

fn key() -> Key {
    Key::new([0x33; KEY_LEN])
}

// ============================================================================
// TYPE FRAMEWORK
// ============================================================================

#[test]
fn test_external_record_layout() {
    assert_eq!(CardSwipe::SIZE, 12);
    assert_eq!(CardSwipe::FIELDS, &["reader", "card", "seq"]);

    let swipe = CardSwipe::new(2u8, *b"0451234", 0x0100_0000u32);
    let bytes = swipe.pack();
    assert_eq!(bytes[0], 2);
    assert_eq!(&bytes[1..8], b"0451234");
    assert_eq!(&bytes[8..], &[1, 0, 0, 0]);
    assert_eq!(CardSwipe::unpack(&bytes).unwrap(), swipe);
}

#[test]
fn test_exact_size_required() {
    let bytes = CardSwipe::new(1u8, [0u8; 7], 1u32).pack();

    assert!(matches!(
        CardSwipe::unpack(&bytes[..11]),
        Err(DecodeError::Truncated { .. })
    ));

    let mut longer = bytes.clone();
    longer.push(0);
    assert_eq!(
        CardSwipe::unpack(&longer),
        Err(DecodeError::TrailingBytes {
            expected: 12,
            actual: 13
        })
    );
}

#[test]
fn test_external_record_as_envelope() {
    let swipe = CardSwipe::new(4u8, *b"ABCDEFG", 99u32);
    let packet = make_packet(&head(), &swipe, b"extra", &key()).unwrap();
    let (_, decoded, data) = parse_packet::<CardSwipe>(&packet, &key()).unwrap();
    assert_eq!(decoded, swipe);
    assert_eq!(data, b"extra");
}

// ============================================================================
// ADDRESS CODEC
// ============================================================================

#[test]
fn test_device_id_text_forms() {
    let id: DeviceId = "0A-1b-2C-3d-4E-5f".parse().unwrap();
    assert_eq!(id.to_string(), "0a:1b:2c:3d:4e:5f");
    assert_eq!(id.as_bytes(), &[0x0a, 0x1b, 0x2c, 0x3d, 0x4e, 0x5f]);
}

#[test]
fn test_device_id_malformed() {
    assert!(matches!(
        "aa:bb:cc:dd:ee".parse::<DeviceId>(),
        Err(AddressParseError::OctetCount(5))
    ));
    assert!(matches!(
        "aa:bb:cc-dd:ee:ff".parse::<DeviceId>(),
        Err(AddressParseError::MixedSeparators(_))
    ));
    assert!(matches!(
        "aa:bb:cc:dd:ee:f".parse::<DeviceId>(),
        Err(AddressParseError::InvalidOctet(_))
    ));
    assert!(matches!(
        "aa:bb:cc:dd:ee:gg".parse::<DeviceId>(),
        Err(AddressParseError::InvalidOctet(_))
    ));
    assert!("".parse::<DeviceId>().is_err());
    assert!(DeviceId::from_bytes(&[1, 2, 3]).is_err());
}

// ============================================================================
// PACKET CODEC BOUNDARIES
// ============================================================================

#[test]
fn test_largest_packet_fits() {
    let max_data = MAX_DATAGRAM_SIZE - HEADER_SIZE - RequestHead::SIZE - TAG_LEN;
    let data = vec![0xEE; max_data];

    let packet = make_packet(&head(), &RequestHead::from(MsgType::Open), &data, &key()).unwrap();
    assert_eq!(packet.len(), MAX_DATAGRAM_SIZE);

    let too_big = vec![0xEE; max_data + 1];
    assert!(make_packet(&head(), &RequestHead::from(MsgType::Open), &too_big, &key()).is_err());
}

#[test]
fn test_empty_data() {
    let packet = make_packet(&head(), &ResponseHead::new(0u8), b"", &key()).unwrap();
    assert_eq!(packet.len(), HEADER_SIZE + 1 + TAG_LEN);
    let (_, envelope, data) = parse_packet::<ResponseHead>(&packet, &key()).unwrap();
    assert_eq!(envelope.status, 0);
    assert!(data.is_empty());
}

#[test]
fn test_truncated_tag() {
    let packet = make_packet(&head(), &RequestHead::from(MsgType::Open), b"x", &key()).unwrap();
    for cut in 1..=TAG_LEN {
        let truncated = &packet[..packet.len() - cut];
        assert!(parse_packet::<RequestHead>(truncated, &key()).is_err());
    }
}

#[test]
fn test_seal_and_open_directly() {
    let sealed = seal(&head(), &RequestHead::from(MsgType::Open), b"\x05Hello", &key()).unwrap();
    let (envelope, data) = open::<RequestHead>(&head(), &sealed, &key()).unwrap();
    assert_eq!(envelope.msg_type().unwrap(), MsgType::Open);
    assert_eq!(data, b"\x05Hello");

    // Different nonce, same everything else
    let mut other = head();
    other.nonce = [0xa5; NONCE_LEN];
    assert!(open::<RequestHead>(&other, &sealed, &key()).is_err());
}

#[test]
fn test_truncated_header_raw_is_kept() {
    let err: BadMessage = parse_packet::<RequestHead>(&[1, 2, 3], &key()).unwrap_err();
    assert_eq!(err.reason(), "packet shorter than header");
    assert_eq!(err.raw(), &[1, 2, 3]);
    assert_eq!(err.to_string(), "bad message: packet shorter than header");
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

#[test]
fn test_unknown_message_type_name() {
    let err = "lock".parse::<MsgType>().unwrap_err();
    assert_eq!(err.to_string(), "No such message type: lock");
}

#[test]
fn test_bad_message_into_protocol_error() {
    let err: ProtocolError = BadMessage::new("authentication failed").into();
    assert_eq!(err.to_string(), "bad message: authentication failed");
    assert!(matches!(err, ProtocolError::BadMessage(_)));
}
