//! # Authenticated Payload Codec
//!
//! Seals an envelope (`RequestHead` or `ResponseHead` followed by opaque data)
//! under the controller's key and opens it again on receipt.
//!
//! ## Scheme
//! - XChaCha20-Poly1305 with the controller's 32-byte key
//! - AEAD nonce: `packet nonce(18) | direction(1) | zero(5)`
//! - Associated data: the packed [`PacketHead`]
//! - Ciphertext followed by the 16-byte tag
//!
//! The tag covers version, device id and nonce, so a packet replayed under
//! another device id, with another nonce, or with any flipped bit fails to open.
//! A reply echoes the request header and is sealed in the response direction,
//! which keeps request and reply AEAD nonces distinct under the same key.
//!
//! Wrong key, corrupted ciphertext and forged header all fail with the same
//! [`BadMessage`].

use std::fmt;

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use tracing::{instrument, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::MAX_DATAGRAM_SIZE;
use crate::core::packet::{parse_packet_head, Nonce, PacketHead, HEADER_SIZE, NONCE_LEN};
use crate::core::wire::{Fixed, Wire};
use crate::error::{constants, BadMessage, ProtocolError};

/// Length of a controller key.
pub const KEY_LEN: usize = 32;

/// Length of the Poly1305 tag appended to every sealed payload.
pub const TAG_LEN: usize = 16;

/// A controller's secret key. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            ProtocolError::ConfigError(format!(
                "key must be {KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Parse a key written as 64 hex digits.
    pub fn from_hex(s: &str) -> Result<Self, ProtocolError> {
        let mut bytes = hex::decode(s.trim())
            .map_err(|e| ProtocolError::ConfigError(format!("invalid hex key: {e}")))?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key(..)")
    }
}

/// Which way a sealed envelope travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Request = 0x01,
    Response = 0x02,
}

/// An envelope head that can be sealed into a packet.
pub trait Envelope: Fixed {
    const DIRECTION: Direction;
}

fn aead_nonce(nonce: &Nonce, direction: Direction) -> XNonce {
    let mut bytes = [0u8; 24];
    bytes[..NONCE_LEN].copy_from_slice(nonce);
    bytes[NONCE_LEN] = direction as u8;
    *XNonce::from_slice(&bytes)
}

fn cipher(key: &Key) -> XChaCha20Poly1305 {
    XChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(key.as_bytes()))
}

/// Seal `envelope` and `data` for the packet described by `head`.
#[instrument(skip_all, fields(device = %head.device_id, direction = ?E::DIRECTION))]
pub fn seal<E: Envelope>(
    head: &PacketHead,
    envelope: &E,
    data: &[u8],
    key: &Key,
) -> Result<Vec<u8>, BadMessage> {
    let aad = head.pack();
    let mut plaintext = Vec::with_capacity(E::SIZE + data.len());
    envelope.pack_into(&mut plaintext);
    plaintext.extend_from_slice(data);

    let sealed = cipher(key)
        .encrypt(
            &aead_nonce(&head.nonce, E::DIRECTION),
            Payload {
                msg: &plaintext,
                aad: &aad,
            },
        )
        .map_err(|_| BadMessage::new("encryption failed"));

    plaintext.zeroize();
    sealed
}

/// Open a sealed payload and split it into envelope head and data.
#[instrument(skip_all, fields(device = %head.device_id, direction = ?E::DIRECTION))]
pub fn open<E: Envelope>(
    head: &PacketHead,
    payload: &[u8],
    key: &Key,
) -> Result<(E, Vec<u8>), BadMessage> {
    if payload.len() < E::SIZE + TAG_LEN {
        return Err(BadMessage::new("payload shorter than envelope"));
    }

    let aad = head.pack();
    let mut plaintext = cipher(key)
        .decrypt(
            &aead_nonce(&head.nonce, E::DIRECTION),
            Payload { msg: payload, aad: &aad },
        )
        .map_err(|_| BadMessage::new(constants::ERR_AUTHENTICATION_FAILED))?;

    let opened = E::unpack_from(&plaintext)
        .map(|(envelope, data)| (envelope, data.to_vec()))
        .map_err(BadMessage::from);
    plaintext.zeroize();

    let (envelope, data) = opened?;
    trace!(data_len = data.len(), "Opened payload");
    Ok((envelope, data))
}

/// Build a complete datagram: packed header followed by the sealed envelope.
///
/// Used for requests and replies alike; the envelope type picks the direction.
pub fn make_packet<E: Envelope>(
    head: &PacketHead,
    envelope: &E,
    data: &[u8],
    key: &Key,
) -> Result<Vec<u8>, BadMessage> {
    let total = HEADER_SIZE + E::SIZE + data.len() + TAG_LEN;
    if total > MAX_DATAGRAM_SIZE {
        return Err(BadMessage::new(format!(
            "{}: {total} bytes",
            constants::ERR_OVERSIZED_PACKET
        )));
    }

    let mut packet = Vec::with_capacity(total);
    head.pack_into(&mut packet);
    packet.extend(seal(head, envelope, data, key)?);
    Ok(packet)
}

/// Open a sealed payload that has already been split from its header.
pub fn parse_payload<E: Envelope>(
    head: &PacketHead,
    payload: &[u8],
    key: &Key,
) -> Result<(E, Vec<u8>), BadMessage> {
    open(head, payload, key)
}

/// Parse and open a complete datagram with a known key.
pub fn parse_packet<E: Envelope>(
    buf: &[u8],
    key: &Key,
) -> Result<(PacketHead, E, Vec<u8>), BadMessage> {
    let (head, payload) = parse_packet_head(buf)?;
    let (envelope, data) = open(&head, payload, key).map_err(|e| e.with_raw(buf))?;
    Ok((head, envelope, data))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::core::device_id::DeviceId;
    use crate::wire_struct;

    wire_struct! {
        struct TestRequest {
            kind: u8,
        }
    }

    impl Envelope for TestRequest {
        const DIRECTION: Direction = Direction::Request;
    }

    wire_struct! {
        struct TestReply {
            status: u8,
        }
    }

    impl Envelope for TestReply {
        const DIRECTION: Direction = Direction::Response;
    }

    fn head() -> PacketHead {
        PacketHead::for_request(DeviceId([1, 2, 3, 4, 5, 6]), [9u8; NONCE_LEN])
    }

    #[test]
    fn test_seal_open() {
        let key = Key::new([42u8; KEY_LEN]);
        let sealed = seal(&head(), &TestRequest::new(3u8), b"abc", &key).unwrap();
        assert_eq!(sealed.len(), 1 + 3 + TAG_LEN);

        let (env, data) = open::<TestRequest>(&head(), &sealed, &key).unwrap();
        assert_eq!(env.kind, 3);
        assert_eq!(data, b"abc");
    }

    #[test]
    fn test_open_returns_owned_data() {
        let key = Key::new([42u8; KEY_LEN]);
        let data = vec![0x5au8; 300];
        let sealed = seal(&head(), &TestRequest::new(7u8), &data, &key).unwrap();

        // Opening twice yields identical copies; the plaintext buffer is wiped each time
        let (first_env, first) = open::<TestRequest>(&head(), &sealed, &key).unwrap();
        let (second_env, second) = open::<TestRequest>(&head(), &sealed, &key).unwrap();
        assert_eq!(first_env, second_env);
        assert_eq!(first, data);
        assert_eq!(second, data);
    }

    #[test]
    fn test_direction_separates_request_and_reply() {
        let key = Key::new([42u8; KEY_LEN]);
        let sealed = seal(&head(), &TestRequest::new(3u8), b"", &key).unwrap();
        // Same key and nonce, opposite direction
        assert!(open::<TestReply>(&head(), &sealed, &key).is_err());
    }

    #[test]
    fn test_header_is_authenticated() {
        let key = Key::new([42u8; KEY_LEN]);
        let sealed = seal(&head(), &TestRequest::new(3u8), b"x", &key).unwrap();

        let mut other = head();
        other.device_id = DeviceId([1, 2, 3, 4, 5, 7]);
        assert!(open::<TestRequest>(&other, &sealed, &key).is_err());

        let mut other = head();
        other.nonce[17] ^= 1;
        assert!(open::<TestRequest>(&other, &sealed, &key).is_err());
    }

    #[test]
    fn test_short_payload() {
        let key = Key::new([0u8; KEY_LEN]);
        let err = open::<TestRequest>(&head(), &[0u8; TAG_LEN], &key).unwrap_err();
        assert_eq!(err.reason(), "payload shorter than envelope");
    }

    #[test]
    fn test_oversized_packet_rejected() {
        let key = Key::new([0u8; KEY_LEN]);
        let data = vec![0u8; MAX_DATAGRAM_SIZE];
        assert!(make_packet(&head(), &TestRequest::new(1u8), &data, &key).is_err());
    }

    #[test]
    fn test_key_from_hex() {
        let key = Key::from_hex(&"ab".repeat(KEY_LEN)).unwrap();
        assert_eq!(key.as_bytes(), &[0xab; KEY_LEN]);
        assert!(Key::from_hex("abcd").is_err());
        assert!(Key::from_hex("zz").is_err());
        assert_eq!(format!("{key:?}"), "Key(..)");
    }
}
