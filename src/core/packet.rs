//! # Packet Header
//!
//! Every datagram starts with a fixed 25-byte header followed by the sealed
//! payload.
//!
//! ## Wire Format
//! ```text
//! [Version(1)] [DeviceId(6)] [Nonce(18)] [Sealed payload(N)]
//! ```
//!
//! The header travels in the clear but is authenticated together with the
//! payload, see [`codec`](crate::core::codec).

use crate::config::PROTOCOL_VERSION;
use crate::core::device_id::DeviceId;
use crate::core::wire::{Fixed, Wire};
use crate::error::{constants, BadMessage, ProtocolError, Result};
use crate::wire_struct;
use tracing::debug;

/// Length of the per-request anti-replay nonce.
pub const NONCE_LEN: usize = 18;

/// Per-request random value chosen by the requester.
pub type Nonce = [u8; NONCE_LEN];

wire_struct! {
    /// Clear-text header of every datagram.
    pub struct PacketHead {
        pub version: u8,
        pub device_id: DeviceId,
        pub nonce: Nonce,
    }
}

/// Size of [`PacketHead`] on the wire.
pub const HEADER_SIZE: usize = PacketHead::SIZE;

impl PacketHead {
    /// Header for a new request from `device_id` at the current protocol version.
    pub fn for_request(device_id: DeviceId, nonce: Nonce) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            device_id,
            nonce,
        }
    }
}

/// Draw a fresh nonce from the operating system RNG.
///
/// Each request needs its own nonce; a retransmission must use a new one.
pub fn generate_nonce() -> Result<Nonce> {
    let mut nonce = [0u8; NONCE_LEN];
    getrandom::fill(&mut nonce).map_err(|e| ProtocolError::Random(e.to_string()))?;
    Ok(nonce)
}

/// Split the header off a datagram.
///
/// The remainder is the still-sealed payload. Fails if the datagram is shorter
/// than the header or carries an unknown protocol version.
pub fn parse_packet_head(buf: &[u8]) -> std::result::Result<(PacketHead, &[u8]), BadMessage> {
    let (head, payload) = PacketHead::unpack_from(buf)
        .map_err(|_| BadMessage::new(constants::ERR_SHORT_HEADER).with_raw(buf))?;

    if head.version != PROTOCOL_VERSION {
        debug!(version = head.version, "Rejecting packet with unknown version");
        return Err(BadMessage::new(format!(
            "{}: {}",
            constants::ERR_UNSUPPORTED_VERSION,
            head.version
        ))
        .with_raw(buf));
    }

    Ok((head, payload))
}
