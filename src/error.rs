//! # Error Types
//!
//! Error handling for the gate protocol.
//!
//! ## Error Categories
//! - **Decode Errors**: a buffer does not hold a valid encoding of a wire type
//! - **Bad Messages**: any malformed, unknown or unauthenticated datagram
//! - **Address Errors**: malformed textual hardware addresses
//! - **I/O, Timeout and Configuration Errors**: everything around the protocol core
//!
//! Every protocol-level validation failure ends up as a single [`BadMessage`]
//! carrying a reason and the offending raw buffer. The core never decodes a
//! message partially: either the whole request is valid or the datagram is
//! discarded.
//!
//! ## Example Usage
//! ```rust
//! use gate_protocol::core::packet::parse_packet_head;
//! use tracing::warn;
//!
//! let datagram = [0u8; 3];
//! if let Err(e) = parse_packet_head(&datagram) {
//!     warn!(error = %e, raw_len = e.raw().len(), "Dropping datagram");
//! }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Framing errors
    pub const ERR_SHORT_HEADER: &str = "packet shorter than header";
    pub const ERR_UNSUPPORTED_VERSION: &str = "unsupported protocol version";
    pub const ERR_OVERSIZED_PACKET: &str = "packet exceeds maximum datagram size";

    /// Key and authentication errors
    pub const ERR_UNKNOWN_CONTROLLER: &str = "unknown controller";
    pub const ERR_AUTHENTICATION_FAILED: &str = "authentication failed";
    pub const ERR_REPLAY_ATTACK: &str = "replayed request nonce";

    /// Envelope errors
    pub const ERR_UNKNOWN_MESSAGE_TYPE: &str = "unknown message type";
    pub const ERR_UNKNOWN_STATUS: &str = "unknown status";
    pub const ERR_FSTRING_LENGTH: &str = "fstring length > buffer size";
}

/// Failure to decode a wire type from a buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended before the value did.
    #[error("buffer too short: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// `unpack` was given more bytes than one value occupies.
    #[error("buffer size != struct size: expected {expected} bytes, got {actual}")]
    TrailingBytes { expected: usize, actual: usize },

    /// The bytes were present but do not form a valid value.
    #[error("{0}")]
    Invalid(Cow<'static, str>),
}

/// Failure to parse a textual hardware address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("expected 6 octets, found {0}")]
    OctetCount(usize),

    #[error("invalid octet {0:?}: expected two hex digits")]
    InvalidOctet(String),

    #[error("mixed separators in address {0:?}")]
    MixedSeparators(String),

    #[error("expected 6 bytes, found {0}")]
    ByteLength(usize),
}

/// A datagram that was rejected.
///
/// Carries a human-readable reason and the raw bytes that were rejected so a
/// logging collaborator can record diagnostics. Wrong keys and corrupted data
/// produce the same reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadMessage {
    reason: Cow<'static, str>,
    raw: Vec<u8>,
}

impl BadMessage {
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
            raw: Vec::new(),
        }
    }

    /// Attach the offending buffer, keeping an already attached one.
    pub fn with_raw(mut self, raw: &[u8]) -> Self {
        if self.raw.is_empty() {
            self.raw = raw.to_vec();
        }
        self
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

impl fmt::Display for BadMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bad message: {}", self.reason)
    }
}

impl std::error::Error for BadMessage {}

impl From<DecodeError> for BadMessage {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Invalid(reason) => BadMessage::new(reason),
            other => BadMessage::new(other.to_string()),
        }
    }
}

/// Shorthand used by validation helpers: fail with `reason` unless `cond` holds.
pub fn check(cond: bool, reason: &'static str) -> std::result::Result<(), BadMessage> {
    if cond {
        Ok(())
    } else {
        Err(BadMessage::new(reason))
    }
}

// ProtocolError is the primary error type for everything outside the codec
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    BadMessage(#[from] BadMessage),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid device address: {0}")]
    Address(#[from] AddressParseError),

    #[error("No such message type: {0}")]
    UnknownMessageType(String),

    #[error("Random number generator failure: {0}")]
    Random(String),

    #[error("Timeout occurred")]
    Timeout,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
