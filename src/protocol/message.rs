//! Request and response envelopes.
//!
//! A request envelope is `[msg_type(1)] [data…]`, a response envelope is
//! `[status(1)] [data…]`. Both are sealed as a unit.

use std::fmt;
use std::str::FromStr;

use crate::core::codec::{Direction, Envelope};
use crate::error::{constants, BadMessage, ProtocolError};
use crate::wire_struct;

/// Kinds of request a controller can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MsgType {
    /// A card was presented; should the door open?
    Open = 0x01,
}

impl MsgType {
    /// Every message type, in wire order.
    pub const ALL: [MsgType; 1] = [MsgType::Open];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            MsgType::Open => "OPEN",
        }
    }
}

impl TryFrom<u8> for MsgType {
    type Error = BadMessage;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(MsgType::Open),
            other => Err(BadMessage::new(format!(
                "{}: {other}",
                constants::ERR_UNKNOWN_MESSAGE_TYPE
            ))),
        }
    }
}

/// Case-insensitive lookup by name, as typed on a command line.
impl FromStr for MsgType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MsgType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProtocolError::UnknownMessageType(s.to_string()))
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseStatus {
    Ok = 0x00,
    Err = 0x01,
}

impl ResponseStatus {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ResponseStatus::Ok => "OK",
            ResponseStatus::Err => "ERR",
        }
    }
}

impl TryFrom<u8> for ResponseStatus {
    type Error = BadMessage;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ResponseStatus::Ok),
            0x01 => Ok(ResponseStatus::Err),
            other => Err(BadMessage::new(format!(
                "{}: {other}",
                constants::ERR_UNKNOWN_STATUS
            ))),
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

wire_struct! {
    /// Discriminator of a request envelope.
    pub struct RequestHead {
        pub msg_type: u8,
    }
}

impl RequestHead {
    pub fn msg_type(&self) -> Result<MsgType, BadMessage> {
        MsgType::try_from(self.msg_type)
    }
}

impl From<MsgType> for RequestHead {
    fn from(t: MsgType) -> Self {
        RequestHead {
            msg_type: t.as_u8(),
        }
    }
}

impl Envelope for RequestHead {
    const DIRECTION: Direction = Direction::Request;
}

wire_struct! {
    /// Discriminator of a response envelope.
    pub struct ResponseHead {
        pub status: u8,
    }
}

impl ResponseHead {
    pub fn status(&self) -> Result<ResponseStatus, BadMessage> {
        ResponseStatus::try_from(self.status)
    }
}

impl From<ResponseStatus> for ResponseHead {
    fn from(s: ResponseStatus) -> Self {
        ResponseHead {
            status: s.as_u8(),
        }
    }
}

impl Envelope for ResponseHead {
    const DIRECTION: Direction = Direction::Response;
}
