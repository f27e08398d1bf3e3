//! Length-prefixed byte strings.
//!
//! An fstring is one length byte followed by that many bytes. Controllers use it
//! for card identifiers and other short strings inside request data.

use std::fmt;

use crate::core::wire::{take, Wire};
use crate::error::{constants, BadMessage, DecodeError};

/// Longest string a one-byte length prefix can describe.
pub const FSTRING_MAX_LEN: usize = u8::MAX as usize;

/// A byte string with a one-byte length prefix on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FString(Vec<u8>);

impl FString {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, DecodeError> {
        let bytes = bytes.into();
        if bytes.len() > FSTRING_MAX_LEN {
            return Err(DecodeError::Invalid(
                format!("fstring of {} bytes exceeds {FSTRING_MAX_LEN}", bytes.len()).into(),
            ));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for FString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl PartialEq<[u8]> for FString {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl Wire for FString {
    fn unpack_from(buf: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (len, rest) = u8::unpack_from(buf)?;
        let (string, rest) = take(rest, len as usize)
            .map_err(|_| DecodeError::Invalid(constants::ERR_FSTRING_LENGTH.into()))?;
        Ok((FString(string.to_vec()), rest))
    }

    fn pack_into(&self, out: &mut Vec<u8>) {
        out.push(self.0.len() as u8);
        out.extend_from_slice(&self.0);
    }
}

/// Read the fstring at the front of request data, ignoring anything after it.
pub fn parse_fstring(data: &[u8]) -> Result<FString, BadMessage> {
    let (string, _rest) = FString::unpack_from(data)?;
    Ok(string)
}
