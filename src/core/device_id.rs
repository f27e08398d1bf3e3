//! Hardware addresses of gate controllers.
//!
//! A controller is identified on the wire by the six octets of its MAC address.
//! The same value indexes the key store. Text form is six hex octets separated
//! by `:` or `-`.

use std::fmt;
use std::str::FromStr;

use crate::core::wire::{take, Fixed, Wire};
use crate::error::{AddressParseError, DecodeError};

/// Length of a device identifier on the wire.
pub const DEVICE_ID_LEN: usize = 6;

/// A six-octet controller hardware address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct DeviceId(pub [u8; DEVICE_ID_LEN]);

impl DeviceId {
    /// Construct an address from exactly six octets.
    pub fn from_bytes(data: &[u8]) -> Result<DeviceId, AddressParseError> {
        let bytes: [u8; DEVICE_ID_LEN] = data
            .try_into()
            .map_err(|_| AddressParseError::ByteLength(data.len()))?;
        Ok(DeviceId(bytes))
    }

    /// Return the address as a sequence of octets.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; DEVICE_ID_LEN]> for DeviceId {
    fn from(bytes: [u8; DEVICE_ID_LEN]) -> Self {
        DeviceId(bytes)
    }
}

impl FromStr for DeviceId {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let separator = match (s.contains(':'), s.contains('-')) {
            (true, true) => return Err(AddressParseError::MixedSeparators(s.to_string())),
            (false, true) => '-',
            _ => ':',
        };

        let octets: Vec<&str> = s.split(separator).collect();
        if octets.len() != DEVICE_ID_LEN {
            return Err(AddressParseError::OctetCount(octets.len()));
        }

        let mut bytes = [0u8; DEVICE_ID_LEN];
        for (byte, octet) in bytes.iter_mut().zip(&octets) {
            // from_str_radix alone would accept "+f" and single digits
            if octet.len() != 2 || !octet.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(AddressParseError::InvalidOctet(octet.to_string()));
            }
            *byte = u8::from_str_radix(octet, 16)
                .map_err(|_| AddressParseError::InvalidOctet(octet.to_string()))?;
        }
        Ok(DeviceId(bytes))
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
        )
    }
}

impl Wire for DeviceId {
    fn unpack_from(buf: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (head, rest) = take(buf, DEVICE_ID_LEN)?;
        let mut bytes = [0u8; DEVICE_ID_LEN];
        bytes.copy_from_slice(head);
        Ok((DeviceId(bytes), rest))
    }

    fn pack_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }
}

impl Fixed for DeviceId {
    const SIZE: usize = DEVICE_ID_LEN;
}
