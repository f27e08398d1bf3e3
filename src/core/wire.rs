//! # Wire Types
//!
//! Exact-width binary encoding for protocol records.
//!
//! Every serializable value implements [`Wire`]:
//! - `unpack_from` consumes exactly one value from the front of a buffer and
//!   hands back the remainder
//! - `pack` produces the value's encoding and is the left inverse of `unpack_from`
//! - `unpack` decodes a buffer that must hold exactly one value
//!
//! Types with a size known up front also implement [`Fixed`]. Composite records
//! are declared with [`wire_struct!`](crate::wire_struct), which lays fields out
//! in declaration order. That order is the wire layout.
//!
//! Integers are big-endian.
//!
//! ```rust
//! use gate_protocol::core::wire::{Fixed, Wire};
//! use gate_protocol::wire_struct;
//!
//! wire_struct! {
//!     /// A door state report.
//!     pub struct DoorState {
//!         pub door: u8,
//!         pub open_since: u32,
//!     }
//! }
//!
//! let state = DoorState::new(3u8, 1_700_000_000u32);
//! let bytes = state.pack();
//! assert_eq!(bytes.len(), DoorState::SIZE);
//! assert_eq!(DoorState::unpack(&bytes).unwrap(), state);
//! ```

use crate::error::DecodeError;
use bytes::BufMut;

/// A value with a binary encoding.
pub trait Wire: Sized {
    /// Decode one value from the front of `buf`, returning it with the unread rest.
    fn unpack_from(buf: &[u8]) -> Result<(Self, &[u8]), DecodeError>;

    /// Append the encoding of `self` to `out`.
    fn pack_into(&self, out: &mut Vec<u8>);

    /// Encode `self` into a fresh buffer.
    fn pack(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.pack_into(&mut out);
        out
    }

    /// Decode a buffer holding exactly one value.
    ///
    /// Fails with [`DecodeError::TrailingBytes`] if anything is left over.
    fn unpack(buf: &[u8]) -> Result<Self, DecodeError> {
        let (value, rest) = Self::unpack_from(buf)?;
        if !rest.is_empty() {
            return Err(DecodeError::TrailingBytes {
                expected: buf.len() - rest.len(),
                actual: buf.len(),
            });
        }
        Ok(value)
    }
}

/// A wire type whose encoding always has the same length.
pub trait Fixed: Wire {
    /// Encoded size in bytes.
    const SIZE: usize;
}

/// Split `n` bytes off the front of `buf`.
#[inline]
pub fn take(buf: &[u8], n: usize) -> Result<(&[u8], &[u8]), DecodeError> {
    if buf.len() < n {
        return Err(DecodeError::Truncated {
            needed: n,
            available: buf.len(),
        });
    }
    Ok(buf.split_at(n))
}

macro_rules! impl_wire_int {
    ($($ty:ty => $put:ident),+ $(,)?) => {
        $(
            impl Wire for $ty {
                #[inline]
                fn unpack_from(buf: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
                    let (head, rest) = take(buf, <$ty as Fixed>::SIZE)?;
                    let mut bytes = [0u8; ::core::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(head);
                    Ok((<$ty>::from_be_bytes(bytes), rest))
                }

                #[inline]
                fn pack_into(&self, out: &mut Vec<u8>) {
                    out.$put(*self);
                }
            }

            impl Fixed for $ty {
                const SIZE: usize = ::core::mem::size_of::<$ty>();
            }
        )+
    };
}

impl_wire_int! {
    u8 => put_u8,
    u16 => put_u16,
    u32 => put_u32,
    u64 => put_u64,
}

/// Fixed-length byte strings.
impl<const N: usize> Wire for [u8; N] {
    #[inline]
    fn unpack_from(buf: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (head, rest) = take(buf, N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(head);
        Ok((bytes, rest))
    }

    #[inline]
    fn pack_into(&self, out: &mut Vec<u8>) {
        out.put_slice(self);
    }
}

impl<const N: usize> Fixed for [u8; N] {
    const SIZE: usize = N;
}

/// Declare a fixed-layout record.
///
/// Generates the struct with `Debug`, `Clone`, `PartialEq`, `Eq` and `Hash`,
/// a positional `new` that coerces each argument through `Into<FieldType>`,
/// a `FIELDS` list of field names in wire order, and the [`Wire`] and [`Fixed`]
/// impls. Fields are packed and unpacked in declaration order; decoding stops
/// at the first field that fails.
///
/// Every field type must implement [`Fixed`].
#[macro_export]
macro_rules! wire_struct {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_attr:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis struct $name {
            $(
                $(#[$field_attr])*
                $field_vis $field: $ty,
            )+
        }

        impl $name {
            /// Field names in wire order.
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: impl ::core::convert::Into<$ty>),+) -> Self {
                Self {
                    $($field: $field.into(),)+
                }
            }
        }

        impl $crate::core::wire::Wire for $name {
            fn unpack_from(
                buf: &[u8],
            ) -> ::core::result::Result<(Self, &[u8]), $crate::error::DecodeError> {
                $(
                    let ($field, buf) = <$ty as $crate::core::wire::Wire>::unpack_from(buf)?;
                )+
                Ok((Self { $($field,)+ }, buf))
            }

            fn pack_into(&self, out: &mut ::std::vec::Vec<u8>) {
                $(
                    $crate::core::wire::Wire::pack_into(&self.$field, out);
                )+
            }
        }

        impl $crate::core::wire::Fixed for $name {
            const SIZE: usize = 0 $(+ <$ty as $crate::core::wire::Fixed>::SIZE)+;
        }
    };
}
