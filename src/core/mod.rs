//! # Core Protocol Components
//!
//! Wire types, packet framing and the authenticated payload codec.
//!
//! ## Components
//! - **Wire**: the `Wire` trait and the `wire_struct!` builder for fixed layouts
//! - **DeviceId**: 6-byte controller addresses and their text form
//! - **FString**: length-prefixed byte strings
//! - **Packet**: the clear-text header and nonce generation
//! - **Codec**: sealing and opening envelopes with XChaCha20-Poly1305
//!
//! ## Wire Format
//! ```text
//! [Version(1)] [DeviceId(6)] [Nonce(18)] [Sealed(Envelope(1) | Data(N)) | Tag(16)]
//! ```
//!
//! All integers are big-endian.
//!
//! ## Security
//! - Maximum datagram size: 1024 bytes
//! - The header is authenticated as associated data
//! - Nothing inside the sealed part is looked at before the tag verifies

pub mod codec;
pub mod device_id;
pub mod fstring;
pub mod packet;
pub mod wire;
