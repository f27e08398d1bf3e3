//! # Gate Protocol
//!
//! Authenticated request/response datagrams between a gate server and the
//! door and gate controllers it authorizes.
//!
//! A controller sends one UDP datagram per request. The server looks up the
//! controller's key by its 6-byte device id, opens the sealed envelope, runs the
//! handler for the message type and answers with one sealed reply datagram.
//!
//! ## Layers
//! - [`core`]: wire types, the `wire_struct!` builder, packet header and AEAD codec
//! - [`protocol`]: message types, key lookup and the request dispatcher
//! - [`transport`]: the tokio UDP server loop
//! - [`service`]: the tokio UDP client
//! - [`config`], [`error`], [`utils`]: configuration, errors, logging, metrics
//!
//! ## Example
//! ```rust
//! use gate_protocol::core::codec::{make_packet, parse_packet, Key};
//! use gate_protocol::core::device_id::DeviceId;
//! use gate_protocol::core::packet::{generate_nonce, PacketHead};
//! use gate_protocol::protocol::{
//!     Dispatcher, HelloGate, MemoryKeyStore, MsgType, RequestHead, ResponseHead, ResponseStatus,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let device: DeviceId = "aa:bb:cc:dd:ee:ff".parse()?;
//! let key = Key::new([7u8; 32]);
//! let keys = MemoryKeyStore::new().with_device(device, key.clone());
//! let dispatcher = Dispatcher::new(HelloGate, keys);
//!
//! let head = PacketHead::for_request(device, generate_nonce()?);
//! let request = make_packet(&head, &RequestHead::from(MsgType::Open), b"\x05Hello", &key)?;
//!
//! let reply = dispatcher.handle_request(&request)?;
//! let (_, status, _) = parse_packet::<ResponseHead>(&reply, &key)?;
//! assert_eq!(status.status()?, ResponseStatus::Ok);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use crate::config::GateConfig;
pub use crate::core::codec::Key;
pub use crate::core::device_id::DeviceId;
pub use crate::error::{BadMessage, ProtocolError, Result};
