//! # Transport Layer
//!
//! The gate protocol runs over plain UDP: one request datagram, one reply
//! datagram. [`udp::GateServer`] owns the server socket.

pub mod udp;

pub use udp::GateServer;
