//! # Services
//!
//! Client side of the gate protocol.

pub mod client;

pub use client::{GateClient, Response};
