//! # Protocol Layer
//!
//! Message types, key lookup and the request pipeline built on top of the
//! [`core`](crate::core) codec.
//!
//! ## Components
//! - **Message**: `MsgType`, `ResponseStatus` and the envelope heads
//! - **Keys**: the `KeyStore` seam for controller keys
//! - **Dispatcher**: one datagram in, one reply datagram out
//! - **Handlers**: stock business logic
//! - **Log**: the `MessageLog` seam for request logging

pub mod dispatcher;
pub mod handlers;
pub mod keys;
pub mod log;
pub mod message;


pub use dispatcher::{dispatch, Dispatcher, Reply, RequestHandlers};
pub use handlers::HelloGate;
pub use keys::{KeyStore, MemoryKeyStore};
pub use log::{MessageLog, TracingMessageLog};
pub use message::{MsgType, RequestHead, ResponseHead, ResponseStatus};
