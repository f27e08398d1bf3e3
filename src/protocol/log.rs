//! Request log collaborator.
//!
//! The dispatcher reports every handled request and every rejected datagram to
//! a [`MessageLog`]. Deployments that keep an access log in a database plug
//! their own implementation; [`TracingMessageLog`] writes to `tracing`.

use tracing::{info, warn};

use crate::core::device_id::DeviceId;
use crate::error::BadMessage;
use crate::protocol::message::{MsgType, ResponseStatus};

/// Observer of the request pipeline.
pub trait MessageLog: Send + Sync {
    /// A request from `device` was handled with the given outcome.
    fn log_message(
        &self,
        device: &DeviceId,
        msg_type: MsgType,
        input: &[u8],
        status: ResponseStatus,
    );

    /// A datagram was rejected.
    fn log_bad_packet(&self, raw: &[u8], err: &BadMessage);
}

/// Logs requests at INFO and rejected datagrams at WARN.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMessageLog;

impl MessageLog for TracingMessageLog {
    fn log_message(
        &self,
        device: &DeviceId,
        msg_type: MsgType,
        input: &[u8],
        status: ResponseStatus,
    ) {
        info!(
            device = %device,
            msg_type = %msg_type,
            input = %String::from_utf8_lossy(input).escape_debug(),
            status = %status,
            "Request handled"
        );
    }

    fn log_bad_packet(&self, raw: &[u8], err: &BadMessage) {
        let raw = if err.raw().is_empty() { raw } else { err.raw() };
        warn!(
            reason = err.reason(),
            len = raw.len(),
            raw = %hex::encode(raw),
            "Bad packet"
        );
    }
}
