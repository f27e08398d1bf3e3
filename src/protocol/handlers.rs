//! Stock request handlers.

use tracing::debug;

use crate::core::fstring::parse_fstring;
use crate::error::BadMessage;
use crate::protocol::dispatcher::{Reply, RequestHandlers};

/// Password the demonstration gate opens for.
pub const HELLO_PASSWORD: &[u8] = b"Hello";

/// Demonstration gate: `OPEN` succeeds when the request data starts with the
/// fstring `"Hello"`. Replies never carry data.
#[derive(Debug, Default, Clone, Copy)]
pub struct HelloGate;

impl RequestHandlers for HelloGate {
    fn open(&self, data: &[u8]) -> Result<Reply, BadMessage> {
        let password = parse_fstring(data)?;
        if password.as_bytes() == HELLO_PASSWORD {
            Ok(Reply::ok())
        } else {
            debug!(len = password.as_bytes().len(), "Wrong password");
            Ok(Reply::err())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::protocol::dispatcher::dispatch;
    use crate::protocol::message::{MsgType, ResponseStatus};

    #[test]
    fn test_open_with_password() {
        let reply = dispatch(&HelloGate, MsgType::Open, b"\x05Hello").unwrap();
        assert_eq!(reply, Reply::ok());
        assert!(reply.data.is_empty());
    }

    #[test]
    fn test_open_with_wrong_password() {
        let reply = dispatch(&HelloGate, MsgType::Open, b"\x05Hullo").unwrap();
        assert_eq!(reply.status, ResponseStatus::Err);
    }

    #[test]
    fn test_trailing_bytes_after_password() {
        let reply = HelloGate.open(b"\x05Hello, world").unwrap();
        assert_eq!(reply.status, ResponseStatus::Ok);
    }

    #[test]
    fn test_malformed_password() {
        let err = HelloGate.open(b"\x09Hello").unwrap_err();
        assert_eq!(err.reason(), "fstring length > buffer size");
        assert!(HelloGate.open(b"").is_err());
    }
}
