//! # Request Dispatch
//!
//! Turns one request datagram into one reply datagram.
//!
//! Handlers are the methods of [`RequestHandlers`], one per [`MsgType`]
//! variant. [`dispatch`] matches the message type exhaustively, so adding a
//! variant without a handler is a compile error rather than a request that
//! fails at run time.
//!
//! ## Pipeline
//! 1. split the header off the datagram
//! 2. look up the controller key ("unknown controller" on a miss)
//! 3. open and decode the request envelope
//! 4. reject nonces already accepted (when a replay cache is attached)
//! 5. run the handler
//! 6. seal the reply under the same key, echoing the request header
//! 7. report the outcome to the [`MessageLog`]
//!
//! Any failure is a [`BadMessage`] and no reply is built.

use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::core::codec::{make_packet, parse_payload};
use crate::core::packet::parse_packet_head;
use crate::error::{constants, BadMessage};
use crate::protocol::keys::KeyStore;
use crate::protocol::log::{MessageLog, TracingMessageLog};
use crate::protocol::message::{MsgType, RequestHead, ResponseHead, ResponseStatus};
use crate::utils::metrics::Metrics;
use crate::utils::replay_cache::ReplayCache;

/// Outcome of a handler: a status and optional reply data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: ResponseStatus,
    pub data: Vec<u8>,
}

impl Reply {
    pub fn new(status: ResponseStatus, data: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            data: data.into(),
        }
    }

    /// `OK` without data.
    pub fn ok() -> Self {
        Self::new(ResponseStatus::Ok, Vec::new())
    }

    /// `ERR` without data.
    pub fn err() -> Self {
        Self::new(ResponseStatus::Err, Vec::new())
    }
}

/// Business logic for every message type.
///
/// Handlers receive the decoded request data. A handler may reject malformed
/// data with a [`BadMessage`], which drops the request without a reply.
pub trait RequestHandlers: Send + Sync {
    fn open(&self, data: &[u8]) -> Result<Reply, BadMessage>;
}

/// Route `data` to the handler for `msg_type`.
pub fn dispatch<H>(handlers: &H, msg_type: MsgType, data: &[u8]) -> Result<Reply, BadMessage>
where
    H: RequestHandlers + ?Sized,
{
    match msg_type {
        MsgType::Open => handlers.open(data),
    }
}

/// Request pipeline bound to a key store, handlers and a message log.
pub struct Dispatcher<H, K, L = TracingMessageLog> {
    handlers: H,
    keys: K,
    log: L,
    replay_cache: Option<Mutex<ReplayCache>>,
    metrics: Arc<Metrics>,
}

impl<H, K> Dispatcher<H, K>
where
    H: RequestHandlers,
    K: KeyStore,
{
    pub fn new(handlers: H, keys: K) -> Self {
        Self {
            handlers,
            keys,
            log: TracingMessageLog,
            replay_cache: None,
            metrics: Arc::new(Metrics::new()),
        }
    }
}

impl<H, K, L> Dispatcher<H, K, L>
where
    H: RequestHandlers,
    K: KeyStore,
    L: MessageLog,
{
    /// Replace the message log.
    pub fn with_log<L2: MessageLog>(self, log: L2) -> Dispatcher<H, K, L2> {
        Dispatcher {
            handlers: self.handlers,
            keys: self.keys,
            log,
            replay_cache: self.replay_cache,
            metrics: self.metrics,
        }
    }

    /// Reject requests whose nonce the cache has already seen.
    pub fn with_replay_cache(mut self, cache: ReplayCache) -> Self {
        self.replay_cache = Some(Mutex::new(cache));
        self
    }

    /// Share a metrics collector with the transport.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Process one request datagram and build the reply datagram.
    #[instrument(skip_all, fields(len = buf.len()))]
    pub fn handle_request(&self, buf: &[u8]) -> Result<Vec<u8>, BadMessage> {
        let (head, payload) = parse_packet_head(buf)?;

        let key = self.keys.key_for(&head.device_id).ok_or_else(|| {
            debug!(device = %head.device_id, "No key for controller");
            BadMessage::new(constants::ERR_UNKNOWN_CONTROLLER).with_raw(buf)
        })?;

        let (req_head, indata) =
            parse_payload::<RequestHead>(&head, payload, &key).map_err(|e| e.with_raw(buf))?;
        let msg_type = req_head.msg_type().map_err(|e| e.with_raw(buf))?;

        if let Some(cache) = &self.replay_cache {
            let replayed = match cache.lock() {
                Ok(mut cache) => cache.is_replay(&head.device_id, &head.nonce),
                Err(poisoned) => poisoned.into_inner().is_replay(&head.device_id, &head.nonce),
            };
            if replayed {
                self.metrics.replay_rejected();
                return Err(BadMessage::new(constants::ERR_REPLAY_ATTACK).with_raw(buf));
            }
        }

        let reply = dispatch(&self.handlers, msg_type, &indata).map_err(|e| e.with_raw(buf))?;
        let packet = make_packet(&head, &ResponseHead::from(reply.status), &reply.data, &key)
            .map_err(|e| e.with_raw(buf))?;

        self.metrics.request_handled();
        self.log
            .log_message(&head.device_id, msg_type, &indata, reply.status);
        Ok(packet)
    }

    /// Like [`handle_request`](Self::handle_request), reporting failures to the
    /// message log and returning `None` for datagrams that get no reply.
    pub fn process(&self, buf: &[u8]) -> Option<Vec<u8>> {
        match self.handle_request(buf) {
            Ok(reply) => Some(reply),
            Err(err) => {
                self.metrics.bad_packet();
                self.log.log_bad_packet(buf, &err);
                None
            }
        }
    }
}
