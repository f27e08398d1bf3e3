//! Controller-side client.
//!
//! Sends one request datagram and waits for the matching reply. Used by the
//! `gatectl` tool for manual testing and by the end-to-end tests.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tracing::{debug, instrument};

use crate::config::{ClientConfig, MAX_DATAGRAM_SIZE};
use crate::core::codec::{make_packet, parse_payload, Key};
use crate::core::device_id::DeviceId;
use crate::core::packet::{generate_nonce, parse_packet_head, PacketHead};
use crate::error::{ProtocolError, Result};
use crate::protocol::message::{MsgType, RequestHead, ResponseHead, ResponseStatus};
use crate::utils::timeout::{with_timeout_error, DEFAULT_TIMEOUT};

/// A decoded reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub msg_type: MsgType,
    pub status: ResponseStatus,
    /// Reply data, `None` when the reply carried none.
    pub data: Option<Vec<u8>>,
}

impl Response {
    pub fn new(msg_type: MsgType, status: ResponseStatus, data: Vec<u8>) -> Self {
        Self {
            msg_type,
            status,
            data: (!data.is_empty()).then_some(data),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

/// `OPEN OK: (no data)`
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: ", self.msg_type, self.status)?;
        match &self.data {
            Some(data) => write!(f, "{}", String::from_utf8_lossy(data).escape_debug()),
            None => f.write_str("(no data)"),
        }
    }
}

/// UDP client talking to one gate server.
#[derive(Debug)]
pub struct GateClient {
    socket: UdpSocket,
    timeout: Duration,
}

impl GateClient {
    /// Bind an ephemeral local port and connect it to `server`.
    pub async fn connect(server: &str) -> Result<Self> {
        let server: SocketAddr = server.parse().map_err(|e| {
            ProtocolError::ConfigError(format!("Invalid server address '{server}': {e}"))
        })?;
        let local = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(server).await?;
        debug!(%server, local = %socket.local_addr()?, "Client socket ready");

        Ok(Self {
            socket,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub async fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::connect(&config.address)
            .await?
            .with_timeout(config.response_timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a request as `device` and wait for the reply.
    ///
    /// Every call draws a fresh nonce. The reply must echo the request header
    /// and be sealed under `key`.
    #[instrument(skip_all, fields(device = %device, msg_type = %msg_type, len = data.len()))]
    pub async fn request(
        &self,
        device: DeviceId,
        key: &Key,
        msg_type: MsgType,
        data: &[u8],
    ) -> Result<Response> {
        let head = PacketHead::for_request(device, generate_nonce()?);
        let packet = make_packet(&head, &RequestHead::from(msg_type), data, key)?;
        self.socket.send(&packet).await?;

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let len = with_timeout_error(self.recv_reply(&head, &mut buf), self.timeout).await?;
        let reply = &buf[..len];
        let (reply_head, payload) = parse_packet_head(reply)?;

        let (response_head, data) = parse_payload::<ResponseHead>(&reply_head, payload, key)
            .map_err(|e| e.with_raw(reply))?;
        let status = response_head.status().map_err(|e| e.with_raw(reply))?;

        debug!(%status, data_len = data.len(), "Received reply");
        Ok(Response::new(msg_type, status, data))
    }

    /// Read datagrams until one echoes `head`; returns its length.
    ///
    /// Late replies to earlier, timed-out requests carry another nonce and are
    /// skipped, as is anything that does not parse as a packet header.
    async fn recv_reply(&self, head: &PacketHead, buf: &mut [u8]) -> Result<usize> {
        loop {
            let len = self.socket.recv(buf).await?;
            match parse_packet_head(&buf[..len]) {
                Ok((reply_head, _)) if reply_head == *head => return Ok(len),
                Ok((reply_head, _)) => debug!(
                    nonce = %hex::encode(reply_head.nonce),
                    "Discarding reply to another request"
                ),
                Err(e) => debug!(error = %e, len, "Discarding malformed datagram"),
            }
        }
    }
}
