//! UDP server loop.
//!
//! One task owns the socket: receive a datagram, run it through the
//! [`Dispatcher`], send the reply (if any) back to the sender. Requests are
//! small and handled synchronously, so there is no per-datagram task.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::{GateConfig, MAX_DATAGRAM_SIZE};
use crate::error::{constants, Result};
use crate::protocol::dispatcher::{Dispatcher, RequestHandlers};
use crate::protocol::keys::{KeyStore, MemoryKeyStore};
use crate::protocol::log::{MessageLog, TracingMessageLog};
use crate::utils::replay_cache::ReplayCache;

/// Gate server bound to a UDP socket.
pub struct GateServer<H, K, L = TracingMessageLog> {
    socket: UdpSocket,
    dispatcher: Dispatcher<H, K, L>,
    metrics_interval: Duration,
}

impl<H: RequestHandlers> GateServer<H, MemoryKeyStore> {
    /// Bind the configured address with the configured devices and replay settings.
    pub async fn from_config(config: &GateConfig, handlers: H) -> Result<Self> {
        config.validate_strict()?;

        let keys = config.key_store()?;
        info!(devices = keys.len(), "Loaded controller keys");

        let mut dispatcher = Dispatcher::new(handlers, keys);
        if config.server.replay_protection {
            dispatcher = dispatcher.with_replay_cache(ReplayCache::with_settings(
                config.server.replay_ttl,
                config.server.replay_max_entries,
            ));
        }

        let mut server = Self::bind(&config.server.address, dispatcher).await?;
        server.metrics_interval = config.server.metrics_interval;
        Ok(server)
    }
}

impl<H, K, L> GateServer<H, K, L>
where
    H: RequestHandlers,
    K: KeyStore,
    L: MessageLog,
{
    /// Bind `addr` and serve requests with `dispatcher`.
    pub async fn bind(addr: &str, dispatcher: Dispatcher<H, K, L>) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!(address = %socket.local_addr()?, "Gate server bound");

        Ok(Self {
            socket,
            dispatcher,
            metrics_interval: Duration::from_secs(60),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn dispatcher(&self) -> &Dispatcher<H, K, L> {
        &self.dispatcher
    }

    /// Serve until CTRL+C.
    pub async fn run(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("Received CTRL+C signal, shutting down");
                let _ = shutdown_tx.send(()).await;
            }
        });

        self.run_with_shutdown(shutdown_rx).await
    }

    /// Serve until a message arrives on `shutdown_rx` or its sender is dropped.
    #[instrument(skip_all, fields(address = ?self.socket.local_addr().ok()))]
    pub async fn run_with_shutdown(self, mut shutdown_rx: mpsc::Receiver<()>) -> Result<()> {
        // One spare byte so oversized datagrams are seen as such instead of truncated
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE + 1];

        let mut ticker = tokio::time::interval(self.metrics_interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down gate server");
                    self.dispatcher.metrics().log_metrics();
                    return Ok(());
                }

                _ = ticker.tick() => {
                    self.dispatcher.metrics().log_metrics();
                }

                received = self.socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, peer)) => self.handle_datagram(&buf[..len], peer).await,
                        Err(e) => {
                            // ICMP errors from earlier sends surface here; the socket stays usable
                            self.dispatcher.metrics().io_error();
                            warn!(error = %e, "Failed to receive datagram");
                        }
                    }
                }
            }
        }
    }

    async fn handle_datagram(&self, datagram: &[u8], peer: SocketAddr) {
        let metrics = self.dispatcher.metrics();
        metrics.datagram_received(datagram.len() as u64);
        trace!(%peer, len = datagram.len(), "Received datagram");

        if datagram.len() > MAX_DATAGRAM_SIZE {
            metrics.bad_packet();
            debug!(%peer, len = datagram.len(), "{}", constants::ERR_OVERSIZED_PACKET);
            return;
        }

        let Some(reply) = self.dispatcher.process(datagram) else {
            debug!(%peer, "No reply for datagram");
            return;
        };

        match self.socket.send_to(&reply, peer).await {
            Ok(sent) => metrics.reply_sent(sent as u64),
            Err(e) => {
                metrics.io_error();
                warn!(%peer, error = %e, "Failed to send reply");
            }
        }
    }
}
