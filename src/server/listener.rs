//! Relay server listener
//!
//! TCP accept loop and per-connection role dispatch. The first byte of a
//! connection selects its role: publish (remote producer feeding the
//! dispatcher), subscribe (streamed consumer with its own queue and
//! delivery session), or sample (pull-style consumer polling the latest
//! slot). Consumer-side failures never reach the accept loop; it logs and
//! keeps accepting.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::protocol::wire;
use crate::relay::{Consumer, ConsumerId, ConsumerRegistry, Dispatcher, RegistryError};
use crate::session::{DeliverySession, SamplingSession};
use crate::stats::RelayStats;

use super::config::ServerConfig;
use super::transport::TcpFrameTransport;

/// Frame relay server
pub struct RelayServer {
    shared: Arc<Shared>,
    next_session_id: AtomicU64,
    shutdown: CancellationToken,
}

/// State shared with per-connection tasks
struct Shared {
    config: ServerConfig,
    registry: Arc<ConsumerRegistry>,
    dispatcher: Arc<Dispatcher>,
    stats: Arc<RelayStats>,
    /// Whether a publisher connection currently holds the ingest slot
    publisher_active: AtomicBool,
}

impl RelayServer {
    /// Create a server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(ConsumerRegistry::new());
        let stats = Arc::new(RelayStats::new());
        let dispatcher = Arc::new(Dispatcher::with_stats(
            Arc::clone(&registry),
            Arc::clone(&stats),
        ));

        Self {
            shared: Arc::new(Shared {
                config,
                registry,
                dispatcher,
                stats,
                publisher_active: AtomicBool::new(false),
            }),
            next_session_id: AtomicU64::new(1),
            shutdown: CancellationToken::new(),
        }
    }

    /// The dispatcher, for publishing frames in-process
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.shared.dispatcher
    }

    /// The consumer registry
    pub fn registry(&self) -> &Arc<ConsumerRegistry> {
        &self.shared.registry
    }

    /// Relay stats counters
    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.shared.stats
    }

    /// The configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.shared.config.bind_addr
    }

    /// Run the server
    ///
    /// Binds the configured address and accepts until the task is dropped.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.shared.config.bind_addr).await?;
        tracing::info!(addr = %self.shared.config.bind_addr, "Frame relay server listening");
        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    ///
    /// When `shutdown` completes, the accept loop stops and every
    /// per-connection session is cancelled.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.shared.config.bind_addr).await?;
        tracing::info!(addr = %self.shared.config.bind_addr, "Frame relay server listening");

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        };

        self.shutdown.cancel();
        result
    }

    /// Accept connections on a caller-provided listener
    ///
    /// Useful for binding to an ephemeral port first.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(addr = %addr, "Frame relay server listening");
        }
        self.accept_loop(&listener).await
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if self.shared.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::debug!(session_id = session_id, error = %e, "set_nodelay failed");
            }
        }

        let shared = Arc::clone(&self.shared);
        let cancel = self.shutdown.child_token();

        tokio::spawn(async move {
            shared
                .serve_connection(socket, peer_addr, session_id, cancel)
                .await;
            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }
}

impl Shared {
    async fn serve_connection(
        self: Arc<Self>,
        mut socket: TcpStream,
        peer_addr: SocketAddr,
        session_id: u64,
        cancel: CancellationToken,
    ) {
        let role = tokio::select! {
            _ = cancel.cancelled() => return,
            role = wire::read_role(&mut socket) => role,
        };

        match role {
            Ok(wire::ROLE_PUBLISH) => {
                self.serve_publisher(socket, peer_addr, session_id, cancel)
                    .await;
            }
            Ok(wire::ROLE_SUBSCRIBE) => {
                self.serve_subscriber(socket, peer_addr, session_id, cancel)
                    .await;
            }
            Ok(wire::ROLE_SAMPLE) => {
                self.serve_sampler(socket, peer_addr, session_id, cancel)
                    .await;
            }
            Ok(other) => {
                tracing::error!(session_id = session_id, role = other, "Unhandled role");
            }
            Err(e) => {
                tracing::debug!(
                    session_id = session_id,
                    peer = %peer_addr,
                    error = %e,
                    "Connection rejected before role handshake"
                );
            }
        }
    }

    /// Ingest loop for a remote producer
    async fn serve_publisher(
        &self,
        mut socket: TcpStream,
        peer_addr: SocketAddr,
        session_id: u64,
        cancel: CancellationToken,
    ) {
        // One active publisher at a time
        if self.publisher_active.swap(true, Ordering::SeqCst) {
            self.stats.record_publisher_rejected();
            tracing::warn!(
                session_id = session_id,
                peer = %peer_addr,
                "Publisher rejected: another publisher is active"
            );
            return;
        }

        tracing::info!(session_id = session_id, peer = %peer_addr, "Publisher connected");

        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => break,
                frame = wire::read_frame(&mut socket, self.config.max_frame_size) => frame,
            };

            match frame {
                Ok(Some(payload)) => {
                    self.dispatcher.publish(payload).await;
                }
                Ok(None) => {
                    tracing::info!(session_id = session_id, "Publisher disconnected");
                    break;
                }
                Err(e) => {
                    tracing::warn!(session_id = session_id, error = %e, "Publisher read failed");
                    break;
                }
            }
        }

        self.publisher_active.store(false, Ordering::SeqCst);
    }

    /// Streamed consumer: attach to the registry and run a delivery session
    async fn serve_subscriber(
        &self,
        socket: TcpStream,
        peer_addr: SocketAddr,
        session_id: u64,
        cancel: CancellationToken,
    ) {
        let id = ConsumerId(session_id);

        let consumer = Arc::new(Consumer::new(id, self.config.relay.queue_capacity));
        match self
            .registry
            .attach_with_limit(Arc::clone(&consumer), self.config.max_consumers)
            .await
        {
            Ok(()) => {}
            Err(RegistryError::AtCapacity(limit)) => {
                tracing::warn!(
                    consumer = %id,
                    peer = %peer_addr,
                    limit = limit,
                    "Consumer rejected: limit reached"
                );
                return;
            }
            Err(e) => {
                tracing::error!(consumer = %id, error = %e, "Attach failed");
                return;
            }
        }
        self.stats.record_attached();

        let (reader, writer) = socket.into_split();
        let transport = TcpFrameTransport::new(writer);

        // The read half only matters as a disconnect signal; consumers
        // send nothing after the role byte.
        let watcher = tokio::spawn(watch_disconnect(reader, cancel.clone(), id));

        let session = DeliverySession::new(
            consumer,
            Arc::clone(&self.registry),
            transport,
            self.config.relay.send_timeout,
            cancel.clone(),
            Arc::clone(&self.stats),
        );
        session.run().await;

        cancel.cancel();
        let _ = watcher.await;
    }

    /// Pull-style consumer: poll the latest slot at the configured cadence
    async fn serve_sampler(
        &self,
        socket: TcpStream,
        peer_addr: SocketAddr,
        session_id: u64,
        cancel: CancellationToken,
    ) {
        let id = ConsumerId(session_id);
        self.stats.record_sampler();
        tracing::info!(consumer = %id, peer = %peer_addr, "Sampling consumer connected");

        let (reader, writer) = socket.into_split();
        let transport = TcpFrameTransport::new(writer);
        let watcher = tokio::spawn(watch_disconnect(reader, cancel.clone(), id));

        let session = SamplingSession::new(
            id,
            Arc::clone(self.dispatcher.slot()),
            transport,
            self.config.relay.poll_interval,
            self.config.relay.send_timeout,
            cancel.clone(),
            Arc::clone(&self.stats),
        );
        session.run().await;

        cancel.cancel();
        let _ = watcher.await;
    }
}

/// Reads the consumer side of a connection purely to detect disconnect;
/// EOF or a read error cancels the session token.
async fn watch_disconnect(mut reader: OwnedReadHalf, cancel: CancellationToken, id: ConsumerId) {
    let mut buf = [0u8; 64];
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            read = reader.read(&mut buf) => match read {
                Ok(0) | Err(_) => {
                    tracing::debug!(consumer = %id, "Peer disconnected");
                    cancel.cancel();
                    return;
                }
                Ok(_) => {
                    // Ignore any bytes the consumer sends
                }
            }
        }
    }
}
