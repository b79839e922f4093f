//! Telemetry server listener
//!
//! Handles the TCP accept loop and spawns connection handlers.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::auth::AuthGate;
use crate::error::Result;
use crate::hub::BroadcastHub;
use crate::protocol::{FrameWriter, Message};
use crate::registry::{RegistryConfig, SubscriberRegistry};
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::stats::ServerStats;

/// Telemetry server
pub struct TelemetryServer {
    config: ServerConfig,
    hub: Arc<BroadcastHub>,
    stats: Arc<ServerStats>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
    shutdown: CancellationToken,
}

impl TelemetryServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        if config.auth_token.is_empty() {
            tracing::warn!("Empty auth token: any client sending \"Bearer \" will be accepted");
        }

        let registry = Arc::new(SubscriberRegistry::with_config(
            RegistryConfig::default().queue_capacity(config.queue_capacity),
        ));
        let hub = BroadcastHub::new(AuthGate::new(&config.auth_token), registry);

        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            hub: Arc::new(hub),
            stats: Arc::new(ServerStats::new()),
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
            shutdown: CancellationToken::new(),
        }
    }

    /// Get a reference to the broadcast hub
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Connection statistics
    pub fn stats(&self) -> &Arc<ServerStats> {
        &self.stats
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Bind to the configured address and serve until `shutdown` completes
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` completes
    ///
    /// On shutdown the registry is emptied: open streams forward what is
    /// still queued and then end, or are cut off after `drain_timeout`.
    /// A server is meant to be served once.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            addr = %addr,
            queue_capacity = self.config.queue_capacity,
            "Telemetry server listening"
        );

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        };

        // Close every queue first so streams drain, then stop the connections
        let closed = self.hub.shutdown();
        self.shutdown.cancel();
        tracing::info!(
            subscribers = closed,
            connections = self.stats.total_connections(),
            uptime_secs = self.stats.uptime().as_secs(),
            "Telemetry server stopped"
        );

        result
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
        // Check connection limit; the permit lives as long as the connection task
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    self.stats.connection_rejected();
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    tokio::spawn(refuse(socket));
                    return;
                }
            }
        } else {
            None
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(error = %e, "Failed to configure socket");
                return;
            }
        }

        let config = self.config.clone();
        let hub = Arc::clone(&self.hub);
        let stats = Arc::clone(&self.stats);
        let shutdown = self.shutdown.clone();

        stats.connection_opened();
        tokio::spawn(async move {
            let _permit = permit;
            let connection = Connection::new(session_id, socket, peer_addr, config, hub, shutdown);

            if let Err(e) = connection.run().await {
                tracing::debug!(
                    session_id = session_id,
                    error = %e,
                    "Connection error"
                );
            }

            stats.connection_closed();
            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }
}

/// Tell a client over the connection limit why it is being dropped
async fn refuse(socket: TcpStream) {
    let mut writer = FrameWriter::new(socket);
    let _ = writer
        .write_message(&Message::unavailable("connection limit reached"))
        .await;
    let _ = writer.shutdown().await;
}
