//! Notepad server listener
//!
//! Binds the TCP listener and serves the router until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::broadcast::{BroadcastConfig, Broadcaster};
use crate::error::Result;
use crate::server::config::ServerConfig;
use crate::server::routes::{self, AppState, Counters};
use crate::stats::ServerStats;

/// Shared-notepad server
pub struct NotepadServer {
    state: AppState,
}

impl NotepadServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self::with_broadcast_config(config, BroadcastConfig::default())
    }

    /// Create a new server with custom broadcaster configuration
    pub fn with_broadcast_config(config: ServerConfig, broadcast_config: BroadcastConfig) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            state: AppState {
                config: Arc::new(config),
                broadcaster: Arc::new(Broadcaster::with_config(broadcast_config)),
                next_session_id: Arc::new(AtomicU64::new(1)),
                connection_semaphore,
                counters: Arc::new(Counters::default()),
            },
        }
    }

    /// Get a reference to the broadcaster
    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.state.broadcaster
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.state.config.bind_addr
    }

    /// Get server statistics
    pub fn stats(&self) -> ServerStats {
        let counters = &self.state.counters;
        ServerStats {
            total_connections: counters.total_connections.load(Ordering::Relaxed),
            active_connections: counters.active_connections.load(Ordering::Relaxed),
            rejected_connections: counters.rejected_connections.load(Ordering::Relaxed),
            pages_served: counters.pages_served.load(Ordering::Relaxed),
        }
    }

    /// The HTTP router, for embedding in a larger application
    ///
    /// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
    pub fn router(&self) -> Router {
        routes::router(self.state.clone())
    }

    /// Run the server
    ///
    /// This method blocks until the listener fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.state.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve connections from an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(addr = %listener.local_addr()?, "Notepad server listening");

        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        Ok(())
    }
}
