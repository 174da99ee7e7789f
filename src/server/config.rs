//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent sessions (0 = unlimited)
    pub max_connections: usize,

    /// Disconnect a session after this long without inbound traffic (zero = never)
    ///
    /// The server pings every session at half this interval, so a client that
    /// only watches stays connected as long as it answers.
    pub idle_timeout: Duration,

    /// Answer plain HTTP requests with the bundled client page
    pub serve_client: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_connections: 0, // Unlimited
            idle_timeout: Duration::from_secs(300),
            serve_client: true,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set idle timeout
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Stop serving the bundled client page
    pub fn disable_client(mut self) -> Self {
        self.serve_client = false;
        self
    }

    /// How often an open session is pinged (zero when the idle timeout is off)
    pub fn ping_interval(&self) -> Duration {
        self.idle_timeout / 2
    }
}
