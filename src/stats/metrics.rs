//! Statistics and metrics for notepad sessions

use std::time::Duration;

/// Session-level statistics
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Text updates accepted from this client
    pub updates_received: u64,
    /// Bytes of accepted text received from this client
    pub bytes_received: u64,
    /// Binary payloads dropped without effect
    pub binary_ignored: u64,
    /// Messages delivered to this client, including the join snapshot
    pub messages_sent: u64,
    /// Bytes delivered to this client
    pub bytes_sent: u64,
    /// Own updates not echoed back
    pub echoes_skipped: u64,
    /// Frames skipped because this client fell behind
    pub lagged_frames: u64,
    /// Keepalive pings sent to this client
    pub pings_sent: u64,
    /// Time spent open
    pub duration: Duration,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted text update
    pub fn record_update(&mut self, len: usize) {
        self.updates_received += 1;
        self.bytes_received += len as u64;
    }

    /// Record a message delivered to the client
    pub fn record_sent(&mut self, len: usize) {
        self.messages_sent += 1;
        self.bytes_sent += len as u64;
    }
}

/// Snapshot of the broadcaster's state
#[derive(Debug, Clone)]
pub struct BroadcasterStats {
    /// Broadcast group name
    pub group: String,
    /// Currently open member sessions
    pub members: u32,
    /// Sessions that ever joined
    pub total_joins: u64,
    /// Updates accepted
    pub updates_published: u64,
    /// Current document length in bytes
    pub document_len: usize,
    /// Time since the broadcaster was created
    pub uptime: Duration,
}

/// Server-wide statistics
#[derive(Debug, Clone, Default)]
pub struct ServerStats {
    /// WebSocket upgrade requests received
    pub total_connections: u64,
    /// Sessions currently open
    pub active_connections: u64,
    /// Upgrade requests turned away by the connection limit
    pub rejected_connections: u64,
    /// Plain HTTP requests answered with client assets
    pub pages_served: u64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self::default()
    }
}
