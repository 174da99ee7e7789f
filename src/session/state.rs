//! Session state machine
//!
//! Tracks one client connection from handshake to disconnection.

use std::net::SocketAddr;
use std::time::Instant;

use crate::stats::SessionStats;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Transport accepted, not yet a member of the broadcast group
    Connecting,
    /// Member of the broadcast group, exchanging updates
    Open,
    /// Disconnected; no further sends
    Closed,
}

/// Complete session state
#[derive(Debug)]
pub struct SessionState {
    /// Unique session ID
    pub id: u64,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Current phase
    pub phase: SessionPhase,

    /// Connection start time
    pub connected_at: Instant,

    /// Time when the session joined the group
    pub opened_at: Option<Instant>,

    /// Traffic counters
    pub stats: SessionStats,
}

impl SessionState {
    /// Create a new session state
    pub fn new(id: u64, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            phase: SessionPhase::Connecting,
            connected_at: Instant::now(),
            opened_at: None,
            stats: SessionStats::new(),
        }
    }

    /// Connecting -> Open
    pub fn open(&mut self) {
        if self.phase == SessionPhase::Connecting {
            self.phase = SessionPhase::Open;
            self.opened_at = Some(Instant::now());
        }
    }

    /// Any phase -> Closed
    pub fn close(&mut self) {
        if self.phase != SessionPhase::Closed {
            self.phase = SessionPhase::Closed;
            self.stats.duration = self.duration();
        }
    }

    /// Time spent open, or zero if the session never opened
    pub fn duration(&self) -> std::time::Duration {
        self.opened_at
            .map(|at| at.elapsed())
            .unwrap_or_default()
    }

    /// Check if session is open
    pub fn is_open(&self) -> bool {
        self.phase == SessionPhase::Open
    }
}
