//! Session broadcaster implementation
//!
//! The central component that tracks group membership, hands joining
//! sessions the current document, and fans each accepted update out to
//! every member.

use std::sync::atomic::Ordering;

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{broadcast, RwLock};

use crate::stats::BroadcasterStats;

use super::config::BroadcastConfig;
use super::frame::UpdateFrame;
use super::group::BroadcastGroup;

/// Owner of the broadcast group and its document
///
/// Constructed once per server and shared with every connection as
/// `Arc<Broadcaster>`. Thread-safe via `RwLock`: joins and leaves take the
/// read lock, publishes take the write lock.
pub struct Broadcaster {
    group: RwLock<BroadcastGroup>,

    /// Configuration
    config: BroadcastConfig,
}

impl Broadcaster {
    /// Create a new broadcaster with default configuration
    pub fn new() -> Self {
        Self::with_config(BroadcastConfig::default())
    }

    /// Create a new broadcaster with custom configuration
    pub fn with_config(config: BroadcastConfig) -> Self {
        Self {
            group: RwLock::new(BroadcastGroup::new(&config)),
            config,
        }
    }

    /// Get the broadcaster configuration
    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Add a session to the group
    ///
    /// Returns a receiver for future updates and the current document text.
    /// The text must be delivered to the session before anything read from
    /// the receiver.
    pub async fn join(&self, session_id: u64) -> (broadcast::Receiver<UpdateFrame>, Utf8Bytes) {
        let group = self.group.read().await;

        let rx = group.subscribe();
        let snapshot = group.snapshot();

        tracing::debug!(
            group = %group.name,
            session_id = session_id,
            members = group.member_count(),
            snapshot_len = snapshot.len(),
            "Session joined"
        );

        (rx, snapshot)
    }

    /// Remove a session from the group
    ///
    /// Departures are silent: no other member is notified.
    pub async fn leave(&self, session_id: u64) {
        let group = self.group.read().await;
        let remaining = group.unsubscribe();

        tracing::debug!(
            group = %group.name,
            session_id = session_id,
            members = remaining,
            "Session left"
        );
    }

    /// Replace the document and deliver the new text to every member
    ///
    /// The store and the send happen under one write lock, so no joiner can
    /// observe the old text after this update has been sent. Returns the
    /// number of members the frame was queued for.
    pub async fn publish(&self, origin: u64, text: impl Into<Utf8Bytes>) -> usize {
        let text = text.into();
        let len = text.len();
        let mut group = self.group.write().await;

        let delivered = group.apply(UpdateFrame::new(origin, text));

        tracing::trace!(
            group = %group.name,
            origin = origin,
            len = len,
            delivered = delivered,
            "Update published"
        );

        delivered
    }

    /// Current document text
    pub async fn document(&self) -> Utf8Bytes {
        self.group.read().await.snapshot()
    }

    /// Number of open member sessions
    pub async fn member_count(&self) -> u32 {
        self.group.read().await.member_count()
    }

    /// Get broadcaster statistics
    pub async fn stats(&self) -> BroadcasterStats {
        let group = self.group.read().await;

        BroadcasterStats {
            group: group.name.clone(),
            members: group.member_count(),
            total_joins: group.total_joins.load(Ordering::Relaxed),
            updates_published: group.updates_published,
            document_len: group.document.len(),
            uptime: group.created_at.elapsed(),
        }
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
