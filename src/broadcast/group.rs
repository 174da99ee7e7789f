//! Broadcast group state
//!
//! This module defines the state owned by the single broadcast group: the
//! document, the fan-out sender and membership bookkeeping.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use axum::extract::ws::Utf8Bytes;
use tokio::sync::broadcast;

use crate::document::Document;

use super::config::BroadcastConfig;
use super::frame::UpdateFrame;

/// The set of sessions receiving each publish, plus the document they share
pub struct BroadcastGroup {
    /// Group name (for logging)
    pub name: String,

    /// Canonical document text
    pub(super) document: Document,

    /// Broadcast sender for fan-out to members
    tx: broadcast::Sender<UpdateFrame>,

    /// Number of open member sessions
    pub member_count: AtomicU32,

    /// Sessions that ever joined
    pub total_joins: AtomicU64,

    /// Updates accepted since creation
    pub updates_published: u64,

    /// When the group was created
    pub created_at: Instant,
}

impl BroadcastGroup {
    /// Create a new group holding an empty document
    pub(super) fn new(config: &BroadcastConfig) -> Self {
        let (tx, _) = broadcast::channel(config.channel_capacity.max(1));

        Self {
            name: config.group_name.clone(),
            document: Document::new(),
            tx,
            member_count: AtomicU32::new(0),
            total_joins: AtomicU64::new(0),
            updates_published: 0,
            created_at: Instant::now(),
        }
    }

    /// Get the number of member sessions
    pub fn member_count(&self) -> u32 {
        self.member_count.load(Ordering::Relaxed)
    }

    /// Current document text
    pub fn snapshot(&self) -> Utf8Bytes {
        self.document.get()
    }

    /// Subscribe a new member to this group's broadcast channel
    pub(super) fn subscribe(&self) -> broadcast::Receiver<UpdateFrame> {
        let rx = self.tx.subscribe();
        self.member_count.fetch_add(1, Ordering::Relaxed);
        self.total_joins.fetch_add(1, Ordering::Relaxed);
        rx
    }

    /// Drop a member from the count. The member's receiver is dropped by its owner.
    pub(super) fn unsubscribe(&self) -> u32 {
        let prev = self
            .member_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(n.saturating_sub(1))
            })
            .unwrap_or(0);
        prev.saturating_sub(1)
    }

    /// Store the text and send it to all members
    ///
    /// Returns the number of receivers that received the frame, or 0 if there are none.
    pub(super) fn apply(&mut self, frame: UpdateFrame) -> usize {
        self.document.set(frame.text.clone());
        self.updates_published += 1;
        self.tx.send(frame).unwrap_or(0)
    }
}
