//! Session broadcaster for the shared document
//!
//! The broadcaster owns the one broadcast group, which in turn owns the
//! document. Every connection task holds an `Arc<Broadcaster>` and a
//! `broadcast::Receiver` obtained from [`Broadcaster::join`].
//!
//! # Architecture
//!
//! ```text
//!                          Arc<Broadcaster>
//!                     ┌─────────────────────────┐
//!                     │ group: RwLock<          │
//!                     │   BroadcastGroup {      │
//!                     │     document,           │
//!                     │     tx: broadcast::Tx,  │
//!                     │   }                     │
//!                     │ >                       │
//!                     └───────────┬─────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!     [Session]               [Session]               [Session]
//!    text message          frame_rx.recv()         frame_rx.recv()
//!         │                       │                       │
//!         └──► broadcaster.publish()──► ws.send() ──► client
//! ```
//!
//! # Ordering
//!
//! `publish` replaces the document and sends the frame while holding the
//! group's write lock. `join` reads the snapshot and subscribes while
//! holding the read lock. A joining session therefore either sees the old
//! text in its snapshot and receives the update afterwards, or sees the new
//! text and never receives that update as a frame.

pub mod broadcaster;
pub mod config;
pub mod frame;
pub mod group;

pub use broadcaster::Broadcaster;
pub use config::BroadcastConfig;
pub use frame::UpdateFrame;
pub use group::BroadcastGroup;
