//! Realtime shared-text broadcaster
//!
//! Every connected client edits one shared text buffer. Each accepted edit
//! replaces the buffer (last write wins) and is fanned out to all connected
//! clients; a client that joins late first receives the current text.
//!
//! # Example
//! ```no_run
//! use live_notepad::{NotepadServer, ServerConfig};
//!
//! # async fn example() -> live_notepad::Result<()> {
//! let config = ServerConfig::with_addr("127.0.0.1:8080".parse().unwrap());
//! let server = NotepadServer::new(config);
//!
//! server
//!     .run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod broadcast;
pub mod document;
pub mod error;
pub mod server;
pub mod session;
pub mod stats;

pub use broadcast::{BroadcastConfig, Broadcaster, UpdateFrame};
pub use document::Document;
pub use error::{Error, Result};
pub use server::{NotepadServer, ServerConfig};
pub use session::{SessionPhase, SessionState};
