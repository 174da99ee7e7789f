//! Per-connection session state

pub mod inbound;
pub mod state;

pub use inbound::Inbound;
pub use state::{SessionPhase, SessionState};
