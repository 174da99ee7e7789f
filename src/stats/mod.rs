//! Statistics for sessions, the broadcaster and the server

pub mod metrics;

pub use metrics::{BroadcasterStats, ServerStats, SessionStats};
