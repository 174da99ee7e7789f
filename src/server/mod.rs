//! Notepad server
//!
//! Axum listener and routes, plus the per-connection session driver.

pub mod config;
pub mod connection;
pub mod listener;
mod routes;

pub use config::ServerConfig;
pub use connection::Connection;
pub use listener::NotepadServer;
