//! Classification of messages received from a client

use axum::extract::ws::{Message, Utf8Bytes};

/// What a received WebSocket message means to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Replacement text for the document
    Update(Utf8Bytes),
    /// Binary payload; dropped without effect
    Ignored,
    /// Ping or pong; counts as activity, the transport answers pings on its own
    Keepalive,
    /// Client asked to close
    Close,
}

impl Inbound {
    /// Classify a transport message
    pub fn classify(message: Message) -> Self {
        match message {
            Message::Text(text) => Inbound::Update(text),
            Message::Binary(_) => Inbound::Ignored,
            Message::Ping(_) | Message::Pong(_) => Inbound::Keepalive,
            Message::Close(_) => Inbound::Close,
        }
    }
}
