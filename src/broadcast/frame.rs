//! Frames fanned out to group members

use axum::extract::ws::{Message, Utf8Bytes};

/// One accepted document update
///
/// Cheap to clone: the text is reference counted, so every subscriber
/// shares the same allocation.
#[derive(Debug, Clone)]
pub struct UpdateFrame {
    /// Session ID of the publisher
    pub origin: u64,
    /// Full document text after the update
    pub text: Utf8Bytes,
}

impl UpdateFrame {
    /// Create a new update frame
    pub fn new(origin: u64, text: Utf8Bytes) -> Self {
        Self { origin, text }
    }

    /// Whether `session_id` published this frame
    pub fn is_from(&self, session_id: u64) -> bool {
        self.origin == session_id
    }

    /// Convert into an outbound WebSocket text message
    pub fn to_message(&self) -> Message {
        Message::Text(self.text.clone())
    }
}
