//! Shared document state
//!
//! The single text value every client edits. Last write wins; there is no
//! history. Text is held as a reference-counted UTF-8 buffer so the same
//! allocation backs the document and every outbound frame carrying it.

use axum::extract::ws::Utf8Bytes;

/// The shared text buffer
#[derive(Debug, Clone)]
pub struct Document {
    text: Utf8Bytes,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            text: Utf8Bytes::from(""),
        }
    }

    /// Current content
    pub fn get(&self) -> Utf8Bytes {
        self.text.clone()
    }

    /// Replace the content unconditionally
    pub fn set(&mut self, text: impl Into<Utf8Bytes>) {
        self.text = text.into();
    }

    /// Length of the content in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
