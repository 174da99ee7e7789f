//! Broadcaster configuration

/// Name of the single broadcast group
pub const DEFAULT_GROUP_NAME: &str = "broadcast";

/// Configuration for the session broadcaster
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Name of the broadcast group all sessions subscribe to
    pub group_name: String,

    /// Frames buffered per subscriber before the oldest are skipped
    pub channel_capacity: usize,

    /// Deliver updates back to the session that published them
    pub echo_to_sender: bool,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            group_name: DEFAULT_GROUP_NAME.to_string(),
            channel_capacity: 64,
            echo_to_sender: true,
        }
    }
}

impl BroadcastConfig {
    /// Set the group name
    pub fn group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = name.into();
        self
    }

    /// Set the fan-out channel capacity (minimum 1)
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Choose whether the publisher receives its own update
    pub fn echo_to_sender(mut self, echo: bool) -> Self {
        self.echo_to_sender = echo;
        self
    }
}
