//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound frame buffer size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Maximum room memberships per connection.
    #[serde(default = "default_max_rooms")]
    pub max_rooms_per_connection: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            max_rooms_per_connection: default_max_rooms(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_max_rooms() -> usize {
    16
}
