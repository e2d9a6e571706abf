use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how a [`ClientSession`](crate::ClientSession) connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket URL of the server, e.g. `ws://127.0.0.1:7300`.
    pub url: String,

    /// Protocol version announced at login.
    pub protocol_version: u32,

    /// Login token handed to the server's authenticator.
    pub token: String,

    /// How long to wait for the server's answer to the login.
    pub receive_timeout: Duration,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:7300".to_string(),
            protocol_version: frontier_protocol::PROTOCOL_VERSION,
            token: String::new(),
            receive_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_defaults_for_the_rest() {
        let config = ClientConfig::new("ws://example:1", "t");
        assert_eq!(config.url, "ws://example:1");
        assert_eq!(config.token, "t");
        assert_eq!(config.protocol_version, frontier_protocol::PROTOCOL_VERSION);
        assert_eq!(config.receive_timeout, Duration::from_secs(5));
    }
}
