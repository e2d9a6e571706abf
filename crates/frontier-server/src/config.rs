//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for a [`FrontierServer`](crate::FrontierServer).
///
/// The defaults suit a local game; the binary overlays environment
/// variables with [`from_env`](Self::from_env).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Version clients must announce in their login.
    pub protocol_version: u32,

    /// How long a fresh connection may take to send its login.
    pub handshake_timeout: Duration,

    /// How long a logged-in connection may stay silent before it is
    /// dropped.
    pub idle_timeout: Duration,

    /// Number of entries kept in the high-score table.
    pub high_score_capacity: usize,

    /// Most messages queued for one player. A batch that would go past it
    /// disconnects the player instead of being dropped.
    pub outbound_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7300".to_string(),
            protocol_version: frontier_protocol::PROTOCOL_VERSION,
            handshake_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(300),
            high_score_capacity: 10,
            outbound_capacity: 256,
        }
    }
}

impl ServerConfig {
    /// Defaults, with `FRONTIER_BIND` and `FRONTIER_HIGH_SCORES` applied
    /// when set. An unparsable capacity is logged and ignored.
    pub fn from_env() -> Self {
        Self::default().overlay(|name| std::env::var(name).ok())
    }

    fn overlay(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(addr) = var("FRONTIER_BIND") {
            self.bind_addr = addr;
        }
        if let Some(raw) = var("FRONTIER_HIGH_SCORES") {
            match raw.parse() {
                Ok(capacity) => self.high_score_capacity = capacity,
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "ignoring FRONTIER_HIGH_SCORES");
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.protocol_version, frontier_protocol::PROTOCOL_VERSION);
        assert_eq!(config.high_score_capacity, 10);
        assert!(config.handshake_timeout < config.idle_timeout);
    }

    #[test]
    fn test_overlay_applies_set_variables() {
        let config = ServerConfig::default().overlay(|name| match name {
            "FRONTIER_BIND" => Some("0.0.0.0:9000".into()),
            "FRONTIER_HIGH_SCORES" => Some("25".into()),
            _ => None,
        });
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.high_score_capacity, 25);
    }

    #[test]
    fn test_overlay_ignores_bad_capacity() {
        let config = ServerConfig::default().overlay(|name| {
            (name == "FRONTIER_HIGH_SCORES").then(|| "lots".to_string())
        });
        assert_eq!(config.high_score_capacity, 10);
    }

    #[test]
    fn test_server_config_json_round_trip() {
        let config = ServerConfig {
            high_score_capacity: 3,
            ..ServerConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
