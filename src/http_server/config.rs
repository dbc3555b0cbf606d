//! HTTP Server Configuration
//!
//! Host, port, CORS and realtime settings. Every field has a default so a
//! partial JSON config file is valid.

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins. Empty means permissive.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Directory served for every path not handled by the API (default: "public")
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Events buffered per connection before a slow client skips ahead
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,

    /// Largest accepted WebSocket message in bytes (default: 64KB)
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_broadcast_capacity() -> usize {
    256
}

fn default_max_message_bytes() -> usize {
    65536
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            static_dir: default_static_dir(),
            broadcast_capacity: default_broadcast_capacity(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be > 0".to_string());
        }
        if self.broadcast_capacity == 0 {
            return Err("broadcast_capacity must be > 0".to_string());
        }
        if self.max_message_bytes == 0 {
            return Err("max_message_bytes must be > 0".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, "public");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::with_port(8080);
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ServerConfig = serde_json::from_str(r#"{"port": 4000}"#).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.broadcast_capacity, 256);
        assert_eq!(config.max_message_bytes, 65536);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(ServerConfig::with_port(0).validate().is_err());

        let config = ServerConfig {
            broadcast_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
