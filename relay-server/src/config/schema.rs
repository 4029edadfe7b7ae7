//! Configuration schema structs

use std::time::Duration;

use relay_protocol::DEFAULT_MAX_LINE_LENGTH;
use relay_utils::LogOutput;
use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_SIZE;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Listener and session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind (default: localhost)
    pub host: String,
    /// Port to bind (default: 5555)
    pub port: u16,
    /// Broadcast lines kept for `history` (default: 20)
    pub history_size: usize,
    /// Per-session outbound queue capacity (default: 256)
    pub outbound_buffer: usize,
    /// Longest accepted request line in bytes (default: 64 KiB)
    pub max_line_length: usize,
    /// Per-write deadline in milliseconds; unset means no deadline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5555,
            history_size: DEFAULT_HISTORY_SIZE,
            outbound_buffer: 256,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            write_timeout_ms: None,
        }
    }
}

impl ServerConfig {
    /// Address string suitable for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "relay_server=debug"
    pub filter: String,
    pub output: LogOutput,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            output: LogOutput::Stderr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 5555);
        assert_eq!(config.server.history_size, 20);
        assert_eq!(config.server.max_line_length, 65536);
        assert_eq!(config.server.write_timeout(), None);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig {
            host: "0.0.0.0".into(),
            port: 7000,
            ..ServerConfig::default()
        };
        assert_eq!(server.bind_addr(), "0.0.0.0:7000");
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 6000
            write_timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 6000);
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.write_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_logging_output_parses() {
        let config: AppConfig = toml::from_str("[logging]\noutput = \"both\"\n").unwrap();
        assert_eq!(config.logging.output, LogOutput::Both);
    }
}
