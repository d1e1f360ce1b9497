//! Server Configuration
//!
//! Command-line options for the `redkey` binary.

use crate::connection::MAX_BUFFER_SIZE;
use crate::{DEFAULT_HOST, DEFAULT_PORT};
use clap::Parser;

/// redkey - A concurrent, multi-type in-memory key-value store
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "redkey")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info", value_name = "FILTER")]
    pub log_level: String,

    /// Maximum bytes buffered per connection while a request is incomplete
    #[arg(long, default_value_t = MAX_BUFFER_SIZE, value_name = "BYTES")]
    pub max_buffer: usize,
}

impl Config {
    /// The `host:port` string to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            max_buffer: MAX_BUFFER_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["redkey"]);
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_address(), "127.0.0.1:6379");
        assert_eq!(config.max_buffer, 64 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = Config::parse_from([
            "redkey",
            "--host",
            "0.0.0.0",
            "-p",
            "6380",
            "--log-level",
            "redkey=debug",
            "--max-buffer",
            "1024",
        ]);
        assert_eq!(config.bind_address(), "0.0.0.0:6380");
        assert_eq!(config.log_level, "redkey=debug");
        assert_eq!(config.max_buffer, 1024);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Config::try_parse_from(["redkey", "--port", "big"]).is_err());
        assert!(Config::try_parse_from(["redkey", "--port", "70000"]).is_err());
    }
}
