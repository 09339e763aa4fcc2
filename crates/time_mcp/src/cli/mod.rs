use clap::Parser;

use crate::config::{Config, DEFAULT_LOG_LEVEL, DEFAULT_MODE, DEFAULT_PORT, DEFAULT_TIMEOUT};
use crate::errors::ConfigError;

/// Time MCP Server
///
/// A Model Context Protocol server exposing the current time and Unix timestamp.
///
/// ## Features
/// - **Tools**: `getCurrentTime` (timezone + custom format) and `getUnixTimestamp`
/// - **Transports**: newline-delimited JSON-RPC over stdio, or HTTP with server-sent events
///
/// ## Development
/// ```bash
/// npx @modelcontextprotocol/inspector cargo run --bin mcp-server-time
/// ```
///
/// ## Configuration
/// Add to your MCP client configuration:
/// ```json
/// {
///   "mcpServers": {
///     "time": {
///       "command": "mcp-server-time",
///       "args": ["--mode", "stdio"],
///       "env": {
///         "MCP_LOG_LEVEL": "warn"
///       }
///     }
///   }
/// }
/// ```
///
/// ## Environment Variables
/// - `MCP_MODE`, `MCP_PORT`, `MCP_TIMEOUT`, `MCP_LOG_LEVEL`: defaults for the matching flags
/// - `RUST_LOG`: overrides the log filter entirely
#[derive(Parser, Debug, Clone)]
#[command(name = "mcp-server-time")]
#[command(about = "An MCP server for current time and Unix timestamps over stdio or SSE")]
#[command(version)]
#[command(
    long_about = "A Model Context Protocol (MCP) server that reports the current time in any timezone, \noptionally formatted, and the current Unix timestamp. Serves over stdio or HTTP+SSE."
)]
pub struct Cli {
    /// Transport to serve on: 'stdio' or 'sse'
    #[arg(long, env = "MCP_MODE", default_value = DEFAULT_MODE, value_name = "MODE")]
    pub mode: String,

    /// TCP port for SSE mode (1-65535)
    #[arg(
        long,
        env = "MCP_PORT",
        default_value_t = i64::from(DEFAULT_PORT),
        value_name = "PORT",
        allow_negative_numbers = true
    )]
    pub port: i64,

    /// Advisory request timeout, e.g. 30s, 500ms, 1m30s
    #[arg(long, env = "MCP_TIMEOUT", default_value = DEFAULT_TIMEOUT, value_name = "DURATION")]
    pub timeout: String,

    /// Log level: debug, info, warn or error
    #[arg(long = "log-level", env = "MCP_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL, value_name = "LEVEL")]
    pub log_level: String,
}

impl Cli {
    /// Parse CLI arguments and convert to configuration
    pub fn parse_config() -> Result<Config, ConfigError> {
        Self::parse().into_config()
    }

    /// Validate the parsed arguments
    pub fn into_config(self) -> Result<Config, ConfigError> {
        Config::from_raw(&self.mode, self.port, &self.timeout, &self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{LogLevel, Mode};

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "mcp-server-time",
            "--mode",
            "sse",
            "--port",
            "9191",
            "--timeout",
            "1m",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();

        assert_eq!(config.mode, Mode::Sse);
        assert_eq!(config.port, 9191);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_negative_port_reaches_validation() {
        let cli =
            Cli::try_parse_from(["mcp-server-time", "--mode", "sse", "--port", "-1"]).unwrap();

        assert_eq!(
            cli.into_config().unwrap_err(),
            ConfigError::InvalidPort { value: -1 }
        );
    }

    #[test]
    fn test_invalid_mode_flag() {
        let cli = Cli::try_parse_from(["mcp-server-time", "--mode", "websocket"]).unwrap();

        assert_eq!(cli.into_config().unwrap_err().field(), "mode");
    }
}
