use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_MODE: &str = "stdio";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEOUT: &str = "30s";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Transport selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Stdio,
    Sse,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Mode::Stdio),
            "sse" => Ok(Mode::Sse),
            _ => Err(ConfigError::InvalidMode {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Stdio => "stdio",
            Mode::Sse => "sse",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel {
                value: s.to_string(),
            }),
        }
    }
}

/// Validated server configuration, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub port: u16,
    /// Advisory request timeout; not enforced by the time operations
    pub timeout: Duration,
    pub log_level: LogLevel,
}

impl Config {
    /// Validate raw settings.
    ///
    /// The port is only checked in SSE mode; stdio ignores it and keeps the default.
    pub fn from_raw(
        mode: &str,
        port: i64,
        timeout: &str,
        log_level: &str,
    ) -> Result<Self, ConfigError> {
        let mode: Mode = mode.parse()?;

        let port = match (mode, u16::try_from(port)) {
            (_, Ok(port)) if port != 0 => port,
            (Mode::Sse, _) => return Err(ConfigError::InvalidPort { value: port }),
            (Mode::Stdio, _) => DEFAULT_PORT,
        };

        let timeout = parse_duration(timeout)?;
        let log_level = log_level.parse()?;

        Ok(Self {
            mode,
            port,
            timeout,
            log_level,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Stdio,
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(30),
            log_level: LogLevel::Info,
        }
    }
}

/// Parse a positive duration such as "500ms", "30s", "1.5m" or "1m30s".
///
/// Units: ns, us (or µs), ms, s, m, h. Components may be chained.
pub fn parse_duration(duration_str: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidTimeout {
        value: duration_str.to_string(),
    };

    let mut rest = duration_str.trim();
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        // Find where the number ends and unit begins
        let split_pos = rest
            .find(|c: char| c.is_alphabetic())
            .filter(|&pos| pos > 0)
            .ok_or_else(invalid)?;
        let (number_part, tail) = rest.split_at(split_pos);
        let unit_len = tail
            .find(|c: char| !c.is_alphabetic())
            .unwrap_or(tail.len());
        let (unit_part, tail) = tail.split_at(unit_len);

        let number: f64 = number_part.parse().map_err(|_| invalid())?;
        if !number.is_finite() || number < 0.0 {
            return Err(invalid());
        }

        let nanos_per_unit = match unit_part {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };

        let nanos = (number * nanos_per_unit).round();
        if nanos >= u64::MAX as f64 {
            return Err(invalid());
        }
        total = total
            .checked_add(Duration::from_nanos(nanos as u64))
            .ok_or_else(invalid)?;
        rest = tail;
    }

    if total.is_zero() {
        return Err(invalid());
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config =
            Config::from_raw(DEFAULT_MODE, DEFAULT_PORT.into(), DEFAULT_TIMEOUT, DEFAULT_LOG_LEVEL)
                .unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_sse_mode() {
        let config = Config::from_raw("sse", 9090, "5s", "debug").unwrap();

        assert_eq!(config.mode, Mode::Sse);
        assert_eq!(config.port, 9090);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_mode() {
        let error = Config::from_raw("http", 8080, "30s", "info").unwrap_err();

        assert_eq!(
            error,
            ConfigError::InvalidMode {
                value: "http".to_string()
            }
        );
        assert_eq!(error.field(), "mode");
    }

    #[test]
    fn test_invalid_port_in_sse_mode() {
        for port in [0, -1, 65536, 70000] {
            let error = Config::from_raw("sse", port, "30s", "info").unwrap_err();
            assert_eq!(error, ConfigError::InvalidPort { value: port });
        }

        assert_eq!(Config::from_raw("sse", 1, "30s", "info").unwrap().port, 1);
        assert_eq!(Config::from_raw("sse", 65535, "30s", "info").unwrap().port, 65535);
    }

    #[test]
    fn test_port_ignored_in_stdio_mode() {
        let config = Config::from_raw("stdio", 0, "30s", "info").unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_timeout() {
        for timeout in ["0s", "-5s", "", "abc", "30", "10d", "s"] {
            let error = Config::from_raw("stdio", 8080, timeout, "info").unwrap_err();
            assert_eq!(error.field(), "timeout", "{timeout} should be rejected");
        }
    }

    #[test]
    fn test_invalid_log_level() {
        let error = Config::from_raw("stdio", 8080, "30s", "trace").unwrap_err();

        assert_eq!(
            error,
            ConfigError::InvalidLogLevel {
                value: "trace".to_string()
            }
        );
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration(" 10s ").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!("warn".parse::<LogLevel>().unwrap().as_filter(), "warn");
        assert_eq!(LogLevel::Error.as_filter(), "error");
    }
}
