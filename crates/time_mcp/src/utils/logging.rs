use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;
use crate::errors::{AppError, AppResult};

/// Initialize logging for the configured level
///
/// Logs always go to stderr: in stdio mode stdout carries the protocol.
///
/// # Environment Variables
/// - `RUST_LOG`: when set, replaces the configured level with a full filter directive
///
/// # Returns
/// - `Ok(())` if logging is successfully initialized
/// - `Err(AppError::LoggingInitialization)` if a global subscriber is already set
pub fn init_logging(level: LogLevel) -> AppResult<()> {
    let env_filter = build_filter(level);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::LoggingInitialization(e.to_string()))
}

fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_error() {
        // Whichever call installs the global subscriber first, the next one must fail
        let _ = init_logging(LogLevel::Info);
        let result = init_logging(LogLevel::Debug);

        assert!(matches!(result, Err(AppError::LoggingInitialization(_))));
    }
}
