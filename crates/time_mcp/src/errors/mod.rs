use std::net::SocketAddr;

use crate::core::error::RegistryError;

/// Result type for process-level operations
pub type AppResult<T> = Result<T, AppError>;

/// Startup configuration errors; each names the offending field and value
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid mode '{value}': must be 'sse' or 'stdio' (field: mode)")]
    InvalidMode { value: String },
    #[error("invalid port {value}: must be between 1 and 65535 (field: port)")]
    InvalidPort { value: i64 },
    #[error("invalid timeout '{value}': must be a positive duration such as 30s (field: timeout)")]
    InvalidTimeout { value: String },
    #[error("invalid log level '{value}': must be one of debug, info, warn, error (field: log-level)")]
    InvalidLogLevel { value: String },
}

impl ConfigError {
    /// Name of the configuration field that failed validation
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::InvalidMode { .. } => "mode",
            ConfigError::InvalidPort { .. } => "port",
            ConfigError::InvalidTimeout { .. } => "timeout",
            ConfigError::InvalidLogLevel { .. } => "log-level",
        }
    }
}

/// Transport lifecycle errors
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("{transport} transport failed: {message}")]
    Serve {
        transport: &'static str,
        message: String,
    },
    /// Shutdown requested through the cancellation token; not a fault
    #[error("{transport} transport cancelled")]
    Cancelled { transport: &'static str },
}

impl TransportError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled { .. })
    }

    pub(crate) fn serve(transport: &'static str, message: impl ToString) -> Self {
        TransportError::Serve {
            transport,
            message: message.to_string(),
        }
    }
}

/// Errors that end the process
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Configuration validation failed: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to register tools: {0}")]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Logging initialization failed
    #[error("Logging initialization failed: {0}")]
    LoggingInitialization(String),
}
