use rmcp::ErrorData as McpError;
use rmcp::serde_json::json;

use crate::core::utils::DANGEROUS_PATTERNS;

// Error codes
const ERROR_INVALID_TIMEZONE: &str = "invalid_timezone";
const ERROR_INVALID_FORMAT: &str = "invalid_format";
const ERROR_UNKNOWN_TOOL: &str = "unknown_tool";
const ERROR_INVALID_PARAMETERS: &str = "invalid_parameters";

/// Errors produced by the time operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeServerError {
    #[error("Invalid timezone '{timezone}': {reason}")]
    InvalidTimezone { timezone: String, reason: String },
    #[error("Invalid format '{format}': {reason}")]
    InvalidFormat { format: String, reason: String },
}

impl TimeServerError {
    pub(crate) fn invalid_timezone(timezone: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTimezone {
            timezone: timezone.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_format(format: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            format: format.to_string(),
            reason: reason.into(),
        }
    }
}

/// Registration-time failures of the tool registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Tool already registered: {name}")]
    DuplicateTool { name: String },
}

/// Per-invocation failures surfaced to the protocol client
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },
    #[error("Invalid parameters for {tool}: {message}")]
    InvalidParameters { tool: String, message: String },
    #[error(transparent)]
    Time(#[from] TimeServerError),
}

impl From<TimeServerError> for McpError {
    fn from(err: TimeServerError) -> Self {
        match err {
            TimeServerError::InvalidTimezone { timezone, reason } => McpError::invalid_params(
                ERROR_INVALID_TIMEZONE,
                Some(json!({"timezone": timezone, "reason": reason})),
            ),
            TimeServerError::InvalidFormat { format, reason } => McpError::invalid_params(
                ERROR_INVALID_FORMAT,
                Some(json!({
                    "format": format,
                    "reason": reason,
                    "forbidden_patterns": DANGEROUS_PATTERNS
                })),
            ),
        }
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool { name } => McpError::invalid_params(
                ERROR_UNKNOWN_TOOL,
                Some(json!({
                    "name": name,
                    "available_tools": crate::registry::TIME_TOOL_NAMES
                })),
            ),
            ToolError::InvalidParameters { tool, message } => McpError::invalid_params(
                ERROR_INVALID_PARAMETERS,
                Some(json!({"tool": tool, "message": message})),
            ),
            ToolError::Time(err) => err.into(),
        }
    }
}

pub type TimeServerResult<T> = Result<T, TimeServerError>;
pub type McpResult<T> = Result<T, McpError>;
