use rmcp::model::JsonObject;
use rmcp::schemars;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::core::error::ToolError;

/// Helper function to deserialize and trim strings
fn deserialize_trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

/// Request to get the current time, optionally in a timezone and format
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct GetCurrentTimeRequest {
    /// Timezone (IANA format, e.g., 'America/New_York', or empty for UTC)
    #[serde(default, deserialize_with = "deserialize_trimmed_string")]
    pub timezone: String,
    /// Time format string using YYYY, MM, DD, HH, hh, mm, ss, SSS tokens (optional, defaults to RFC3339)
    #[serde(default)]
    pub format: String,
}

/// Request to get the current Unix timestamp (takes no parameters)
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct GetUnixTimestampRequest {}

/// A single call of a named tool, alive for one request only
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub parameters: JsonObject,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, parameters: JsonObject) -> Self {
        Self {
            tool_name: tool_name.into(),
            parameters,
        }
    }

    /// Deserialize the parameters into a typed request
    pub fn parse_parameters<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(serde_json::Value::Object(self.parameters.clone())).map_err(|e| {
            ToolError::InvalidParameters {
                tool: self.tool_name.clone(),
                message: e.to_string(),
            }
        })
    }
}

/// Text produced by a successful tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub text: String,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
