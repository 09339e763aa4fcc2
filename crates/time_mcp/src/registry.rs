use std::collections::HashMap;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use rmcp::schemars::{self, JsonSchema};

use crate::core::{
    error::{RegistryError, ToolError},
    models::{GetCurrentTimeRequest, GetUnixTimestampRequest, ToolInvocation, ToolResult},
    provider::TimeOperations,
};

pub const GET_CURRENT_TIME: &str = "getCurrentTime";
pub const GET_UNIX_TIMESTAMP: &str = "getUnixTimestamp";

/// Names of the tools registered by [`ToolRegistry::with_time_tools`]
pub const TIME_TOOL_NAMES: &[&str] = &[GET_CURRENT_TIME, GET_UNIX_TIMESTAMP];

pub type ToolHandler = Arc<dyn Fn(ToolInvocation) -> Result<ToolResult, ToolError> + Send + Sync>;

/// Maps tool names to their descriptors and handlers.
///
/// Built once at startup and shared read-only between connections.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    descriptors: Vec<Tool>,
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `getCurrentTime` and `getUnixTimestamp` bound to `ops`
    pub fn with_time_tools(ops: TimeOperations) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        registry.register(
            Tool::new(
                GET_CURRENT_TIME,
                "Get LIVE current time from system clock. Use this tool whenever you need current time information, as it cannot be inferred from training data. Supports IANA timezone names such as America/New_York and custom formats built from YYYY, MM, DD, HH, hh, mm, ss and SSS tokens.",
                input_schema::<GetCurrentTimeRequest>(),
            ),
            Arc::new(move |invocation: ToolInvocation| -> Result<ToolResult, ToolError> {
                let request: GetCurrentTimeRequest = invocation.parse_parameters()?;
                let current = ops.current_time(&request.timezone)?;
                let text = ops.format_time(&current, &request.format)?;
                Ok(ToolResult::text(text))
            }),
        )?;

        registry.register(
            Tool::new(
                GET_UNIX_TIMESTAMP,
                "Get LIVE current Unix timestamp from system clock: the number of seconds since January 1, 1970 UTC.",
                input_schema::<GetUnixTimestampRequest>(),
            ),
            Arc::new(move |_invocation: ToolInvocation| -> Result<ToolResult, ToolError> {
                Ok(ToolResult::text(ops.unix_timestamp().to_string()))
            }),
        )?;

        tracing::debug!(tools = registry.descriptors.len(), "Registered time tools");
        Ok(registry)
    }

    /// Register a tool; the first registration of a name wins
    pub fn register(
        &mut self,
        descriptor: Tool,
        handler: ToolHandler,
    ) -> Result<(), RegistryError> {
        let name = descriptor.name.to_string();
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::DuplicateTool { name });
        }

        self.handlers.insert(name, handler);
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Run the handler bound to `invocation.tool_name`
    pub fn invoke(&self, invocation: ToolInvocation) -> Result<ToolResult, ToolError> {
        let handler = self
            .handlers
            .get(&invocation.tool_name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: invocation.tool_name.clone(),
            })?;

        tracing::debug!(tool = %invocation.tool_name, "Invoking tool");
        handler(invocation)
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> &[Tool] {
        &self.descriptors
    }
}

fn input_schema<T: JsonSchema>() -> JsonObject {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(serde_json::Value::Object(schema)) => schema,
        _ => JsonObject::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::error::TimeServerError;

    fn invocation(name: &str, parameters: serde_json::Value) -> ToolInvocation {
        let serde_json::Value::Object(parameters) = parameters else {
            panic!("parameters must be an object");
        };
        ToolInvocation::new(name, parameters)
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::with_time_tools(TimeOperations::new()).unwrap()
    }

    #[test]
    fn test_time_tools_registered_in_order() {
        let registry = registry();
        let names: Vec<_> = registry
            .descriptors()
            .iter()
            .map(|tool| tool.name.to_string())
            .collect();

        assert_eq!(names, TIME_TOOL_NAMES);
    }

    #[test]
    fn test_current_time_schema_lists_parameters() {
        let registry = registry();
        let schema = &registry.descriptors()[0].input_schema;
        let properties = schema
            .get("properties")
            .and_then(|p| p.as_object())
            .unwrap();

        assert!(properties.contains_key("timezone"));
        assert!(properties.contains_key("format"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = registry();
        let result = registry.register(
            Tool::new(GET_UNIX_TIMESTAMP, "shadow", JsonObject::new()),
            Arc::new(|_: ToolInvocation| Ok::<_, ToolError>(ToolResult::text("shadow"))),
        );

        assert!(matches!(
            result,
            Err(RegistryError::DuplicateTool { ref name }) if name == GET_UNIX_TIMESTAMP
        ));

        // First registration still answers
        let result = registry
            .invoke(invocation(GET_UNIX_TIMESTAMP, json!({})))
            .unwrap();
        assert_ne!(result.text, "shadow");
    }

    #[test]
    fn test_unknown_tool() {
        let result = registry().invoke(invocation("convert_time", json!({})));

        assert!(matches!(
            result,
            Err(ToolError::UnknownTool { ref name }) if name == "convert_time"
        ));
    }

    #[test]
    fn test_get_unix_timestamp() {
        let result = registry()
            .invoke(invocation(GET_UNIX_TIMESTAMP, json!({})))
            .unwrap();

        let timestamp: i64 = result.text.parse().unwrap();
        let now = chrono::Utc::now().timestamp();
        assert!((now - 60..=now + 60).contains(&timestamp));
    }

    #[test]
    fn test_get_current_time_with_format() {
        let result = registry()
            .invoke(invocation(
                GET_CURRENT_TIME,
                json!({"timezone": "UTC", "format": "YYYY"}),
            ))
            .unwrap();

        assert_eq!(result.text, chrono::Utc::now().format("%Y").to_string());
    }

    #[test]
    fn test_get_current_time_defaults_to_rfc3339_utc() {
        let result = registry()
            .invoke(invocation(GET_CURRENT_TIME, json!({})))
            .unwrap();

        assert!(result.text.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&result.text).is_ok());
    }

    #[test]
    fn test_get_current_time_invalid_timezone() {
        let result = registry().invoke(invocation(
            GET_CURRENT_TIME,
            json!({"timezone": "Invalid/Timezone", "format": "YYYY"}),
        ));

        assert!(matches!(
            result,
            Err(ToolError::Time(TimeServerError::InvalidTimezone { .. }))
        ));
    }

    #[test]
    fn test_get_current_time_dangerous_format() {
        let result = registry().invoke(invocation(
            GET_CURRENT_TIME,
            json!({"format": "$(rm -rf /)"}),
        ));

        assert!(matches!(
            result,
            Err(ToolError::Time(TimeServerError::InvalidFormat { .. }))
        ));
    }
}
