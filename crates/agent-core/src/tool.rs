//! Tool System
//!
//! Statically described, schema-validated tools. Definitions are registered
//! once at startup; a malformed definition is a configuration error, while a
//! malformed *call* is turned into an observation for the model.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{AgentError, Result, ToolError};

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID, unique within the owning assistant turn
    pub id: String,

    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Result from tool execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Call ID this result answers
    pub tool_call_id: String,

    /// Tool that was called
    pub name: String,

    /// Text content on success, error otherwise
    pub outcome: std::result::Result<String, ToolError>,
}

impl ToolResult {
    pub fn success(call: &ToolCall, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            outcome: Ok(output.into()),
        }
    }

    pub fn failure(call: &ToolCall, error: ToolError) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            outcome: Err(error),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.outcome.as_ref().err()
    }

    /// Text injected into the conversation for the model to read
    pub fn observation(&self) -> String {
        match &self.outcome {
            Ok(output) => output.clone(),
            Err(ToolError::Remote(msg)) => format!("Error from '{}': {msg}", self.name),
            Err(e) => format!("Error: {e}"),
        }
    }
}

/// JSON type of a tool parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    /// Whether `value` is an instance of this type
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON type
    #[serde(rename = "type")]
    pub param_type: ParamType,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParameterSchema {
    pub fn required(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// Check the definition itself; run once at registration
    pub fn validate_definition(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AgentError::Config("tool name must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if param.name.trim().is_empty() {
                return Err(AgentError::Config(format!(
                    "tool '{}' has a parameter without a name",
                    self.name
                )));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(AgentError::Config(format!(
                    "tool '{}' declares parameter '{}' twice",
                    self.name, param.name
                )));
            }
            if let Some(default) = &param.default {
                if !param.param_type.accepts(default) {
                    return Err(AgentError::Config(format!(
                        "tool '{}': default for '{}' is not of type {}",
                        self.name,
                        param.name,
                        param.param_type.as_str()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validate call arguments and fill in declared defaults.
    ///
    /// `null` on an optional parameter counts as absent.
    pub fn validate_arguments(
        &self,
        arguments: &Map<String, Value>,
    ) -> std::result::Result<Map<String, Value>, ToolError> {
        for key in arguments.keys() {
            if !self.parameters.iter().any(|p| &p.name == key) {
                return Err(ToolError::InvalidArguments(format!(
                    "unknown parameter '{key}' for tool '{}'",
                    self.name
                )));
            }
        }

        let mut validated = Map::new();
        for param in &self.parameters {
            match arguments.get(&param.name).filter(|v| !v.is_null()) {
                Some(value) if param.param_type.accepts(value) => {
                    validated.insert(param.name.clone(), value.clone());
                }
                Some(value) => {
                    return Err(ToolError::InvalidArguments(format!(
                        "parameter '{}' must be of type {}, got {value}",
                        param.name,
                        param.param_type.as_str()
                    )));
                }
                None if param.required => {
                    return Err(ToolError::InvalidArguments(format!(
                        "missing required parameter '{}'",
                        param.name
                    )));
                }
                None => {
                    if let Some(default) = &param.default {
                        validated.insert(param.name.clone(), default.clone());
                    }
                }
            }
        }

        Ok(validated)
    }

    /// JSON Schema object for native function calling
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut prop = json!({
                "type": param.param_type.as_str(),
                "description": param.description,
            });
            if let (Some(default), Some(obj)) = (&param.default, prop.as_object_mut()) {
                obj.insert("default".into(), default.clone());
            }
            properties.insert(param.name.clone(), prop);
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with arguments already validated against [`Tool::schema`]
    async fn execute(&self, arguments: &Map<String, Value>) -> std::result::Result<String, ToolError>;
}

struct RegisteredTool {
    schema: ToolSchema,
    handler: Arc<dyn Tool>,
}

/// Registry for available tools, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let schema = tool.schema();
        schema.validate_definition()?;

        if self.index.contains_key(&schema.name) {
            return Err(AgentError::Config(format!(
                "tool '{}' registered twice",
                schema.name
            )));
        }

        self.index.insert(schema.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            schema,
            handler: tool,
        });
        Ok(())
    }

    /// Get a tool's schema by name
    pub fn schema(&self, name: &str) -> Option<&ToolSchema> {
        self.index.get(name).map(|&i| &self.tools[i].schema)
    }

    /// Validate and execute a tool call. Never fails: every problem becomes
    /// a failed [`ToolResult`].
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let Some(entry) = self.index.get(&call.name).map(|&i| &self.tools[i]) else {
            return ToolResult::failure(call, ToolError::NotFound(call.name.clone()));
        };

        let arguments = match entry.schema.validate_arguments(&call.arguments) {
            Ok(arguments) => arguments,
            Err(e) => return ToolResult::failure(call, e),
        };

        match entry.handler.execute(&arguments).await {
            Ok(output) => ToolResult::success(call, output),
            Err(e) => ToolResult::failure(call, e),
        }
    }

    /// All tool schemas, in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema.clone()).collect()
    }

    /// Tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.schema.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
