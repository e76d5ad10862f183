//! Line-delimited JSON envelopes exchanged between the controller and the
//! tool worker.
//!
//! worker -> controller: [`ServerMessage`] (startup line, then one response
//! per request line)
//! controller -> worker: `{"type":"tool","name":..,"arguments":{..}}`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `type` value of a tool-call request.
pub const REQUEST_TYPE_TOOL: &str = "tool";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Emitted once at startup, before any request is read.
    #[serde(rename = "mcp_initialized")]
    Initialized { tools: Vec<ToolDescriptor> },
    ToolResult { name: String, result: Value },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace: Option<String>,
    },
}

impl ServerMessage {
    pub fn tool_result(name: impl Into<String>, result: Value) -> Self {
        Self::ToolResult {
            name: name.into(),
            result,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            trace: None,
        }
    }

    pub fn error_with_trace(error: impl Into<String>, trace: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            trace: Some(trace.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// A tool invocation. Decoded after the `type` field was checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(rename = "type", default = "tool_type")]
    pub kind: String,
    pub name: String,
    /// Absent arguments decode as an empty object.
    #[serde(default = "empty_object")]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            kind: REQUEST_TYPE_TOOL.to_string(),
            name: name.into(),
            arguments,
        }
    }
}

fn tool_type() -> String {
    REQUEST_TYPE_TOOL.to_string()
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

// ---------------------------------------------------------------------------
// Tool descriptors (function-calling shape)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Number,
    Integer,
    String,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Whether a (non-null) JSON value satisfies this type.
    pub fn accepts(&self, v: &Value) -> bool {
        match self {
            ParamType::Number => v.is_number(),
            ParamType::Integer => v.is_i64() || v.is_u64(),
            ParamType::String => v.is_string(),
            ParamType::Boolean => v.is_boolean(),
            ParamType::Array => v.is_array(),
            ParamType::Object => v.is_object(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub kind: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParamSpec>>,
}

impl ParamSpec {
    pub fn new(kind: ParamType) -> Self {
        Self {
            kind,
            description: None,
            items: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn array_of(items: ParamSpec) -> Self {
        Self {
            kind: ParamType::Array,
            description: None,
            items: Some(Box::new(items)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametersSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: BTreeMap<String, ParamSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: ParametersSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

impl ToolDescriptor {
    pub fn function(function: FunctionSpec) -> Self {
        Self {
            kind: "function".to_string(),
            function,
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Compact single-line JSON (no trailing newline).
pub fn encode_line<T: Serialize>(msg: &T) -> serde_json::Result<String> {
    serde_json::to_string(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_tool_error_has_no_trace_field() {
        let line = encode_line(&ServerMessage::error("Unknown tool: x")).unwrap();
        assert_eq!(line, r#"{"type":"error","error":"Unknown tool: x"}"#);
    }

    #[test]
    fn tool_result_shape() {
        let v = serde_json::to_value(ServerMessage::tool_result("t", json!({"a": 1}))).unwrap();
        assert_eq!(v, json!({"type": "tool_result", "name": "t", "result": {"a": 1}}));
    }

    #[test]
    fn initialized_shape_omits_empty_required() {
        let d = ToolDescriptor::function(FunctionSpec {
            name: "list_files".into(),
            description: "List a directory".into(),
            parameters: ParametersSchema {
                kind: "object".into(),
                properties: BTreeMap::from([(
                    "dir".to_string(),
                    ParamSpec::new(ParamType::String),
                )]),
                required: vec![],
            },
        });
        let v = serde_json::to_value(ServerMessage::Initialized { tools: vec![d] }).unwrap();
        assert_eq!(v["type"], json!("mcp_initialized"));
        assert_eq!(v["tools"][0]["type"], json!("function"));
        assert_eq!(
            v["tools"][0]["function"]["parameters"],
            json!({"type": "object", "properties": {"dir": {"type": "string"}}})
        );
    }

    #[test]
    fn tool_call_defaults_arguments_to_empty_object() {
        let call: ToolCall = serde_json::from_value(json!({"type": "tool", "name": "x"})).unwrap();
        assert_eq!(call.arguments, json!({}));
    }

    #[test]
    fn server_messages_decode_from_lines() {
        let msg: ServerMessage =
            serde_json::from_str(r#"{"type":"error","error":"boom","trace":"at x"}"#).unwrap();
        assert_eq!(msg, ServerMessage::error_with_trace("boom", "at x"));
    }

    #[test]
    fn integer_type_rejects_fractions() {
        assert!(ParamType::Integer.accepts(&json!(3)));
        assert!(!ParamType::Integer.accepts(&json!(3.5)));
        assert!(ParamType::Number.accepts(&json!(3)));
    }
}
