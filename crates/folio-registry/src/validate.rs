use std::fmt;

use folio_schemas::ParamType;
use serde_json::{Map, Value};

use crate::ToolMeta;

/// Schema violations found before a handler is called.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgumentError {
    /// `arguments` was not a JSON object.
    NotAnObject { tool: String },
    /// A required parameter was absent or null.
    MissingRequired { tool: String, param: String },
    /// A parameter not declared by the tool was supplied.
    UnexpectedArgument { tool: String, param: String },
    /// A parameter (or array item) had the wrong JSON type.
    TypeMismatch {
        tool: String,
        param: String,
        expected: ParamType,
        found: &'static str,
    },
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { tool } => {
                write!(f, "{tool}: arguments must be a JSON object")
            }
            Self::MissingRequired { tool, param } => {
                write!(f, "{tool}: missing required argument '{param}'")
            }
            Self::UnexpectedArgument { tool, param } => {
                write!(f, "{tool}: unexpected argument '{param}'")
            }
            Self::TypeMismatch {
                tool,
                param,
                expected,
                found,
            } => write!(
                f,
                "{tool}: argument '{param}' must be of type {}, got {found}",
                expected.as_str()
            ),
        }
    }
}

impl std::error::Error for ArgumentError {}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check `arguments` against the declared schema of `meta`.
///
/// Rules:
/// - arguments must be an object
/// - every required name present and non-null
/// - every supplied name declared
/// - every non-null value matches its declared type; array items are
///   checked one level deep when `items` is declared
///
/// Returns the argument object with null-valued optional parameters removed.
pub fn validate_arguments(
    meta: &ToolMeta,
    arguments: &Value,
) -> Result<Map<String, Value>, ArgumentError> {
    let tool = || meta.name.clone();

    let obj = arguments
        .as_object()
        .ok_or_else(|| ArgumentError::NotAnObject { tool: tool() })?;

    for req in &meta.required {
        match obj.get(req) {
            None | Some(Value::Null) => {
                return Err(ArgumentError::MissingRequired {
                    tool: tool(),
                    param: req.clone(),
                })
            }
            Some(_) => {}
        }
    }

    let mut out = Map::new();
    for (name, value) in obj {
        let spec = meta
            .param_spec(name)
            .ok_or_else(|| ArgumentError::UnexpectedArgument {
                tool: tool(),
                param: name.clone(),
            })?;

        if value.is_null() {
            continue;
        }

        if !spec.kind.accepts(value) {
            return Err(ArgumentError::TypeMismatch {
                tool: tool(),
                param: name.clone(),
                expected: spec.kind,
                found: json_kind(value),
            });
        }

        if let (Some(items), Value::Array(arr)) = (&spec.items, value) {
            for (i, item) in arr.iter().enumerate() {
                if !items.kind.accepts(item) {
                    return Err(ArgumentError::TypeMismatch {
                        tool: tool(),
                        param: format!("{name}[{i}]"),
                        expected: items.kind,
                        found: json_kind(item),
                    });
                }
            }
        }

        out.insert(name.clone(), value.clone());
    }

    Ok(out)
}
