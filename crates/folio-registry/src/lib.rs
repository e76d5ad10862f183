//! Tool registry: catalogue of callable tools and their parameter schemas.
//!
//! # Purpose
//! The worker exposes a fixed set of named tools. Each registry entry is:
//!
//! - [`ToolMeta`]: static metadata (name, description, parameter specs,
//!   required parameter names).
//! - A [`ToolHandler`]: a `Send + Sync` closure that receives the validated
//!   argument object and returns a JSON value.
//!
//! The registry is built once at startup and then only read. The dispatcher
//! borrows it (`&ToolRegistry`); there is no process-wide table.
//!
//! # Validation
//! [`ToolRegistry::invoke`] runs [`validate_arguments`] against the declared
//! schema before the handler sees the arguments, so handlers can decode into
//! typed structs without re-checking presence or JSON types.
//!
//! # Determinism
//! Insertion order is preserved in `list()` / `descriptors()` output.
//! Duplicate names are rejected at registration time.

mod validate;

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use folio_schemas::{FunctionSpec, ParamSpec, ParametersSchema, ToolDescriptor};
use serde_json::{Map, Value};

pub use validate::{validate_arguments, ArgumentError};

// ---------------------------------------------------------------------------
// Handler type alias
// ---------------------------------------------------------------------------

/// A thread-safe tool implementation.
///
/// Receives the validated argument object; returns a JSON-serializable
/// result or an error that the dispatcher turns into an error response.
pub type ToolHandler = Box<dyn Fn(&Map<String, Value>) -> Result<Value> + Send + Sync>;

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Static metadata for a registered tool.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolMeta {
    /// Unique name used as the registry key.
    pub name: String,

    /// Human-readable description forwarded to the decision-making agent.
    pub description: String,

    /// Declared parameters, in declaration order.
    pub params: Vec<(String, ParamSpec)>,

    /// Names of parameters that must be present and non-null.
    pub required: Vec<String>,
}

impl ToolMeta {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            required: Vec::new(),
        }
    }

    /// Declare an optional parameter.
    pub fn param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.params.push((name.into(), spec));
        self
    }

    /// Declare a required parameter.
    pub fn required_param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.params.push((name, spec));
        self
    }

    pub fn param_spec(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// The function-calling descriptor advertised in the startup message.
    pub fn descriptor(&self) -> ToolDescriptor {
        let properties: BTreeMap<String, ParamSpec> = self.params.iter().cloned().collect();
        ToolDescriptor::function(FunctionSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: ParametersSchema {
                kind: "object".to_string(),
                properties,
                required: self.required.clone(),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by [`ToolRegistry`] operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A tool with the given name is already registered.
    DuplicateName { name: String },
    /// No tool with the given name is registered.
    UnknownTool { name: String },
    /// The tool name is empty or contains only whitespace.
    EmptyName,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "tool '{name}' is already registered"),
            // Wire-visible text; the controller matches on this prefix.
            Self::UnknownTool { name } => write!(f, "Unknown tool: {name}"),
            Self::EmptyName => write!(f, "tool name must not be empty"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Failure of [`ToolRegistry::invoke`].
#[derive(Debug)]
pub enum InvokeError {
    /// The tool name is not registered.
    Unknown(RegistryError),
    /// Arguments did not match the declared schema.
    Arguments(ArgumentError),
    /// The handler itself failed.
    Execution(anyhow::Error),
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(e) => write!(f, "{e}"),
            Self::Arguments(e) => write!(f, "{e}"),
            Self::Execution(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InvokeError {}

// ---------------------------------------------------------------------------
// Registry entry (internal)
// ---------------------------------------------------------------------------

struct RegistryEntry {
    meta: ToolMeta,
    handler: ToolHandler,
}

// ---------------------------------------------------------------------------
// ToolRegistry
// ---------------------------------------------------------------------------

/// Catalogue of available tools and their handlers.
///
/// Maintains insertion order for deterministic descriptor output.
/// Names are compared case-sensitively.
pub struct ToolRegistry {
    entries: Vec<RegistryEntry>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a tool by metadata and handler closure.
    ///
    /// # Errors
    /// - [`RegistryError::EmptyName`] if `meta.name` is empty/whitespace.
    /// - [`RegistryError::DuplicateName`] if the name is already taken.
    pub fn register<F>(&mut self, meta: ToolMeta, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&Map<String, Value>) -> Result<Value> + Send + Sync + 'static,
    {
        if meta.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.contains(&meta.name) {
            return Err(RegistryError::DuplicateName {
                name: meta.name.clone(),
            });
        }
        self.entries.push(RegistryEntry {
            meta,
            handler: Box::new(handler),
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.meta.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Metadata for all registered tools in insertion order.
    pub fn list(&self) -> Vec<&ToolMeta> {
        self.entries.iter().map(|e| &e.meta).collect()
    }

    /// Startup descriptors for all tools in insertion order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(|e| e.meta.descriptor()).collect()
    }

    /// Look up metadata for a tool by name.
    ///
    /// # Errors
    /// [`RegistryError::UnknownTool`] if the name is not found.
    pub fn lookup(&self, name: &str) -> Result<&ToolMeta, RegistryError> {
        self.entry(name).map(|e| &e.meta)
    }

    fn entry(&self, name: &str) -> Result<&RegistryEntry, RegistryError> {
        self.entries
            .iter()
            .find(|e| e.meta.name == name)
            .ok_or_else(|| RegistryError::UnknownTool {
                name: name.to_string(),
            })
    }

    /// Validate `arguments` against the tool's schema, then call its handler.
    ///
    /// Optional parameters passed as `null` are stripped before the handler
    /// runs, so handlers see them as absent.
    pub fn invoke(&self, name: &str, arguments: &Value) -> Result<Value, InvokeError> {
        let entry = self.entry(name).map_err(InvokeError::Unknown)?;
        let args = validate_arguments(&entry.meta, arguments).map_err(InvokeError::Arguments)?;
        (entry.handler)(&args).map_err(InvokeError::Execution)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use folio_schemas::ParamType;
    use serde_json::json;

    fn echo_meta(name: &str) -> ToolMeta {
        ToolMeta::new(name, "echo arguments back")
            .required_param("x", ParamSpec::new(ParamType::Number))
            .param("note", ParamSpec::new(ParamType::String))
    }

    fn echo(args: &Map<String, Value>) -> Result<Value> {
        Ok(Value::Object(args.clone()))
    }

    // --- Registration ---

    #[test]
    fn register_single_tool_succeeds() {
        let mut reg = ToolRegistry::new();
        assert!(reg.register(echo_meta("echo"), echo).is_ok());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn register_duplicate_name_errors() {
        let mut reg = ToolRegistry::new();
        reg.register(echo_meta("echo"), echo).unwrap();
        let err = reg.register(echo_meta("echo"), echo);
        assert_eq!(
            err,
            Err(RegistryError::DuplicateName {
                name: "echo".to_string()
            })
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn register_empty_name_errors() {
        let mut reg = ToolRegistry::new();
        assert_eq!(
            reg.register(echo_meta("  "), echo),
            Err(RegistryError::EmptyName)
        );
    }

    #[test]
    fn new_registry_is_empty() {
        let reg = ToolRegistry::default();
        assert!(reg.is_empty());
    }

    // --- list / descriptors ---

    #[test]
    fn list_returns_entries_in_insertion_order() {
        let mut reg = ToolRegistry::new();
        for n in ["gamma", "alpha", "beta"] {
            reg.register(echo_meta(n), echo).unwrap();
        }
        let names: Vec<&str> = reg.list().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["gamma", "alpha", "beta"]);
        let d: Vec<String> = reg.descriptors().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(d, ["gamma", "alpha", "beta"]);
    }

    #[test]
    fn descriptor_carries_required_fields() {
        let v = serde_json::to_value(echo_meta("echo").descriptor()).unwrap();
        assert_eq!(v["function"]["parameters"]["required"], json!(["x"]));
        assert_eq!(
            v["function"]["parameters"]["properties"]["x"],
            json!({"type": "number"})
        );
    }

    // --- lookup / invoke ---

    #[test]
    fn lookup_unknown_name_errors() {
        let reg = ToolRegistry::new();
        let err = reg.lookup("ghost").unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: ghost");
    }

    #[test]
    fn invoke_passes_validated_arguments() {
        let mut reg = ToolRegistry::new();
        reg.register(echo_meta("echo"), echo).unwrap();
        let out = reg.invoke("echo", &json!({"x": 1.5, "note": null})).unwrap();
        // null optional stripped
        assert_eq!(out, json!({"x": 1.5}));
    }

    #[test]
    fn invoke_reports_argument_errors_before_calling_handler() {
        let mut reg = ToolRegistry::new();
        reg.register(echo_meta("echo"), |_| panic!("handler must not run"))
            .unwrap();
        let err = reg.invoke("echo", &json!({})).unwrap_err();
        assert!(matches!(err, InvokeError::Arguments(ArgumentError::MissingRequired { .. })));
    }

    #[test]
    fn invoke_surfaces_handler_failure() {
        let mut reg = ToolRegistry::new();
        reg.register(echo_meta("boom"), |_| anyhow::bail!("kaput"))
            .unwrap();
        let err = reg.invoke("boom", &json!({"x": 1})).unwrap_err();
        assert!(matches!(err, InvokeError::Execution(_)));
        assert_eq!(err.to_string(), "kaput");
    }
}
