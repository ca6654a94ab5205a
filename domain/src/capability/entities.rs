//! Capability domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Risk level of a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk - read-only operations (e.g., vault.read_file, tracker.list_tasks)
    Low,
    /// High risk - operations that modify state (e.g., vault.write_file, tracker.create_task)
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::High => "high",
        }
    }

    pub fn is_mutating(&self) -> bool {
        matches!(self, RiskLevel::High)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JSON type of a capability parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// JSON Schema type keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Check whether a JSON value conforms to this type.
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named argument of a capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// JSON type of the value
    pub param_type: ParamType,
    /// Allowed values (strings only); empty means unrestricted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Element type for array parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ParamType>,
}

impl CapabilityParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: ParamType::String,
            enum_values: Vec::new(),
            items: None,
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn array_of(mut self, items: ParamType) -> Self {
        self.param_type = ParamType::Array;
        self.items = Some(items);
        self
    }
}

/// Definition of a side-effecting operation exposed to LLM backends.
///
/// Names are namespaced by backend (`tracker.*`, `vault.*`). Definitions are
/// immutable once registered in a [`CapabilityCatalog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDefinition {
    /// Namespaced name (e.g. "vault.write_file")
    pub name: String,
    /// Human-readable description, shown to the model
    pub description: String,
    /// Risk level of this capability
    pub risk_level: RiskLevel,
    /// Argument schema, in declaration order
    pub parameters: Vec<CapabilityParameter>,
    /// Declared result schema (JSON Schema)
    #[serde(default)]
    pub result_schema: serde_json::Value,
    /// Error codes this capability may report
    #[serde(default)]
    pub error_codes: Vec<String>,
}

impl CapabilityDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            risk_level,
            parameters: Vec::new(),
            result_schema: serde_json::json!({ "type": "object" }),
            error_codes: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: CapabilityParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_result_schema(mut self, schema: serde_json::Value) -> Self {
        self.result_schema = schema;
        self
    }

    pub fn with_error_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.error_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Function name advertised to function-calling APIs
    pub fn function_name(&self) -> String {
        function_name(&self.name)
    }

    pub fn parameter(&self, name: &str) -> Option<&CapabilityParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn is_mutating(&self) -> bool {
        self.risk_level.is_mutating()
    }
}

/// Map a capability name onto the identifier charset function-calling APIs
/// accept (`vault.read_file` -> `vault_read_file`).
pub fn function_name(capability: &str) -> String {
    capability.replace('.', "_")
}

/// Ordered catalogue of capabilities.
///
/// Iteration follows registration order so that tool schemas advertised to a
/// model are stable between runs. Registering a name twice replaces the
/// earlier definition in place.
#[derive(Debug, Clone, Default)]
pub struct CapabilityCatalog {
    capabilities: Vec<CapabilityDefinition>,
    index: HashMap<String, usize>,
}

impl CapabilityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, capability: CapabilityDefinition) -> Self {
        match self.index.get(&capability.name) {
            Some(&idx) => self.capabilities[idx] = capability,
            None => {
                self.index
                    .insert(capability.name.clone(), self.capabilities.len());
                self.capabilities.push(capability);
            }
        }
        self
    }

    /// All capabilities in registration order
    pub fn list(&self) -> &[CapabilityDefinition] {
        &self.capabilities
    }

    pub fn get(&self, name: &str) -> Option<&CapabilityDefinition> {
        self.index.get(name).map(|&idx| &self.capabilities[idx])
    }

    /// Reverse lookup from an advertised function name
    pub fn by_function_name(&self, function: &str) -> Option<&CapabilityDefinition> {
        self.capabilities
            .iter()
            .find(|c| function_name(&c.name) == function)
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

/// A request, emitted by a provider, to invoke a capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Name of the capability to call
    pub capability: String,
    /// Arguments passed to the capability
    pub arguments: serde_json::Map<String, serde_json::Value>,
    /// Provider-assigned id used to correlate the tool response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl ToolCallRequest {
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            arguments: serde_json::Map::new(),
            call_id: None,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_call_id(mut self, id: impl Into<String>) -> Self {
        self.call_id = Some(id.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        match self.get_string(key) {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(format!(
                "{} requires non-empty argument '{}'",
                self.capability, key
            )),
        }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(|v| v.as_i64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> CapabilityCatalog {
        CapabilityCatalog::new()
            .register(CapabilityDefinition::new(
                "vault.read_file",
                "Read file",
                RiskLevel::Low,
            ))
            .register(CapabilityDefinition::new(
                "tracker.create_task",
                "Create task",
                RiskLevel::High,
            ))
            .register(CapabilityDefinition::new(
                "vault.write_file",
                "Write file",
                RiskLevel::High,
            ))
    }

    #[test]
    fn test_risk_level() {
        assert!(!RiskLevel::Low.is_mutating());
        assert!(RiskLevel::High.is_mutating());
    }

    #[test]
    fn test_catalog_keeps_registration_order() {
        let catalog = sample_catalog();
        let names: Vec<&str> = catalog.list().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["vault.read_file", "tracker.create_task", "vault.write_file"]
        );
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = sample_catalog();
        assert!(catalog.get("vault.read_file").is_some());
        assert!(catalog.get("vault.delete_everything").is_none());
    }

    #[test]
    fn test_register_same_name_replaces_in_place() {
        let catalog = sample_catalog().register(CapabilityDefinition::new(
            "vault.read_file",
            "Read a vault note",
            RiskLevel::Low,
        ));
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.list()[0].description, "Read a vault note");
    }

    #[test]
    fn test_function_name_mapping() {
        let catalog = sample_catalog();
        assert_eq!(function_name("tracker.create_task"), "tracker_create_task");
        assert_eq!(
            catalog.by_function_name("vault_write_file").map(|c| c.name.as_str()),
            Some("vault.write_file")
        );
        assert!(catalog.by_function_name("vault.write_file").is_none());
    }

    #[test]
    fn test_tool_call_helpers() {
        let call = ToolCallRequest::new("vault.write_file")
            .with_arg("path", "daily/2026-01-01.md")
            .with_arg("content", "  ")
            .with_arg("limit", 5);

        assert_eq!(call.get_string("path"), Some("daily/2026-01-01.md"));
        assert_eq!(call.get_i64("limit"), Some(5));
        assert!(call.require_string("content").is_err());
        assert!(call.require_string("missing").is_err());
    }

    #[test]
    fn test_param_type_accepts() {
        assert!(ParamType::Integer.accepts(&serde_json::json!(3)));
        assert!(!ParamType::Integer.accepts(&serde_json::json!(3.5)));
        assert!(ParamType::Number.accepts(&serde_json::json!(3.5)));
        assert!(ParamType::Array.accepts(&serde_json::json!(["a"])));
        assert!(!ParamType::String.accepts(&serde_json::json!(null)));
    }
}
