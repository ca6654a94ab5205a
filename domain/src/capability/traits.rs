//! Capability domain traits
//!
//! Contains pure domain logic for argument validation.
//! The async runtime port is defined in the application layer (ports).

use super::entities::{CapabilityDefinition, ParamType, ToolCallRequest};
use std::collections::HashSet;

/// Validator for tool call requests
///
/// This is a pure domain trait that validates a request against its
/// definition without any I/O operations.
pub trait CapabilityValidator {
    /// Validate a request against its definition
    fn validate(
        &self,
        request: &ToolCallRequest,
        definition: &CapabilityDefinition,
    ) -> Result<(), String>;
}

/// Default implementation of CapabilityValidator
///
/// Checks presence of required parameters, rejects unknown parameters, and
/// verifies JSON types, enum membership and array element types. `null` is
/// treated as "not provided" for optional parameters.
#[derive(Debug, Clone, Default)]
pub struct DefaultCapabilityValidator;

impl CapabilityValidator for DefaultCapabilityValidator {
    fn validate(
        &self,
        request: &ToolCallRequest,
        definition: &CapabilityDefinition,
    ) -> Result<(), String> {
        for param in &definition.parameters {
            let value = request.arguments.get(&param.name);
            let provided = value.is_some_and(|v| !v.is_null());

            if param.required && !provided {
                return Err(format!(
                    "Missing required parameter '{}' for capability '{}'",
                    param.name, definition.name
                ));
            }

            let Some(value) = value.filter(|v| !v.is_null()) else {
                continue;
            };

            if !param.param_type.accepts(value) {
                return Err(format!(
                    "Parameter '{}' for capability '{}' must be of type {}",
                    param.name, definition.name, param.param_type
                ));
            }

            if !param.enum_values.is_empty() {
                let matches = value
                    .as_str()
                    .is_some_and(|s| param.enum_values.iter().any(|e| e == s));
                if !matches {
                    return Err(format!(
                        "Parameter '{}' for capability '{}' must be one of: {}",
                        param.name,
                        definition.name,
                        param.enum_values.join(", ")
                    ));
                }
            }

            if let (ParamType::Array, Some(items), Some(elements)) =
                (param.param_type, param.items, value.as_array())
                && let Some(pos) = elements.iter().position(|e| !items.accepts(e))
            {
                return Err(format!(
                    "Element {} of '{}' for capability '{}' must be of type {}",
                    pos, param.name, definition.name, items
                ));
            }
        }

        let valid_params: HashSet<&str> =
            definition.parameters.iter().map(|p| p.name.as_str()).collect();

        for arg_name in request.arguments.keys() {
            if !valid_params.contains(arg_name.as_str()) {
                return Err(format!(
                    "Unknown parameter '{}' for capability '{}'",
                    arg_name, definition.name
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::entities::{CapabilityParameter, RiskLevel};

    fn write_definition() -> CapabilityDefinition {
        CapabilityDefinition::new("vault.write_file", "Write", RiskLevel::High)
            .with_parameter(CapabilityParameter::new("path", "Path", true))
            .with_parameter(CapabilityParameter::new("content", "Content", true))
            .with_parameter(
                CapabilityParameter::new("mode", "Mode", false).with_enum(["overwrite", "append"]),
            )
    }

    #[test]
    fn test_validator_missing_required() {
        let call = ToolCallRequest::new("vault.write_file").with_arg("path", "a.md");
        let result = DefaultCapabilityValidator.validate(&call, &write_definition());
        assert!(result.unwrap_err().contains("Missing required parameter 'content'"));
    }

    #[test]
    fn test_validator_unknown_param() {
        let call = ToolCallRequest::new("vault.write_file")
            .with_arg("path", "a.md")
            .with_arg("content", "x")
            .with_arg("encoding", "latin1");
        let result = DefaultCapabilityValidator.validate(&call, &write_definition());
        assert!(result.unwrap_err().contains("Unknown parameter 'encoding'"));
    }

    #[test]
    fn test_validator_wrong_type() {
        let call = ToolCallRequest::new("vault.write_file")
            .with_arg("path", 42)
            .with_arg("content", "x");
        let result = DefaultCapabilityValidator.validate(&call, &write_definition());
        assert!(result.unwrap_err().contains("must be of type string"));
    }

    #[test]
    fn test_validator_enum() {
        let call = ToolCallRequest::new("vault.write_file")
            .with_arg("path", "a.md")
            .with_arg("content", "x")
            .with_arg("mode", "truncate");
        let result = DefaultCapabilityValidator.validate(&call, &write_definition());
        assert!(result.unwrap_err().contains("must be one of: overwrite, append"));
    }

    #[test]
    fn test_validator_null_optional_is_absent() {
        let call = ToolCallRequest::new("vault.write_file")
            .with_arg("path", "a.md")
            .with_arg("content", "x")
            .with_arg("mode", serde_json::Value::Null);
        assert!(DefaultCapabilityValidator
            .validate(&call, &write_definition())
            .is_ok());
    }

    #[test]
    fn test_validator_array_items() {
        let definition = CapabilityDefinition::new("tracker.create_task", "Create", RiskLevel::High)
            .with_parameter(CapabilityParameter::new("content", "Content", true))
            .with_parameter(
                CapabilityParameter::new("labels", "Labels", false).array_of(ParamType::String),
            );

        let good = ToolCallRequest::new("tracker.create_task")
            .with_arg("content", "Buy milk")
            .with_arg("labels", serde_json::json!(["home", "errand"]));
        assert!(DefaultCapabilityValidator.validate(&good, &definition).is_ok());

        let bad = ToolCallRequest::new("tracker.create_task")
            .with_arg("content", "Buy milk")
            .with_arg("labels", serde_json::json!(["home", 7]));
        let err = DefaultCapabilityValidator
            .validate(&bad, &definition)
            .unwrap_err();
        assert!(err.contains("Element 1 of 'labels'"));
    }
}
