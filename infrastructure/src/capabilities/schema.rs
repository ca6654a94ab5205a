//! Function-calling tool schema converter.
//!
//! Default implementation of [`ToolSchemaPort`] producing the
//! `{"type": "function", "function": {...}}` entries of the chat completions
//! API.

use dbrain_application::ports::tool_schema::ToolSchemaPort;
use dbrain_domain::{CapabilityDefinition, CapabilityParameter, ParamType};
use serde_json::{Map, Value, json};

/// Converts capabilities to chat-completions tool entries.
///
/// The advertised name is the capability name with `.` replaced by `_`,
/// and unknown arguments are rejected via `additionalProperties: false`.
pub struct OpenAiToolSchema;

fn parameter_schema(param: &CapabilityParameter) -> Value {
    let mut prop = Map::new();
    prop.insert("type".to_string(), json!(param.param_type.as_str()));
    prop.insert("description".to_string(), json!(param.description));
    if !param.enum_values.is_empty() {
        prop.insert("enum".to_string(), json!(param.enum_values));
    }
    if let (ParamType::Array, Some(items)) = (param.param_type, param.items) {
        prop.insert("items".to_string(), json!({ "type": items.as_str() }));
    }
    Value::Object(prop)
}

impl ToolSchemaPort for OpenAiToolSchema {
    fn capability_to_schema(&self, capability: &CapabilityDefinition) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &capability.parameters {
            properties.insert(param.name.clone(), parameter_schema(param));
            if param.required {
                required.push(json!(param.name));
            }
        }

        json!({
            "type": "function",
            "function": {
                "name": capability.function_name(),
                "description": capability.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::catalog::{create_task_definition, default_catalog};
    use dbrain_domain::RiskLevel;

    #[test]
    fn test_capability_to_schema() {
        let schema = OpenAiToolSchema.capability_to_schema(&create_task_definition());

        assert_eq!(schema["type"], "function");
        let function = &schema["function"];
        assert_eq!(function["name"], "tracker_create_task");
        assert_eq!(function["parameters"]["type"], "object");
        assert_eq!(function["parameters"]["additionalProperties"], false);

        let props = &function["parameters"]["properties"];
        assert_eq!(props["content"]["type"], "string");
        assert_eq!(props["priority"]["type"], "integer");
        assert_eq!(props["labels"]["type"], "array");
        assert_eq!(props["labels"]["items"]["type"], "string");

        let required = function["parameters"]["required"].as_array().unwrap();
        assert_eq!(required, &vec![json!("content")]);
    }

    #[test]
    fn test_enum_is_emitted() {
        let def = CapabilityDefinition::new("vault.write_file", "Write", RiskLevel::High)
            .with_parameter(
                CapabilityParameter::new("mode", "Mode", false).with_enum(["overwrite", "append"]),
            );
        let schema = OpenAiToolSchema.capability_to_schema(&def);
        assert_eq!(
            schema["function"]["parameters"]["properties"]["mode"]["enum"],
            json!(["overwrite", "append"])
        );
    }

    #[test]
    fn test_all_tools_keep_catalog_order() {
        let tools = OpenAiToolSchema.all_tools_schema(&default_catalog());
        assert_eq!(tools.len(), 11);
        assert_eq!(tools[0]["function"]["name"], "tracker_user_info");
        assert_eq!(tools[10]["function"]["name"], "vault_list_files");

        let empty = &tools[0]["function"]["parameters"];
        assert_eq!(empty["properties"], json!({}));
        assert_eq!(empty["required"], json!([]));
    }
}
