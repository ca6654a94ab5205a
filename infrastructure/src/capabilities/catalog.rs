//! Canonical capability catalogue
//!
//! One `*_definition()` per capability; [`default_catalog`] registers them in
//! the order they are advertised to function-calling providers.

use dbrain_domain::capability::codes;
use dbrain_domain::{
    CapabilityCatalog, CapabilityDefinition, CapabilityParameter, ParamType, RiskLevel,
};
use serde_json::json;

pub const TRACKER_USER_INFO: &str = "tracker.user_info";
pub const TRACKER_CREATE_TASK: &str = "tracker.create_task";
pub const TRACKER_LIST_TASKS: &str = "tracker.list_tasks";
pub const TRACKER_UPDATE_TASK: &str = "tracker.update_task";
pub const TRACKER_COMPLETE_TASK: &str = "tracker.complete_task";
pub const TRACKER_DELETE_TASK: &str = "tracker.delete_task";
pub const TRACKER_FIND_COMPLETED_TASKS: &str = "tracker.find_completed_tasks";
pub const VAULT_READ_FILE: &str = "vault.read_file";
pub const VAULT_WRITE_FILE: &str = "vault.write_file";
pub const VAULT_APPEND_FILE: &str = "vault.append_file";
pub const VAULT_LIST_FILES: &str = "vault.list_files";

/// Default `limit` for `vault.list_files`
pub const DEFAULT_LIST_LIMIT: usize = 200;

const TRACKER_ERRORS: &[&str] = &[
    codes::INVALID_ARGUMENT,
    codes::MISSING_CREDENTIALS,
    codes::AUTH_FAILED,
    codes::HTTP_ERROR,
    codes::TIMEOUT,
    codes::TRANSPORT_ERROR,
    codes::INVALID_RESPONSE,
];

const VAULT_ERRORS: &[&str] = &[
    codes::INVALID_ARGUMENT,
    codes::PATH_OUTSIDE_VAULT,
    codes::IO_ERROR,
];

fn priority_param() -> CapabilityParameter {
    CapabilityParameter::new("priority", "Priority from 1 (normal) to 4 (urgent)", false)
        .with_type(ParamType::Integer)
}

fn task_id_param() -> CapabilityParameter {
    CapabilityParameter::new("task_id", "Identifier of the task", true)
}

pub fn user_info_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(
        TRACKER_USER_INFO,
        "Get the current task tracker user profile. Use it to confirm tool access.",
        RiskLevel::Low,
    )
    .with_result_schema(json!({
        "type": "object",
        "properties": {
            "userId": {"type": "string"},
            "email": {"type": "string"},
            "name": {"type": "string"}
        },
        "required": ["userId", "name"]
    }))
    .with_error_codes(TRACKER_ERRORS.iter().copied())
}

pub fn create_task_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(
        TRACKER_CREATE_TASK,
        "Create a task in the task tracker",
        RiskLevel::High,
    )
    .with_parameter(CapabilityParameter::new("content", "Task title", true))
    .with_parameter(CapabilityParameter::new(
        "description",
        "Longer task description",
        false,
    ))
    .with_parameter(CapabilityParameter::new(
        "due_string",
        "Natural language due date, e.g. \"tomorrow 10am\"",
        false,
    ))
    .with_parameter(priority_param())
    .with_parameter(CapabilityParameter::new(
        "project_id",
        "Project to create the task in",
        false,
    ))
    .with_parameter(
        CapabilityParameter::new("labels", "Label names to attach", false)
            .array_of(ParamType::String),
    )
    .with_result_schema(json!({
        "type": "object",
        "properties": {
            "id": {"type": "string"},
            "content": {"type": "string"},
            "url": {"type": "string"}
        },
        "required": ["id", "content"]
    }))
    .with_error_codes(TRACKER_ERRORS.iter().copied())
}

pub fn list_tasks_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(
        TRACKER_LIST_TASKS,
        "List open tasks, optionally by project or tracker filter query",
        RiskLevel::Low,
    )
    .with_parameter(CapabilityParameter::new(
        "project_id",
        "Only tasks of this project",
        false,
    ))
    .with_parameter(CapabilityParameter::new(
        "filter",
        "Tracker filter query, e.g. \"today | overdue\"",
        false,
    ))
    .with_parameter(
        CapabilityParameter::new("limit", "Maximum number of tasks to return", false)
            .with_type(ParamType::Integer),
    )
    .with_result_schema(json!({
        "type": "object",
        "properties": {
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "string"},
                        "content": {"type": "string"},
                        "due": {"type": ["string", "null"]},
                        "priority": {"type": "integer"}
                    }
                }
            }
        },
        "required": ["tasks"]
    }))
    .with_error_codes(TRACKER_ERRORS.iter().copied())
}

pub fn update_task_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(
        TRACKER_UPDATE_TASK,
        "Update fields of an existing task",
        RiskLevel::High,
    )
    .with_parameter(task_id_param())
    .with_parameter(CapabilityParameter::new("content", "New task title", false))
    .with_parameter(CapabilityParameter::new(
        "description",
        "New task description",
        false,
    ))
    .with_parameter(CapabilityParameter::new(
        "due_string",
        "New natural language due date",
        false,
    ))
    .with_parameter(priority_param())
    .with_result_schema(json!({
        "type": "object",
        "properties": {
            "id": {"type": "string"},
            "content": {"type": "string"}
        },
        "required": ["id"]
    }))
    .with_error_codes(TRACKER_ERRORS.iter().copied())
}

pub fn complete_task_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(TRACKER_COMPLETE_TASK, "Mark a task as done", RiskLevel::High)
        .with_parameter(task_id_param())
        .with_result_schema(json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "completed": {"type": "boolean"}
            },
            "required": ["id", "completed"]
        }))
        .with_error_codes(TRACKER_ERRORS.iter().copied())
}

pub fn delete_task_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(TRACKER_DELETE_TASK, "Delete a task", RiskLevel::High)
        .with_parameter(task_id_param())
        .with_result_schema(json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "deleted": {"type": "boolean"}
            },
            "required": ["id", "deleted"]
        }))
        .with_error_codes(TRACKER_ERRORS.iter().copied())
}

pub fn find_completed_tasks_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(
        TRACKER_FIND_COMPLETED_TASKS,
        "Find tasks completed in a time range",
        RiskLevel::Low,
    )
    .with_parameter(CapabilityParameter::new(
        "since",
        "Start of the range (ISO 8601)",
        false,
    ))
    .with_parameter(CapabilityParameter::new(
        "until",
        "End of the range (ISO 8601)",
        false,
    ))
    .with_parameter(
        CapabilityParameter::new("limit", "Maximum number of tasks to return", false)
            .with_type(ParamType::Integer),
    )
    .with_result_schema(json!({
        "type": "object",
        "properties": {
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "string"},
                        "content": {"type": "string"},
                        "completedAt": {"type": "string"}
                    }
                }
            }
        },
        "required": ["tasks"]
    }))
    .with_error_codes(TRACKER_ERRORS.iter().copied())
}

pub fn read_file_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(
        VAULT_READ_FILE,
        "Read a file from the vault. Returns exists=false for missing files.",
        RiskLevel::Low,
    )
    .with_parameter(CapabilityParameter::new(
        "path",
        "Path relative to the vault root",
        true,
    ))
    .with_result_schema(json!({
        "type": "object",
        "properties": {
            "path": {"type": "string"},
            "exists": {"type": "boolean"},
            "content": {"type": "string"}
        },
        "required": ["path", "exists", "content"]
    }))
    .with_error_codes(VAULT_ERRORS.iter().copied())
}

fn written_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "path": {"type": "string"},
            "writtenBytes": {"type": "integer"}
        },
        "required": ["path", "writtenBytes"]
    })
}

pub fn write_file_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(
        VAULT_WRITE_FILE,
        "Write a file in the vault, creating parent directories",
        RiskLevel::High,
    )
    .with_parameter(CapabilityParameter::new(
        "path",
        "Path relative to the vault root",
        true,
    ))
    .with_parameter(CapabilityParameter::new("content", "Text to write", true))
    .with_parameter(
        CapabilityParameter::new("mode", "Replace the file or append to it", false)
            .with_enum(["overwrite", "append"]),
    )
    .with_result_schema(written_schema())
    .with_error_codes(VAULT_ERRORS.iter().copied())
}

pub fn append_file_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(
        VAULT_APPEND_FILE,
        "Append text to a file in the vault, creating it if needed",
        RiskLevel::High,
    )
    .with_parameter(CapabilityParameter::new(
        "path",
        "Path relative to the vault root",
        true,
    ))
    .with_parameter(CapabilityParameter::new("content", "Text to append", true))
    .with_result_schema(written_schema())
    .with_error_codes(VAULT_ERRORS.iter().copied())
}

pub fn list_files_definition() -> CapabilityDefinition {
    CapabilityDefinition::new(
        VAULT_LIST_FILES,
        "List vault files under a directory matching a glob pattern",
        RiskLevel::Low,
    )
    .with_parameter(CapabilityParameter::new(
        "dir",
        "Directory relative to the vault root (default: vault root)",
        false,
    ))
    .with_parameter(CapabilityParameter::new(
        "pattern",
        "Glob pattern matched recursively, e.g. \"*.md\" (default: *)",
        false,
    ))
    .with_parameter(
        CapabilityParameter::new("limit", "Maximum number of paths (default: 200)", false)
            .with_type(ParamType::Integer),
    )
    .with_result_schema(json!({
        "type": "object",
        "properties": {
            "files": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["files"]
    }))
    .with_error_codes(VAULT_ERRORS.iter().copied())
}

/// The full catalogue: tracker capabilities first, then vault.
pub fn default_catalog() -> CapabilityCatalog {
    CapabilityCatalog::new()
        .register(user_info_definition())
        .register(create_task_definition())
        .register(list_tasks_definition())
        .register(update_task_definition())
        .register(complete_task_definition())
        .register(delete_task_definition())
        .register(find_completed_tasks_definition())
        .register(read_file_definition())
        .register(write_file_definition())
        .register(append_file_definition())
        .register(list_files_definition())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order() {
        let catalog = default_catalog();
        let names: Vec<&str> = catalog.list().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 11);
        assert_eq!(names[0], TRACKER_USER_INFO);
        assert_eq!(names[7], VAULT_READ_FILE);
        assert_eq!(names[10], VAULT_LIST_FILES);
    }

    #[test]
    fn test_risk_levels() {
        let catalog = default_catalog();
        for name in [TRACKER_USER_INFO, TRACKER_LIST_TASKS, VAULT_READ_FILE, VAULT_LIST_FILES] {
            assert!(!catalog.get(name).unwrap().is_mutating(), "{name}");
        }
        for name in [TRACKER_CREATE_TASK, TRACKER_DELETE_TASK, VAULT_WRITE_FILE, VAULT_APPEND_FILE] {
            assert!(catalog.get(name).unwrap().is_mutating(), "{name}");
        }
    }

    #[test]
    fn test_required_parameters() {
        let create = create_task_definition();
        assert!(create.parameter("content").unwrap().required);
        assert!(!create.parameter("labels").unwrap().required);
        assert_eq!(create.parameter("labels").unwrap().items, Some(ParamType::String));

        let write = write_file_definition();
        assert_eq!(write.parameter("mode").unwrap().enum_values, vec!["overwrite", "append"]);
    }
}
