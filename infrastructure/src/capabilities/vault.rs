//! Vault filesystem capabilities: read_file, write_file, append_file, list_files
//!
//! Every path argument is resolved against the vault root. Anything that
//! resolves outside the root (via `..`, an absolute path or a symlink) is
//! rejected with `PATH_OUTSIDE_VAULT`.

use super::catalog::DEFAULT_LIST_LIMIT;
use dbrain_domain::capability::codes;
use dbrain_domain::{ToolCallRequest, ToolFailure};
use serde_json::{Value, json};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// How `vault.write_file` treats an existing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Overwrite,
    Append,
}

impl WriteMode {
    fn parse(value: Option<&str>) -> Result<Self, ToolFailure> {
        match value {
            None | Some("overwrite") => Ok(WriteMode::Overwrite),
            Some("append") => Ok(WriteMode::Append),
            Some(other) => Err(ToolFailure::invalid_argument(format!(
                "mode must be overwrite or append, got '{}'",
                other
            ))),
        }
    }
}

/// Filesystem access confined to one vault directory
#[derive(Debug, Clone)]
pub struct VaultFs {
    root: PathBuf,
}

impl VaultFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = fs::canonicalize(&root).unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `relative` inside the vault.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, ToolFailure> {
        let joined = normalize(&self.root.join(relative));
        let resolved = canonicalize_existing_prefix(&joined);
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(ToolFailure::execution(
                codes::PATH_OUTSIDE_VAULT,
                format!("Path escapes vault: {}", relative),
            )
            .with_details(json!({ "path": relative })))
        }
    }

    pub fn read_file(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        let path = call.require_string("path").map_err(ToolFailure::invalid_argument)?;
        let resolved = self.resolve(path)?;

        if !resolved.exists() {
            return Ok(json!({ "path": path, "exists": false, "content": "" }));
        }
        if resolved.is_dir() {
            return Err(ToolFailure::invalid_argument(format!(
                "Cannot read directory as file: {}",
                path
            )));
        }

        let content = fs::read_to_string(&resolved)
            .map_err(|e| ToolFailure::io(format!("Failed to read {}: {}", path, e)))?;
        Ok(json!({ "path": path, "exists": true, "content": content }))
    }

    pub fn write_file(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        let mode = WriteMode::parse(call.get_string("mode"))?;
        self.write(call, mode)
    }

    pub fn append_file(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        self.write(call, WriteMode::Append)
    }

    fn write(&self, call: &ToolCallRequest, mode: WriteMode) -> Result<Value, ToolFailure> {
        let path = call.require_string("path").map_err(ToolFailure::invalid_argument)?;
        let content = call.get_string("content").ok_or_else(|| {
            ToolFailure::invalid_argument(format!("{} requires 'content'", call.capability))
        })?;
        let resolved = self.resolve(path)?;

        if resolved.is_dir() {
            return Err(ToolFailure::invalid_argument(format!(
                "Cannot write to a directory: {}",
                path
            )));
        }
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ToolFailure::io(format!("Failed to create directories for {}: {}", path, e))
            })?;
        }

        let result = match mode {
            WriteMode::Overwrite => fs::write(&resolved, content),
            WriteMode::Append => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&resolved)
                .and_then(|mut file| file.write_all(content.as_bytes())),
        };
        result.map_err(|e| ToolFailure::io(format!("Failed to write {}: {}", path, e)))?;

        debug!(path, bytes = content.len(), ?mode, "Wrote vault file");
        Ok(json!({ "path": path, "writtenBytes": content.len() }))
    }

    pub fn list_files(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        let dir = call.get_string("dir").unwrap_or(".");
        let pattern = call.get_string("pattern").unwrap_or("*");
        let limit = match call.get_i64("limit") {
            None => DEFAULT_LIST_LIMIT,
            Some(n) if n >= 1 => n as usize,
            Some(n) => {
                return Err(ToolFailure::invalid_argument(format!(
                    "limit must be positive, got {}",
                    n
                )));
            }
        };

        if pattern.starts_with('/')
            || Path::new(pattern)
                .components()
                .any(|c| c == Component::ParentDir)
        {
            return Err(ToolFailure::invalid_argument(format!(
                "pattern must stay inside dir: {}",
                pattern
            )));
        }

        let resolved = self.resolve(dir)?;
        if !resolved.exists() {
            return Ok(json!({ "files": [] }));
        }
        if !resolved.is_dir() {
            return Err(ToolFailure::invalid_argument(format!(
                "dir must point to a directory: {}",
                dir
            )));
        }

        let full_pattern = format!(
            "{}/**/{}",
            glob::Pattern::escape(&resolved.to_string_lossy()),
            pattern
        );
        let entries = glob::glob(&full_pattern)
            .map_err(|e| ToolFailure::invalid_argument(format!("Invalid glob pattern: {}", e)))?;

        let mut files: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .filter_map(|p| {
                p.strip_prefix(&self.root)
                    .ok()
                    .map(|rel| rel.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        files.sort();
        files.truncate(limit);

        Ok(json!({ "files": files }))
    }
}

/// Remove `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize the deepest existing ancestor and re-append the rest, so
/// symlinks are followed even for paths that do not exist yet.
fn canonicalize_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return rest
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}
