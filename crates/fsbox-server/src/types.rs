//! Parameter types for the MCP tools.
//!
//! One struct per tool. Field docs become the JSON schema descriptions that
//! clients see when they list tools. Unknown fields are rejected, matching
//! the argument decoding of `fsbox_files::Operation::parse`.

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for `read_file`.
///
/// # Examples
///
/// ```
/// use fsbox_server::types::ReadFileParams;
///
/// let params: ReadFileParams = serde_json::from_str(r#"{"path": "notes/todo.txt"}"#).unwrap();
/// assert_eq!(params.path, "notes/todo.txt");
/// ```
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReadFileParams {
    /// File path relative to the sandbox root (e.g., "notes/todo.txt")
    pub path: String,
}

/// Parameters for `list_directory` and `list_directory_tree`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DirectoryParams {
    /// Directory path relative to the sandbox root; empty or "." for the root
    #[serde(default)]
    pub path: String,
}

/// Parameters for `write_file`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct WriteFileParams {
    /// File path relative to the sandbox root; parent directories are created
    pub path: String,

    /// Full new content of the file
    pub content: String,
}

/// Parameters for `delete_path`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeletePathParams {
    /// File or directory path relative to the sandbox root
    pub path: String,

    /// Delete non-empty directories and everything in them (default: false)
    #[serde(default)]
    pub recursive: bool,
}

/// Parameters for `apply_patch`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ApplyPatchParams {
    /// File path relative to the sandbox root
    pub path: String,

    /// Unified diff to apply to the file
    #[serde(alias = "patch_text")]
    pub patch: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_params_default_to_root() {
        let params: DirectoryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.path, "");
    }

    #[test]
    fn test_delete_params_default_not_recursive() {
        let params: DeletePathParams = serde_json::from_str(r#"{"path": "notes"}"#).unwrap();
        assert!(!params.recursive);

        let params: DeletePathParams =
            serde_json::from_str(r#"{"path": "notes", "recursive": true}"#).unwrap();
        assert!(params.recursive);
    }

    #[test]
    fn test_patch_params_accept_alias() {
        let params: ApplyPatchParams =
            serde_json::from_str(r#"{"path": "a.txt", "patch_text": "--- a"}"#).unwrap();
        assert_eq!(params.patch, "--- a");
    }

    #[test]
    fn test_write_params_require_content() {
        let result: Result<WriteFileParams, _> = serde_json::from_str(r#"{"path": "a.txt"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<DeletePathParams, _> =
            serde_json::from_str(r#"{"path": "notes", "recursve": true}"#);
        assert!(result.is_err());

        let result: Result<DirectoryParams, _> = serde_json::from_str(r#"{"dir": "notes"}"#);
        assert!(result.is_err());

        let result: Result<ApplyPatchParams, _> =
            serde_json::from_str(r#"{"path": "a.txt", "patch": "x", "strip": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_forbids_additional_properties() {
        let schema = schemars::schema_for!(DeletePathParams);
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["additionalProperties"], false);
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = schemars::schema_for!(WriteFileParams);
        let value = serde_json::to_value(&schema).unwrap();
        assert!(value["properties"]["path"].is_object());
        assert!(value["properties"]["content"].is_object());
    }
}
