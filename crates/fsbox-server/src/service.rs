//! MCP server implementation for the sandbox.
//!
//! The `FsboxService` exposes six tools, one per sandbox operation:
//! 1. `read_file` - Return a file's text content
//! 2. `list_directory` - List the immediate children of a directory
//! 3. `list_directory_tree` - Build the recursive tree under a directory
//! 4. `write_file` - Create or replace a file
//! 5. `delete_path` - Remove a file or directory
//! 6. `apply_patch` - Apply a unified diff to a file
//!
//! Sandbox failures (rejected paths, missing files, failed patches) are
//! returned as tool results with `is_error` set and the structured failure
//! as JSON text. Protocol errors are reserved for the server itself
//! failing.

use crate::types::{
    ApplyPatchParams, DeletePathParams, DirectoryParams, ReadFileParams, WriteFileParams,
};
use fsbox_core::{Result as SandboxResult, SandboxConfig};
use fsbox_files::{Dispatcher, Failure, Operation, Outcome};
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{ErrorData as McpError, tool, tool_handler, tool_router};
use std::sync::Arc;

/// MCP server for sandboxed filesystem access.
///
/// Every tool call is independent: the path is resolved against the
/// sandbox root, the operation runs on a blocking thread, and the result is
/// serialized as JSON text.
///
/// # Examples
///
/// ```no_run
/// use fsbox_core::SandboxConfig;
/// use fsbox_server::service::FsboxService;
/// use rmcp::ServiceExt;
/// use rmcp::transport::stdio;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = SandboxConfig::from_env()?;
/// let service = FsboxService::new(&config).serve(stdio()).await?;
/// service.waiting().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FsboxService {
    /// Shared operation router
    dispatcher: Arc<Dispatcher>,

    /// Tool router for MCP protocol
    tool_router: ToolRouter<Self>,
}

impl FsboxService {
    /// Creates a service rooted at the configured sandbox.
    #[must_use]
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(config)),
            tool_router: Self::tool_router(),
        }
    }

    /// Runs an operation off the async executor and renders the result.
    async fn run(&self, operation: Operation) -> Result<CallToolResult, McpError> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let result = tokio::task::spawn_blocking(move || dispatcher.execute(&operation))
            .await
            .map_err(|e| McpError::internal_error(format!("Task join error: {e}"), None))?;

        let (text, is_error) = render(result)?;
        if is_error {
            Ok(CallToolResult::error(vec![Content::text(text)]))
        } else {
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
    }
}

#[tool_router]
impl FsboxService {
    /// Read a file's text content.
    #[tool(
        description = "Read the content of a file in the sandbox. Returns {\"content\": ...}. Paths are relative to the sandbox root; '..' and absolute paths are rejected."
    )]
    async fn read_file(
        &self,
        Parameters(params): Parameters<ReadFileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::Read { path: params.path }).await
    }

    /// List the immediate children of a directory.
    #[tool(
        description = "List the entries of a directory in the sandbox. Returns {\"entries\": [names], \"types\": {name: \"file\" | \"directory\"}}."
    )]
    async fn list_directory(
        &self,
        Parameters(params): Parameters<DirectoryParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::List { path: params.path }).await
    }

    /// Build the recursive tree under a directory.
    #[tool(
        description = "Return the recursive tree of a directory in the sandbox. Returns {\"tree\": {name: {\"type\": \"file\"} | {\"type\": \"directory\", \"children\": {...}}}}."
    )]
    async fn list_directory_tree(
        &self,
        Parameters(params): Parameters<DirectoryParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::Tree { path: params.path }).await
    }

    /// Create or replace a file.
    #[tool(
        description = "Write content to a file in the sandbox, creating parent directories as needed and replacing any existing content."
    )]
    async fn write_file(
        &self,
        Parameters(params): Parameters<WriteFileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::Write {
            path: params.path,
            content: params.content,
        })
        .await
    }

    /// Remove a file or directory.
    #[tool(
        description = "Delete a file or directory in the sandbox. Non-empty directories require recursive: true. The sandbox root itself cannot be deleted."
    )]
    async fn delete_path(
        &self,
        Parameters(params): Parameters<DeletePathParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::Delete {
            path: params.path,
            recursive: params.recursive,
        })
        .await
    }

    /// Apply a unified diff to a file.
    #[tool(
        description = "Apply a unified diff to a file in the sandbox using the patch utility. The file is left unchanged if the patch does not apply cleanly."
    )]
    async fn apply_patch(
        &self,
        Parameters(params): Parameters<ApplyPatchParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::Patch {
            path: params.path,
            patch: params.patch,
        })
        .await
    }
}

#[tool_handler]
impl ServerHandler for FsboxService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Sandboxed filesystem access. All paths are relative to the sandbox root; \
                 use list_directory or list_directory_tree to explore, read_file to read, \
                 and write_file, delete_path, or apply_patch to make changes."
                    .to_string(),
            ),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Serializes an operation result, returning the text and whether it is an
/// error.
fn render(result: SandboxResult<Outcome>) -> Result<(String, bool), McpError> {
    let (text, is_error) = match result {
        Ok(outcome) => (serde_json::to_string_pretty(&outcome), false),
        Err(err) => (serde_json::to_string_pretty(&Failure::from(&err)), true),
    };
    let text = text.map_err(|e| {
        McpError::internal_error(format!("Failed to serialize result: {e}"), None)
    })?;
    Ok((text, is_error))
}
