//! MCP server library for sandboxed filesystem access.
//!
//! This crate exposes the operations of `fsbox-files` as MCP tools over
//! stdio, so an MCP client can read and modify files inside one directory
//! and nowhere else.
//!
//! # Architecture
//!
//! The server implements six tools, each a thin wrapper over one sandbox
//! operation:
//!
//! 1. **`read_file`** - Return a file's text content
//! 2. **`list_directory`** - List a directory's immediate entries with their kinds
//! 3. **`list_directory_tree`** - Return the recursive tree under a directory
//! 4. **`write_file`** - Create or replace a file
//! 5. **`delete_path`** - Remove a file or directory
//! 6. **`apply_patch`** - Apply a unified diff to a file
//!
//! # Examples
//!
//! ```no_run
//! use fsbox_core::SandboxConfig;
//! use fsbox_server::service::FsboxService;
//! use rmcp::transport::stdio;
//! use rmcp::ServiceExt;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SandboxConfig::new("./filesystem_workspace")?;
//! let service = FsboxService::new(&config).serve(stdio()).await?;
//! service.waiting().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # State Management
//!
//! The server keeps no state between calls beyond the sandbox root.

pub mod service;
pub mod types;

pub use service::FsboxService;
pub use types::{
    ApplyPatchParams, DeletePathParams, DirectoryParams, ReadFileParams, WriteFileParams,
};
