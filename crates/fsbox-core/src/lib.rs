//! Core types, configuration, and errors for the fsbox sandbox.
//!
//! This crate provides the foundational types shared by every other crate
//! in the workspace. It performs no filesystem operations of its own beyond
//! preparing the sandbox directory when a [`SandboxConfig`] is built.
//!
//! # Architecture
//!
//! The core consists of:
//! - Error taxonomy ([`Error`], [`ErrorKind`]) used across all operations
//! - Sandbox configuration ([`SandboxConfig`])
//! - Result shapes for directory listings and trees ([`DirectoryEntry`], [`TreeNode`])
//! - CLI helper types ([`cli::OutputFormat`], [`cli::ExitCode`])

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod types;

pub mod cli;

pub use config::{
    BASE_DIR_ENV, DEFAULT_BASE_DIR, DEFAULT_PATCH_PROGRAM, PATCH_PROGRAM_ENV, SandboxConfig,
};
pub use error::{Error, ErrorKind, Result};
pub use types::{DirectoryEntry, EntryKind, TreeNode};
