//! Sandbox-confined filesystem operations.
//!
//! Every operation in this crate works on paths relative to a single
//! sandbox directory and refuses anything that would reach outside it,
//! whether through `..`, absolute paths, or symlinks.
//!
//! # Components
//!
//! - [`PathResolver`]: validates a relative path and produces a [`ResolvedPath`]
//! - [`DirectoryWalker`]: flat listings and recursive trees
//! - [`FileOperations`]: read, atomic write, and delete
//! - [`PatchApplier`]: applies unified diffs via the external `patch` utility
//! - [`Dispatcher`]: decodes named requests and routes them to the above
//!
//! # Examples
//!
//! ```
//! use fsbox_core::SandboxConfig;
//! use fsbox_files::Dispatcher;
//! use serde_json::json;
//! # let temp = tempfile::TempDir::new().unwrap();
//!
//! let config = SandboxConfig::new(temp.path()).unwrap();
//! let dispatcher = Dispatcher::new(&config);
//!
//! dispatcher.handle("write", json!({"path": "notes/todo.txt", "content": "buy milk\n"})).unwrap();
//!
//! let listing = dispatcher.dispatch("list", json!({"path": "notes"}));
//! let value = serde_json::to_value(&listing).unwrap();
//! assert_eq!(value["result"]["entries"], json!(["todo.txt"]));
//!
//! let escape = dispatcher.dispatch("read", json!({"path": "../secret"}));
//! assert!(!escape.ok);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod dispatch;
mod ops;
mod patch;
mod resolver;
mod walker;

pub use dispatch::{Dispatcher, Failure, Operation, Outcome, Response};
pub use ops::FileOperations;
pub use patch::{PatchApplier, PatchReport};
pub use resolver::{PathResolver, ResolvedPath};
pub use walker::DirectoryWalker;
