//! Operation routing.
//!
//! Requests arrive as an operation name plus a JSON argument object. The
//! [`Dispatcher`] decodes them into a typed [`Operation`], resolves the
//! path, runs the matching component, and wraps the outcome (or error) in a
//! [`Response`] envelope:
//!
//! ```json
//! {"ok": true,  "result": {"content": "buy milk\n"}}
//! {"ok": false, "error":  {"kind": "not_found", "message": "Path not found: todo.txt"}}
//! ```
//!
//! Each request is independent. Nothing is cached between calls.

use crate::{DirectoryWalker, FileOperations, PatchApplier, PathResolver, ResolvedPath};
use fsbox_core::{DirectoryEntry, EntryKind, Error, ErrorKind, Result, SandboxConfig, TreeNode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io;

/// A decoded, typed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Return a file's text content
    Read {
        /// File path relative to the sandbox root
        path: String,
    },
    /// List the immediate children of a directory
    List {
        /// Directory path relative to the sandbox root
        path: String,
    },
    /// Build the recursive tree under a directory
    Tree {
        /// Directory path relative to the sandbox root
        path: String,
    },
    /// Create or replace a file
    Write {
        /// File path relative to the sandbox root
        path: String,
        /// New file content
        content: String,
    },
    /// Remove a file or directory
    Delete {
        /// Target path relative to the sandbox root
        path: String,
        /// Remove non-empty directories
        recursive: bool,
    },
    /// Apply a unified diff to a file
    Patch {
        /// File path relative to the sandbox root
        path: String,
        /// Unified diff text
        patch: String,
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PathArgs {
    path: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WriteArgs {
    path: String,
    content: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteArgs {
    path: String,
    #[serde(default)]
    recursive: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PatchArgs {
    path: String,
    #[serde(alias = "patch_text")]
    patch: String,
}

impl Operation {
    /// Names accepted by [`Operation::parse`].
    pub const NAMES: [&'static str; 6] = ["read", "list", "tree", "write", "delete", "patch"];

    /// Decodes an operation from its name and JSON arguments.
    ///
    /// `null` arguments are treated as an empty object, so operations with
    /// required fields report the missing field by name.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownOperation`] if `name` is not one of [`Operation::NAMES`]
    /// - [`Error::InvalidArguments`] if a required argument is missing, has
    ///   the wrong type, or an unexpected argument is present
    ///
    /// # Examples
    ///
    /// ```
    /// use fsbox_files::Operation;
    /// use serde_json::json;
    ///
    /// let op = Operation::parse("delete", json!({"path": "notes"})).unwrap();
    /// assert_eq!(op, Operation::Delete { path: "notes".into(), recursive: false });
    ///
    /// assert!(Operation::parse("chmod", json!({})).is_err());
    /// ```
    pub fn parse(name: &str, args: Value) -> Result<Self> {
        let operation = match name {
            "read" => Self::Read {
                path: decode::<PathArgs>(name, args)?.path,
            },
            "list" => Self::List {
                path: decode::<PathArgs>(name, args)?.path,
            },
            "tree" => Self::Tree {
                path: decode::<PathArgs>(name, args)?.path,
            },
            "write" => {
                let args: WriteArgs = decode(name, args)?;
                Self::Write {
                    path: args.path,
                    content: args.content,
                }
            }
            "delete" => {
                let args: DeleteArgs = decode(name, args)?;
                Self::Delete {
                    path: args.path,
                    recursive: args.recursive,
                }
            }
            "patch" => {
                let args: PatchArgs = decode(name, args)?;
                Self::Patch {
                    path: args.path,
                    patch: args.patch,
                }
            }
            _ => {
                return Err(Error::UnknownOperation {
                    name: name.to_string(),
                });
            }
        };
        Ok(operation)
    }

    /// Operation name as accepted by [`Operation::parse`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::List { .. } => "list",
            Self::Tree { .. } => "tree",
            Self::Write { .. } => "write",
            Self::Delete { .. } => "delete",
            Self::Patch { .. } => "patch",
        }
    }

    /// Target path as supplied by the caller.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Read { path }
            | Self::List { path }
            | Self::Tree { path }
            | Self::Write { path, .. }
            | Self::Delete { path, .. }
            | Self::Patch { path, .. } => path,
        }
    }
}

fn decode<T: DeserializeOwned>(operation: &str, args: Value) -> Result<T> {
    let args = if args.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| Error::InvalidArguments {
        operation: operation.to_string(),
        reason: e.to_string(),
    })
}

/// Successful result of an operation.
///
/// Serializes without a tag; each variant has a distinct field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// `read`: `{"content": ...}`
    Content {
        /// File text
        content: String,
    },
    /// `list`: `{"entries": [...], "types": {name: kind}}`
    Listing {
        /// Entry names sorted ascending
        entries: Vec<String>,
        /// Kind of each entry
        types: BTreeMap<String, EntryKind>,
    },
    /// `tree`: `{"tree": {name: node}}`
    Tree {
        /// Children of the requested directory
        tree: BTreeMap<String, TreeNode>,
    },
    /// `write` and `delete`: `{"message": ...}`
    Done {
        /// Human-readable confirmation
        message: String,
    },
    /// `patch`: `{"message": ..., "output": ...}`
    Patched {
        /// Human-readable confirmation
        message: String,
        /// Output of the patch utility
        output: String,
    },
}

impl Outcome {
    /// Builds a listing outcome from sorted directory entries.
    #[must_use]
    pub fn listing(entries: Vec<DirectoryEntry>) -> Self {
        let types = entries.iter().map(|e| (e.name.clone(), e.kind)).collect();
        let entries = entries.into_iter().map(|e| e.name).collect();
        Self::Listing { entries, types }
    }

    /// Human-readable message, if this outcome carries one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Done { message } | Self::Patched { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Structured failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Error kind tag
    pub kind: ErrorKind,
    /// Human-readable description
    pub message: String,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Envelope returned for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    /// `true` when `result` is present, `false` when `error` is present
    pub ok: bool,
    /// Outcome of a successful request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Outcome>,
    /// Failure of an unsuccessful request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl Response {
    /// Wraps a successful outcome.
    #[must_use]
    pub const fn success(outcome: Outcome) -> Self {
        Self {
            ok: true,
            result: Some(outcome),
            error: None,
        }
    }

    /// Wraps an error.
    #[must_use]
    pub fn failure(err: &Error) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(Failure::from(err)),
        }
    }

    /// Converts a result into an envelope.
    #[must_use]
    pub fn from_result(result: Result<Outcome>) -> Self {
        match result {
            Ok(outcome) => Self::success(outcome),
            Err(err) => Self::failure(&err),
        }
    }
}

/// Routes operations to the sandbox components.
///
/// # Examples
///
/// ```
/// use fsbox_core::SandboxConfig;
/// use fsbox_files::Dispatcher;
/// use serde_json::json;
/// # let temp = tempfile::TempDir::new().unwrap();
///
/// let dispatcher = Dispatcher::new(&SandboxConfig::new(temp.path()).unwrap());
///
/// let response = dispatcher.dispatch("write", json!({"path": "a.txt", "content": "hi"}));
/// assert!(response.ok);
///
/// let response = dispatcher.dispatch("read", json!({"path": "a.txt"}));
/// assert_eq!(serde_json::to_value(&response).unwrap()["result"]["content"], "hi");
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    resolver: PathResolver,
    walker: DirectoryWalker,
    files: FileOperations,
    patcher: PatchApplier,
}

impl Dispatcher {
    /// Creates a dispatcher for the configured sandbox.
    #[must_use]
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            resolver: PathResolver::new(config),
            walker: DirectoryWalker::new(config),
            files: FileOperations::new(),
            patcher: PatchApplier::new(config),
        }
    }

    /// Path resolver used for every request.
    #[must_use]
    pub const fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Decodes and runs a request, returning the envelope.
    ///
    /// Never fails: every error becomes a failure envelope.
    #[must_use]
    pub fn dispatch(&self, name: &str, args: Value) -> Response {
        Response::from_result(self.handle(name, args))
    }

    /// Decodes and runs a request.
    ///
    /// # Errors
    ///
    /// See [`Operation::parse`] and [`Dispatcher::execute`].
    pub fn handle(&self, name: &str, args: Value) -> Result<Outcome> {
        let operation = Operation::parse(name, args).inspect_err(|e| {
            tracing::warn!(operation = name, error = %e, "rejected request");
        })?;
        self.execute(&operation)
    }

    /// Runs a decoded operation.
    ///
    /// The path is resolved first; no filesystem change happens unless
    /// resolution succeeds. `delete` resolves only the parent, so it acts
    /// on a symlink rather than its target.
    ///
    /// # Errors
    ///
    /// Any error from path resolution or the underlying component. A `read`
    /// of content that is not valid UTF-8 fails with [`Error::IoFailure`].
    pub fn execute(&self, operation: &Operation) -> Result<Outcome> {
        tracing::debug!(operation = operation.name(), path = operation.path(), "dispatching");

        let resolved = match operation {
            Operation::Delete { path, .. } => self.resolver.resolve_entry(path),
            _ => self.resolver.resolve(operation.path()),
        };
        let result = resolved.and_then(|target| self.run(operation, &target));

        match &result {
            Ok(_) => tracing::debug!(operation = operation.name(), "completed"),
            Err(e) => tracing::info!(
                operation = operation.name(),
                kind = %e.kind(),
                error = %e,
                "operation failed"
            ),
        }
        result
    }

    fn run(&self, operation: &Operation, target: &ResolvedPath) -> Result<Outcome> {
        match operation {
            Operation::Read { .. } => {
                let bytes = self.files.read(target)?;
                let content = String::from_utf8(bytes).map_err(|e| Error::IoFailure {
                    path: target.relative().to_string(),
                    source: io::Error::new(io::ErrorKind::InvalidData, e),
                })?;
                Ok(Outcome::Content { content })
            }
            Operation::List { .. } => Ok(Outcome::listing(self.walker.list(target)?)),
            Operation::Tree { .. } => Ok(Outcome::Tree {
                tree: self.walker.tree(target)?.into_children(),
            }),
            Operation::Write { content, .. } => {
                self.files.write(target, content.as_bytes())?;
                Ok(Outcome::Done {
                    message: format!("File written successfully to {target}"),
                })
            }
            Operation::Delete { recursive, .. } => {
                self.files.delete(target, *recursive)?;
                Ok(Outcome::Done {
                    message: format!("Successfully deleted {target}"),
                })
            }
            Operation::Patch { patch, .. } => {
                let report = self.patcher.apply(target, patch)?;
                Ok(Outcome::Patched {
                    message: format!("Patch applied successfully to {target}"),
                    output: report.output,
                })
            }
        }
    }
}
