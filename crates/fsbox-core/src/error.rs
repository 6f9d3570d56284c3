//! Error types for the fsbox sandbox.
//!
//! Every failure a sandboxed operation can produce is one variant of
//! [`Error`]. The dispatcher converts errors into structured failures using
//! [`Error::kind`], so callers can branch on the kind without parsing
//! messages.
//!
//! # Examples
//!
//! ```
//! use fsbox_core::{Error, ErrorKind, Result};
//!
//! fn check(path: &str) -> Result<()> {
//!     if path.contains("..") {
//!         return Err(Error::PathViolation {
//!             path: path.to_string(),
//!             reason: "parent directory traversal".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = check("../etc/passwd").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::PathViolation);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Main error type for sandboxed filesystem operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The path would escape the sandbox, or could not be verified to stay
    /// inside it.
    ///
    /// Always fatal to the request. The path is never clamped or rewritten.
    #[error("Path rejected, outside sandbox: '{path}' ({reason})")]
    PathViolation {
        /// Path as supplied by the caller
        path: String,
        /// Why the path was rejected
        reason: String,
    },

    /// The target does not exist.
    #[error("Path not found: {path}")]
    NotFound {
        /// Path relative to the sandbox root
        path: String,
    },

    /// A file was expected but the target is a directory.
    #[error("Not a file: {path}")]
    NotAFile {
        /// Path relative to the sandbox root
        path: String,
    },

    /// A directory was expected but the target is something else.
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// Path relative to the sandbox root
        path: String,
    },

    /// Non-recursive delete of a directory that still has entries.
    #[error("Directory not empty: {path}. Use recursive: true to delete recursively")]
    DirectoryNotEmpty {
        /// Path relative to the sandbox root
        path: String,
    },

    /// A symlink loop was found while building a directory tree.
    #[error("Symlink cycle detected at {path}")]
    CycleDetected {
        /// Directory at which the walk re-entered one of its ancestors
        path: String,
    },

    /// The external patch utility rejected the patch.
    ///
    /// `diagnostic` is the utility's own output, unmodified.
    #[error("Patch application failed for {path}: {diagnostic}")]
    PatchFailure {
        /// Path relative to the sandbox root
        path: String,
        /// Exit status of the patch utility (`None` if killed by a signal)
        exit_code: Option<i32>,
        /// Combined stdout/stderr of the patch utility
        diagnostic: String,
    },

    /// The requested operation name is not one of the supported operations.
    #[error("Unknown operation: '{name}'")]
    UnknownOperation {
        /// Name that was requested
        name: String,
    },

    /// Operation arguments were missing or malformed.
    #[error("Invalid arguments for '{operation}': {reason}")]
    InvalidArguments {
        /// Operation whose arguments failed to decode
        operation: String,
        /// Decoder message
        reason: String,
    },

    /// Any other filesystem or process error.
    #[error("I/O failure on {path}: {source}")]
    IoFailure {
        /// Path relative to the sandbox root (or the program name for spawn errors)
        path: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Sandbox configuration is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },
}

impl Error {
    /// Classifies an I/O error that happened while operating on `path`.
    ///
    /// `io::ErrorKind::NotFound` becomes [`Error::NotFound`] so that a file
    /// deleted between validation and use reports the same kind as one that
    /// never existed. Everything else becomes [`Error::IoFailure`].
    ///
    /// # Examples
    ///
    /// ```
    /// use fsbox_core::{Error, ErrorKind};
    /// use std::io;
    ///
    /// let err = Error::from_io("notes/todo.txt", io::Error::from(io::ErrorKind::NotFound));
    /// assert_eq!(err.kind(), ErrorKind::NotFound);
    ///
    /// let err = Error::from_io("notes", io::Error::from(io::ErrorKind::PermissionDenied));
    /// assert_eq!(err.kind(), ErrorKind::IoFailure);
    /// ```
    #[must_use]
    pub fn from_io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::IoFailure { path, source }
        }
    }

    /// Returns the kind tag for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PathViolation { .. } => ErrorKind::PathViolation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotAFile { .. } => ErrorKind::NotAFile,
            Self::NotADirectory { .. } => ErrorKind::NotADirectory,
            Self::DirectoryNotEmpty { .. } => ErrorKind::DirectoryNotEmpty,
            Self::CycleDetected { .. } => ErrorKind::CycleDetected,
            Self::PatchFailure { .. } => ErrorKind::PatchFailure,
            Self::UnknownOperation { .. } => ErrorKind::UnknownOperation,
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            Self::IoFailure { .. } => ErrorKind::IoFailure,
            Self::ConfigError { .. } => ErrorKind::ConfigError,
        }
    }

    /// Returns `true` if this is a sandbox escape attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// use fsbox_core::Error;
    ///
    /// let err = Error::PathViolation {
    ///     path: "/etc/passwd".to_string(),
    ///     reason: "absolute path".to_string(),
    /// };
    /// assert!(err.is_path_violation());
    /// ```
    #[must_use]
    pub const fn is_path_violation(&self) -> bool {
        matches!(self, Self::PathViolation { .. })
    }

    /// Returns `true` if the target did not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the request failed validation before any operation
    /// was attempted (bad operation name, bad arguments, rejected path).
    ///
    /// # Examples
    ///
    /// ```
    /// use fsbox_core::Error;
    ///
    /// let err = Error::UnknownOperation { name: "chmod".to_string() };
    /// assert!(err.is_rejection());
    ///
    /// let err = Error::NotFound { path: "missing.txt".to_string() };
    /// assert!(!err.is_rejection());
    /// ```
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::PathViolation { .. }
                | Self::UnknownOperation { .. }
                | Self::InvalidArguments { .. }
        )
    }
}

/// Serializable tag for each [`Error`] variant.
///
/// Serializes in `snake_case`, e.g. `"path_violation"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`Error::PathViolation`]
    PathViolation,
    /// See [`Error::NotFound`]
    NotFound,
    /// See [`Error::NotAFile`]
    NotAFile,
    /// See [`Error::NotADirectory`]
    NotADirectory,
    /// See [`Error::DirectoryNotEmpty`]
    DirectoryNotEmpty,
    /// See [`Error::CycleDetected`]
    CycleDetected,
    /// See [`Error::PatchFailure`]
    PatchFailure,
    /// See [`Error::UnknownOperation`]
    UnknownOperation,
    /// See [`Error::InvalidArguments`]
    InvalidArguments,
    /// See [`Error::IoFailure`]
    IoFailure,
    /// See [`Error::ConfigError`]
    ConfigError,
}

impl ErrorKind {
    /// Returns the `snake_case` name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PathViolation => "path_violation",
            Self::NotFound => "not_found",
            Self::NotAFile => "not_a_file",
            Self::NotADirectory => "not_a_directory",
            Self::DirectoryNotEmpty => "directory_not_empty",
            Self::CycleDetected => "cycle_detected",
            Self::PatchFailure => "patch_failure",
            Self::UnknownOperation => "unknown_operation",
            Self::InvalidArguments => "invalid_arguments",
            Self::IoFailure => "io_failure",
            Self::ConfigError => "config_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for sandbox operations.
pub type Result<T> = std::result::Result<T, Error>;
