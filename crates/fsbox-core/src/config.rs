//! Sandbox configuration.
//!
//! A [`SandboxConfig`] is built once at startup and passed by reference to
//! everything that needs the base directory. There is no global instance;
//! tests create one per temporary directory.
//!
//! # Examples
//!
//! ```
//! use fsbox_core::SandboxConfig;
//! # let temp = tempfile::TempDir::new().unwrap();
//!
//! let config = SandboxConfig::new(temp.path().join("workspace")).unwrap();
//! assert!(config.base_dir().is_dir());
//! assert!(config.base_dir().is_absolute());
//! ```

use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable holding the sandbox base directory.
pub const BASE_DIR_ENV: &str = "FILESYSTEM_BASE_DIR";

/// Environment variable overriding the patch utility.
pub const PATCH_PROGRAM_ENV: &str = "FSBOX_PATCH_PROGRAM";

/// Base directory used when neither the flag nor the environment sets one.
pub const DEFAULT_BASE_DIR: &str = "./filesystem_workspace";

/// Patch utility invoked when none is configured.
pub const DEFAULT_PATCH_PROGRAM: &str = "patch";

/// Process-wide sandbox settings.
///
/// Invariant: `base_dir` is absolute, canonical, and exists as a directory.
/// The only way to obtain a value is through a constructor that enforces
/// this, so consumers never re-check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    base_dir: PathBuf,
    patch_program: PathBuf,
}

impl SandboxConfig {
    /// Prepares a sandbox rooted at `base_dir`.
    ///
    /// Relative paths are made absolute against the current directory. The
    /// directory is created (with parents) if it does not exist, then stored
    /// in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if:
    /// - `base_dir` is empty
    /// - the path exists but is not a directory
    /// - the directory cannot be created or canonicalized
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let raw = base_dir.as_ref();
        if raw.as_os_str().is_empty() {
            return Err(Error::ConfigError {
                message: "Directory path cannot be empty".to_string(),
            });
        }

        let absolute = std::path::absolute(raw).map_err(|e| Error::ConfigError {
            message: format!("Cannot make {} absolute: {e}", raw.display()),
        })?;

        if absolute.exists() && !absolute.is_dir() {
            return Err(Error::ConfigError {
                message: format!("{} exists and is not a directory", absolute.display()),
            });
        }

        if !absolute.is_dir() {
            tracing::info!(base_dir = %absolute.display(), "creating sandbox directory");
            std::fs::create_dir_all(&absolute).map_err(|e| Error::ConfigError {
                message: format!("Cannot create {}: {e}", absolute.display()),
            })?;
        }

        let canonical = absolute.canonicalize().map_err(|e| Error::ConfigError {
            message: format!("Cannot canonicalize {}: {e}", absolute.display()),
        })?;

        Ok(Self {
            base_dir: canonical,
            patch_program: PathBuf::from(DEFAULT_PATCH_PROGRAM),
        })
    }

    /// Builds a configuration from the process environment.
    ///
    /// Reads [`BASE_DIR_ENV`] (falling back to [`DEFAULT_BASE_DIR`]) and
    /// [`PATCH_PROGRAM_ENV`].
    ///
    /// # Errors
    ///
    /// Same as [`SandboxConfig::new`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// [`SandboxConfig::from_env`] delegates here with `std::env::var_os`.
    /// An empty base directory value is rejected rather than defaulted.
    ///
    /// # Errors
    ///
    /// Same as [`SandboxConfig::new`].
    ///
    /// # Examples
    ///
    /// ```
    /// use fsbox_core::{SandboxConfig, BASE_DIR_ENV};
    /// # let temp = tempfile::TempDir::new().unwrap();
    /// # let dir = temp.path().join("from-lookup");
    ///
    /// let config = SandboxConfig::from_lookup(|key| {
    ///     (key == BASE_DIR_ENV).then(|| dir.clone().into_os_string())
    /// })
    /// .unwrap();
    /// assert!(config.base_dir().ends_with("from-lookup"));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let base_dir = lookup(BASE_DIR_ENV).unwrap_or_else(|| OsString::from(DEFAULT_BASE_DIR));
        let config = Self::new(PathBuf::from(base_dir))?;

        Ok(match lookup(PATCH_PROGRAM_ENV) {
            Some(program) if !program.is_empty() => config.with_patch_program(program),
            _ => config,
        })
    }

    /// Overrides the external patch utility.
    #[must_use]
    pub fn with_patch_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.patch_program = program.into();
        self
    }

    /// Canonical absolute path of the sandbox root.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Program used to apply patches.
    #[must_use]
    pub fn patch_program(&self) -> &Path {
        &self.patch_program
    }
}
