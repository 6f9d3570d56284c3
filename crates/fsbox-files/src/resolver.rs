//! Sandbox path resolution.
//!
//! [`PathResolver`] turns a caller-supplied relative path into a
//! [`ResolvedPath`]: an absolute, canonical location proven to lie inside
//! the sandbox root. Every filesystem operation takes a `ResolvedPath`, so
//! nothing touches the disk with an unchecked path.
//!
//! Resolution has two stages:
//!
//! 1. Textual rejection. `..` anywhere in the input, a leading `/` or `\`,
//!    a drive or UNC prefix, and NUL bytes are refused before any
//!    filesystem access.
//! 2. Canonical containment. The longest existing ancestor of the joined
//!    path is canonicalized (following symlinks) and the not-yet-existing
//!    remainder is re-attached. The result must have the sandbox root as a
//!    component-wise prefix.
//!
//! A symlink whose target cannot be resolved is treated as a violation,
//! since its eventual location cannot be checked.
//!
//! [`PathResolver::resolve_entry`] is the variant used for removal: only the
//! parent is resolved, so a symlink named by the caller is the entry acted
//! on rather than whatever it points at.

use fsbox_core::{Error, Result, SandboxConfig};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// A path that has passed sandbox validation.
///
/// Only [`PathResolver::resolve`] constructs values of this type.
///
/// # Examples
///
/// ```
/// use fsbox_core::SandboxConfig;
/// use fsbox_files::PathResolver;
/// # let temp = tempfile::TempDir::new().unwrap();
///
/// let config = SandboxConfig::new(temp.path()).unwrap();
/// let resolver = PathResolver::new(&config);
///
/// let resolved = resolver.resolve("notes/todo.txt").unwrap();
/// assert!(resolved.as_path().starts_with(config.base_dir()));
/// assert_eq!(resolved.relative(), "notes/todo.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: String,
    is_root: bool,
}

impl ResolvedPath {
    /// Canonical absolute location.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// Path as the caller wrote it, or `.` for the sandbox root.
    ///
    /// Used in messages so callers see their own input echoed back.
    #[must_use]
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Returns `true` if this is the sandbox root itself.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.is_root
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.absolute
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative)
    }
}

/// Validates relative paths against a sandbox root.
///
/// Holds no state besides the canonical root, so it is cheap to clone and
/// safe to share between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver for the configured sandbox.
    #[must_use]
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            root: config.base_dir().to_path_buf(),
        }
    }

    /// Canonical sandbox root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `relative` to a location inside the sandbox.
    ///
    /// `""` and `"."` both denote the sandbox root. The target does not
    /// need to exist, which lets `write` create new files, but every
    /// existing ancestor is resolved through its symlinks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathViolation`] if the input is textually unsafe,
    /// resolves outside the root, or passes through a symlink whose target
    /// cannot be resolved. Returns [`Error::IoFailure`] if an ancestor
    /// cannot be inspected for another reason (for example, permission
    /// denied or a file used as a directory).
    ///
    /// # Examples
    ///
    /// ```
    /// use fsbox_core::SandboxConfig;
    /// use fsbox_files::PathResolver;
    /// # let temp = tempfile::TempDir::new().unwrap();
    ///
    /// let resolver = PathResolver::new(&SandboxConfig::new(temp.path()).unwrap());
    ///
    /// assert!(resolver.resolve("").unwrap().is_root());
    /// assert!(resolver.resolve("../etc/passwd").unwrap_err().is_path_violation());
    /// assert!(resolver.resolve("/etc/passwd").unwrap_err().is_path_violation());
    /// ```
    pub fn resolve(&self, relative: &str) -> Result<ResolvedPath> {
        reject_unsafe_text(relative)?;

        let joined = self.root.join(normalized(relative));
        let canonical = self.canonicalize_lenient(relative, &joined)?;
        self.ensure_inside(relative, &canonical)?;

        let is_root = canonical == self.root;
        let display = if is_root && relative.trim_matches(['.', '/']).is_empty() {
            ".".to_string()
        } else {
            relative.to_string()
        };

        Ok(ResolvedPath {
            absolute: canonical,
            relative: display,
            is_root,
        })
    }

    /// Resolves `relative` to a directory entry inside the sandbox without
    /// following the entry itself.
    ///
    /// The parent directory is resolved exactly as in [`resolve`](Self::resolve);
    /// the final name is appended as-is. If that name is a symlink, the
    /// result points at the link, which may dangle or lead outside the
    /// sandbox. Used by `delete`, so removing a link never touches its
    /// target.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve), applied to the parent.
    ///
    /// # Examples
    ///
    /// ```
    /// use fsbox_core::SandboxConfig;
    /// use fsbox_files::PathResolver;
    /// # let temp = tempfile::TempDir::new().unwrap();
    ///
    /// let resolver = PathResolver::new(&SandboxConfig::new(temp.path()).unwrap());
    ///
    /// let entry = resolver.resolve_entry("notes/old.txt").unwrap();
    /// assert_eq!(entry.as_path(), resolver.root().join("notes").join("old.txt"));
    /// assert!(resolver.resolve_entry("../x").unwrap_err().is_path_violation());
    /// ```
    pub fn resolve_entry(&self, relative: &str) -> Result<ResolvedPath> {
        reject_unsafe_text(relative)?;

        let normalized = normalized(relative);
        let Some(name) = normalized.file_name() else {
            return self.resolve(relative);
        };
        let parent = match normalized.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.root.join(parent),
            _ => self.root.clone(),
        };

        let canonical_parent = self.canonicalize_lenient(relative, &parent)?;
        self.ensure_inside(relative, &canonical_parent)?;

        Ok(ResolvedPath {
            absolute: canonical_parent.join(name),
            relative: relative.to_string(),
            is_root: false,
        })
    }

    fn ensure_inside(&self, relative: &str, canonical: &Path) -> Result<()> {
        if canonical.starts_with(&self.root) {
            Ok(())
        } else {
            tracing::warn!(path = relative, "path resolves outside the sandbox");
            Err(violation(relative, "resolves outside the sandbox root"))
        }
    }

    /// Canonicalizes the longest existing prefix of `joined` and appends the
    /// remaining components unchanged.
    fn canonicalize_lenient(&self, relative: &str, joined: &Path) -> Result<PathBuf> {
        let mut existing = joined.to_path_buf();
        let mut pending: Vec<OsString> = Vec::new();

        loop {
            match fs::symlink_metadata(&existing) {
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    // The root always exists, so this only runs out on a
                    // root that vanished after startup.
                    let Some(name) = existing.file_name() else {
                        return Err(Error::from_io(relative, e));
                    };
                    pending.push(name.to_os_string());
                    if !existing.pop() || !existing.starts_with(&self.root) {
                        return Err(Error::from_io(relative, e));
                    }
                }
                Err(e) => return Err(Error::from_io(relative, e)),
            }
        }

        let mut canonical = existing.canonicalize().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                violation(relative, "symlink target does not exist and cannot be verified")
            } else {
                Error::from_io(relative, e)
            }
        })?;

        for name in pending.into_iter().rev() {
            canonical.push(name);
        }
        Ok(canonical)
    }
}

fn normalized(relative: &str) -> PathBuf {
    Path::new(relative)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn reject_unsafe_text(relative: &str) -> Result<()> {
    if relative.contains('\0') {
        return Err(violation(relative, "contains a NUL byte"));
    }
    if relative.contains("..") {
        return Err(violation(relative, "parent directory traversal is not allowed"));
    }
    if relative.starts_with(['/', '\\']) {
        return Err(violation(relative, "absolute paths are not allowed"));
    }

    let path = Path::new(relative);
    if path.is_absolute()
        || path.has_root()
        || path
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(violation(relative, "absolute paths are not allowed"));
    }
    Ok(())
}

fn violation(path: &str, reason: &str) -> Error {
    Error::PathViolation {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
