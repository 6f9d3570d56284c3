//! Directory listing and recursive tree building.
//!
//! Both operations take an already-resolved directory. Listing looks at
//! immediate children only. Trees recurse into subdirectories, following
//! symlinked directories only while they stay inside the sandbox, and fail
//! when a symlink leads back to a directory that is still being walked.

use crate::ResolvedPath;
use fsbox_core::{DirectoryEntry, EntryKind, Error, Result, SandboxConfig, TreeNode};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads directory structure inside the sandbox.
///
/// # Examples
///
/// ```
/// use fsbox_core::{EntryKind, SandboxConfig};
/// use fsbox_files::{DirectoryWalker, PathResolver};
/// # let temp = tempfile::TempDir::new().unwrap();
/// # std::fs::create_dir(temp.path().join("sub")).unwrap();
/// # std::fs::write(temp.path().join("a.txt"), "").unwrap();
///
/// let config = SandboxConfig::new(temp.path()).unwrap();
/// let resolver = PathResolver::new(&config);
/// let walker = DirectoryWalker::new(&config);
///
/// let entries = walker.list(&resolver.resolve("").unwrap()).unwrap();
/// assert_eq!(entries[0].name, "a.txt");
/// assert_eq!(entries[1].kind, EntryKind::Directory);
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
}

impl DirectoryWalker {
    /// Creates a walker bounded by the configured sandbox root.
    #[must_use]
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            root: config.base_dir().to_path_buf(),
        }
    }

    /// Lists the immediate children of `dir`, sorted by name.
    ///
    /// `.` and `..` are never included. A symlink to a directory inside
    /// the sandbox is reported as a directory. Anything else (including a
    /// dangling symlink and any symlink leading outside the sandbox) is
    /// reported as a file.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if `dir` does not exist
    /// - [`Error::NotADirectory`] if `dir` is not a directory
    /// - [`Error::IoFailure`] if the directory cannot be read
    pub fn list(&self, dir: &ResolvedPath) -> Result<Vec<DirectoryEntry>> {
        ensure_directory(dir)?;

        let mut entries = Vec::new();
        for entry in read_dir(dir.as_path(), dir.relative())? {
            let entry = entry.map_err(|e| Error::from_io(dir.relative(), e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let kind = self.entry_kind(&entry).unwrap_or(EntryKind::File);
            entries.push(DirectoryEntry::new(name, kind));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(path = dir.relative(), count = entries.len(), "listed directory");
        Ok(entries)
    }

    /// Builds the full recursive tree under `dir`.
    ///
    /// The returned node is always [`TreeNode::Directory`]. Children are
    /// keyed by name, so an empty directory maps to an empty map.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] / [`Error::NotADirectory`] as for [`list`](Self::list)
    /// - [`Error::CycleDetected`] if a symlinked directory re-enters a
    ///   directory on the current descent path
    /// - [`Error::PathViolation`] if a symlink in the tree points outside
    ///   the sandbox
    /// - [`Error::IoFailure`] if any directory in the tree cannot be read
    pub fn tree(&self, dir: &ResolvedPath) -> Result<TreeNode> {
        ensure_directory(dir)?;

        let mut ancestors = Vec::new();
        let tree = self.walk(dir.as_path(), dir.relative(), &mut ancestors)?;
        tracing::debug!(path = dir.relative(), files = tree.file_count(), "built tree");
        Ok(tree)
    }

    fn walk(&self, path: &Path, shown: &str, ancestors: &mut Vec<PathBuf>) -> Result<TreeNode> {
        let canonical = path.canonicalize().map_err(|e| Error::from_io(shown, e))?;

        if !canonical.starts_with(&self.root) {
            return Err(escape(shown));
        }
        if ancestors.contains(&canonical) {
            return Err(Error::CycleDetected {
                path: shown.to_string(),
            });
        }
        ancestors.push(canonical);

        let mut children = BTreeMap::new();
        for entry in read_dir(path, shown)? {
            let entry = entry.map_err(|e| Error::from_io(shown, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let child_shown = join_display(shown, &name);

            let node = match self.entry_kind(&entry) {
                Some(EntryKind::File) => TreeNode::File,
                Some(EntryKind::Directory) => self.walk(&entry.path(), &child_shown, ancestors)?,
                None => return Err(escape(&child_shown)),
            };
            children.insert(name, node);
        }

        ancestors.pop();
        Ok(TreeNode::Directory { children })
    }

    /// Classifies an entry. A symlink is followed only when its canonical
    /// target lies inside the sandbox; `None` marks one that leaves it.
    fn entry_kind(&self, entry: &fs::DirEntry) -> Option<EntryKind> {
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => Some(EntryKind::Directory),
            Ok(ft) if ft.is_symlink() => match entry.path().canonicalize() {
                Ok(target) if !target.starts_with(&self.root) => None,
                Ok(target) if target.is_dir() => Some(EntryKind::Directory),
                _ => Some(EntryKind::File),
            },
            _ => Some(EntryKind::File),
        }
    }
}

fn escape(shown: &str) -> Error {
    tracing::warn!(path = shown, "symlink leaves the sandbox");
    Error::PathViolation {
        path: shown.to_string(),
        reason: "symlink points outside the sandbox".to_string(),
    }
}

fn ensure_directory(dir: &ResolvedPath) -> Result<()> {
    let metadata = fs::metadata(dir.as_path()).map_err(|e| Error::from_io(dir.relative(), e))?;
    if metadata.is_dir() {
        Ok(())
    } else {
        Err(Error::NotADirectory {
            path: dir.relative().to_string(),
        })
    }
}

fn read_dir(path: &Path, shown: &str) -> Result<fs::ReadDir> {
    fs::read_dir(path).map_err(|e| Error::from_io(shown, e))
}

fn join_display(parent: &str, name: &str) -> String {
    if parent == "." {
        name.to_string()
    } else {
        format!("{}/{name}", parent.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathResolver;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathResolver, DirectoryWalker) {
        let temp = TempDir::new().unwrap();
        let config = SandboxConfig::new(temp.path()).unwrap();
        (temp, PathResolver::new(&config), DirectoryWalker::new(&config))
    }

    #[test]
    fn test_list_sorted_with_kinds() {
        let (temp, resolver, walker) = setup();
        fs::write(temp.path().join("zeta.txt"), "").unwrap();
        fs::write(temp.path().join("alpha.txt"), "").unwrap();
        fs::create_dir(temp.path().join("middle")).unwrap();

        let entries = walker.list(&resolver.resolve(".").unwrap()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.txt", "middle", "zeta.txt"]);
        assert!(entries[1].is_dir());
        assert!(!entries[0].is_dir());
    }

    #[test]
    fn test_list_empty_directory() {
        let (_temp, resolver, walker) = setup();
        let entries = walker.list(&resolver.resolve("").unwrap()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_list_errors() {
        let (temp, resolver, walker) = setup();
        fs::write(temp.path().join("file.txt"), "").unwrap();

        let err = walker.list(&resolver.resolve("missing").unwrap()).unwrap_err();
        assert!(err.is_not_found());

        let err = walker.list(&resolver.resolve("file.txt").unwrap()).unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_tree_structure() {
        let (temp, resolver, walker) = setup();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::create_dir(temp.path().join("empty")).unwrap();
        fs::write(temp.path().join("a/b/deep.txt"), "").unwrap();
        fs::write(temp.path().join("top.txt"), "").unwrap();

        let tree = walker.tree(&resolver.resolve("").unwrap()).unwrap();
        assert_eq!(tree.file_count(), 2);
        assert_eq!(tree.child("top.txt"), Some(&TreeNode::File));
        assert_eq!(tree.child("empty"), Some(&TreeNode::empty_dir()));
        let deep = tree.child("a").and_then(|a| a.child("b")).and_then(|b| b.child("deep.txt"));
        assert_eq!(deep, Some(&TreeNode::File));
    }

    #[test]
    fn test_tree_of_subdirectory() {
        let (temp, resolver, walker) = setup();
        fs::create_dir_all(temp.path().join("src/bin")).unwrap();
        fs::write(temp.path().join("src/lib.rs"), "").unwrap();

        let tree = walker.tree(&resolver.resolve("src").unwrap()).unwrap();
        let names: Vec<_> = tree.children().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["bin", "lib.rs"]);
    }

    #[test]
    fn test_tree_of_file_is_not_a_directory() {
        let (temp, resolver, walker) = setup();
        fs::write(temp.path().join("file.txt"), "").unwrap();

        let err = walker.tree(&resolver.resolve("file.txt").unwrap()).unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_join_display() {
        assert_eq!(join_display(".", "a"), "a");
        assert_eq!(join_display("a", "b"), "a/b");
        assert_eq!(join_display("a/", "b"), "a/b");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_listed_as_directory() {
        let (temp, resolver, walker) = setup();
        fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone"), temp.path().join("dangling")).unwrap();

        let entries = walker.list(&resolver.resolve("").unwrap()).unwrap();
        let kind = |name: &str| entries.iter().find(|e| e.name == name).map(|e| e.kind);
        assert_eq!(kind("link"), Some(EntryKind::Directory));
        assert_eq!(kind("dangling"), Some(EntryKind::File));
    }

    #[cfg(unix)]
    #[test]
    fn test_escaping_symlinks_listed_as_files() {
        let (temp, resolver, walker) = setup();
        let outside = TempDir::new().unwrap();
        fs::create_dir(outside.path().join("private")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("private"), temp.path().join("out_dir"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path().join("absent"), temp.path().join("out_gone"))
            .unwrap();

        let entries = walker.list(&resolver.resolve("").unwrap()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.kind == EntryKind::File));
    }

    #[cfg(unix)]
    #[test]
    fn test_tree_rejects_file_symlink_out_of_sandbox() {
        let (temp, resolver, walker) = setup();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "x").unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), temp.path().join("alias"))
            .unwrap();

        let err = walker.tree(&resolver.resolve("").unwrap()).unwrap_err();
        assert!(matches!(err, Error::PathViolation { ref path, .. } if path == "alias"));
    }

    #[cfg(unix)]
    #[test]
    fn test_tree_detects_symlink_cycle() {
        let (temp, resolver, walker) = setup();
        fs::create_dir(temp.path().join("a")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("a"), temp.path().join("a/loop")).unwrap();

        let err = walker.tree(&resolver.resolve("").unwrap()).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { ref path } if path == "a/loop"));
    }

    #[cfg(unix)]
    #[test]
    fn test_tree_allows_repeated_non_cyclic_links() {
        let (temp, resolver, walker) = setup();
        fs::create_dir(temp.path().join("shared")).unwrap();
        fs::write(temp.path().join("shared/x.txt"), "").unwrap();
        fs::create_dir(temp.path().join("one")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("shared"), temp.path().join("one/s")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("shared"), temp.path().join("two")).unwrap();

        let tree = walker.tree(&resolver.resolve("").unwrap()).unwrap();
        assert_eq!(tree.file_count(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_tree_rejects_symlink_out_of_sandbox() {
        let (temp, resolver, walker) = setup();
        let outside = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("inner")).unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("inner/out")).unwrap();

        let err = walker.tree(&resolver.resolve("").unwrap()).unwrap_err();
        assert!(err.is_path_violation());
    }
}
