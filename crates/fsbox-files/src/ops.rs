//! Reading, writing, and deleting files inside the sandbox.

use crate::ResolvedPath;
use fsbox_core::{Error, Result};
use std::fs;
use std::io::Write;

/// File-level operations on resolved paths.
///
/// Stateless: every method receives a [`ResolvedPath`] that has already
/// been checked against the sandbox root.
///
/// # Examples
///
/// ```
/// use fsbox_core::SandboxConfig;
/// use fsbox_files::{FileOperations, PathResolver};
/// # let temp = tempfile::TempDir::new().unwrap();
///
/// let resolver = PathResolver::new(&SandboxConfig::new(temp.path()).unwrap());
/// let files = FileOperations::new();
///
/// let target = resolver.resolve("notes/todo.txt").unwrap();
/// files.write(&target, b"buy milk\n").unwrap();
/// assert_eq!(files.read(&target).unwrap(), b"buy milk\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOperations;

impl FileOperations {
    /// Creates the operation set.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the full contents of a file.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the file does not exist
    /// - [`Error::NotAFile`] if the target is a directory
    /// - [`Error::IoFailure`] for any other read error
    pub fn read(&self, file: &ResolvedPath) -> Result<Vec<u8>> {
        let metadata =
            fs::metadata(file.as_path()).map_err(|e| Error::from_io(file.relative(), e))?;
        if metadata.is_dir() {
            return Err(Error::NotAFile {
                path: file.relative().to_string(),
            });
        }

        let bytes = fs::read(file.as_path()).map_err(|e| Error::from_io(file.relative(), e))?;
        tracing::debug!(path = file.relative(), bytes = bytes.len(), "read file");
        Ok(bytes)
    }

    /// Creates or replaces a file with `content`.
    ///
    /// Missing parent directories are created. The content is written to a
    /// temporary file in the same directory, flushed to disk, and renamed
    /// over the target, so readers see either the old or the new content in
    /// full. An existing file keeps its permission bits.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAFile`] if the target is an existing directory
    /// - [`Error::IoFailure`] if the parent cannot be created or the write
    ///   fails
    pub fn write(&self, file: &ResolvedPath, content: &[u8]) -> Result<()> {
        let existing = fs::metadata(file.as_path()).ok();
        if existing.as_ref().is_some_and(fs::Metadata::is_dir) {
            return Err(Error::NotAFile {
                path: file.relative().to_string(),
            });
        }

        let io_err = |e| Error::from_io(file.relative(), e);
        let parent = file.as_path().parent().ok_or_else(|| Error::NotAFile {
            path: file.relative().to_string(),
        })?;
        fs::create_dir_all(parent).map_err(io_err)?;

        let mut staged = tempfile::Builder::new()
            .prefix(".fsbox-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(io_err)?;
        staged.write_all(content).map_err(io_err)?;
        staged.as_file().sync_all().map_err(io_err)?;

        if let Some(metadata) = existing {
            staged
                .as_file()
                .set_permissions(metadata.permissions())
                .map_err(io_err)?;
        }

        staged
            .persist(file.as_path())
            .map_err(|e| Error::from_io(file.relative(), e.error))?;

        tracing::debug!(path = file.relative(), bytes = content.len(), "wrote file");
        Ok(())
    }

    /// Removes a file or directory.
    ///
    /// A directory with entries is only removed when `recursive` is set;
    /// an empty directory is removed either way. `target` should come from
    /// [`PathResolver::resolve_entry`](crate::PathResolver::resolve_entry):
    /// a symlink is removed itself, never the file or directory behind it.
    ///
    /// # Errors
    ///
    /// - [`Error::PathViolation`] if the target is the sandbox root
    /// - [`Error::NotFound`] if the target does not exist
    /// - [`Error::DirectoryNotEmpty`] for a non-empty directory without
    ///   `recursive`
    /// - [`Error::IoFailure`] if removal fails
    pub fn delete(&self, target: &ResolvedPath, recursive: bool) -> Result<()> {
        if target.is_root() {
            return Err(Error::PathViolation {
                path: target.relative().to_string(),
                reason: "the sandbox root cannot be deleted".to_string(),
            });
        }

        let io_err = |e| Error::from_io(target.relative(), e);
        let metadata = fs::symlink_metadata(target.as_path()).map_err(io_err)?;

        if metadata.file_type().is_symlink() {
            fs::remove_file(target.as_path()).map_err(io_err)?;
        } else if metadata.is_dir() {
            if recursive {
                fs::remove_dir_all(target.as_path()).map_err(io_err)?;
            } else {
                let mut entries = fs::read_dir(target.as_path()).map_err(io_err)?;
                if entries.next().is_some() {
                    return Err(Error::DirectoryNotEmpty {
                        path: target.relative().to_string(),
                    });
                }
                fs::remove_dir(target.as_path()).map_err(io_err)?;
            }
        } else {
            fs::remove_file(target.as_path()).map_err(io_err)?;
        }

        tracing::info!(path = target.relative(), recursive, "deleted");
        Ok(())
    }
}
