//! Applying unified diffs with the external `patch` utility.
//!
//! The utility never runs inside the sandbox. The target is copied into a
//! private temporary directory together with the diff, and `patch` runs
//! there with that directory as its working directory. Only when it exits
//! cleanly and leaves a regular file under the target's own name is the
//! result installed, through the same staged replace as
//! [`FileOperations::write`]. Renames, deletions, copies, and backup files
//! requested by the diff stay in the private directory and are dropped
//! with it.

use crate::{FileOperations, ResolvedPath};
use fsbox_core::{Error, Result, SandboxConfig};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const MOVED_TARGET: &str =
    "the diff does not leave a regular file at the target; nothing was changed";

/// Outcome of a successful patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    /// What the utility printed (typically `patching file ...`)
    pub output: String,
}

/// Runs the configured patch program against sandboxed files.
#[derive(Debug, Clone)]
pub struct PatchApplier {
    program: PathBuf,
    files: FileOperations,
}

impl PatchApplier {
    /// Creates an applier using the configured patch program.
    #[must_use]
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            program: locate(config.patch_program()),
            files: FileOperations::new(),
        }
    }

    /// Program this applier invokes.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Applies `patch_text` to `target`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the target does not exist
    /// - [`Error::NotAFile`] if the target is a directory
    /// - [`Error::PatchFailure`] if the utility rejects the patch, or if the
    ///   diff renames, removes, or replaces the target instead of editing
    ///   it; the target is left unchanged
    /// - [`Error::IoFailure`] if the patch cannot be staged, the utility
    ///   cannot be started, or the result cannot be installed
    pub fn apply(&self, target: &ResolvedPath, patch_text: &str) -> Result<PatchReport> {
        let metadata =
            fs::metadata(target.as_path()).map_err(|e| Error::from_io(target.relative(), e))?;
        if metadata.is_dir() {
            return Err(Error::NotAFile {
                path: target.relative().to_string(),
            });
        }
        let name = target.as_path().file_name().ok_or_else(|| Error::NotAFile {
            path: target.relative().to_string(),
        })?;

        let staging_err = |e| Error::IoFailure {
            path: "patch staging directory".to_string(),
            source: e,
        };
        let workspace = tempfile::Builder::new()
            .prefix("fsbox-patch-")
            .tempdir()
            .map_err(staging_err)?;
        let staged = workspace.path().join(name);
        fs::copy(target.as_path(), &staged).map_err(|e| Error::from_io(target.relative(), e))?;

        let mut diff = tempfile::Builder::new()
            .prefix(".fsbox-")
            .suffix(".diff")
            .tempfile_in(workspace.path())
            .map_err(staging_err)?;
        diff.write_all(patch_text.as_bytes()).map_err(staging_err)?;
        diff.flush().map_err(staging_err)?;

        let output = self.run(target, workspace.path(), Path::new(name), diff.path())?;

        let still_a_file = fs::symlink_metadata(&staged).is_ok_and(|m| m.file_type().is_file());
        if !still_a_file {
            tracing::warn!(path = target.relative(), "diff moved or replaced the target");
            return Err(Error::PatchFailure {
                path: target.relative().to_string(),
                exit_code: None,
                diagnostic: format!("{output}\n{MOVED_TARGET}"),
            });
        }

        let patched = fs::read(&staged).map_err(staging_err)?;
        self.files.write(target, &patched)?;

        tracing::info!(path = target.relative(), "applied patch");
        Ok(PatchReport { output })
    }

    fn run(
        &self,
        target: &ResolvedPath,
        workdir: &Path,
        staged: &Path,
        patch_file: &Path,
    ) -> Result<String> {
        let mut command = Command::new(&self.program);
        command
            .args(["--batch", "--forward", "--no-backup-if-mismatch", "-u"])
            .arg(staged)
            .arg(patch_file)
            .current_dir(workdir)
            .stdin(Stdio::null());

        tracing::debug!(
            program = %self.program.display(),
            path = target.relative(),
            "running patch"
        );
        let output = command.output().map_err(|e| Error::IoFailure {
            path: self.program.display().to_string(),
            source: e,
        })?;

        let text = combined_output(&output);
        if output.status.success() {
            Ok(text)
        } else {
            tracing::warn!(
                path = target.relative(),
                exit_code = output.status.code(),
                "patch rejected"
            );
            Err(Error::PatchFailure {
                path: target.relative().to_string(),
                exit_code: output.status.code(),
                diagnostic: text,
            })
        }
    }
}

/// Anchors a relative program path with directories to the current
/// directory, since the utility runs from a private working directory.
/// Bare names are left for `PATH` lookup.
fn locate(program: &Path) -> PathBuf {
    if program.is_relative() && program.components().count() > 1 {
        std::path::absolute(program).unwrap_or_else(|_| program.to_path_buf())
    } else {
        program.to_path_buf()
    }
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim_end(), stderr.trim_end()) {
        (out, "") => out.to_string(),
        ("", err) => err.to_string(),
        (out, err) => format!("{out}\n{err}"),
    }
}
