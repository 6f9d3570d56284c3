//! Shell completion generation command.
//!
//! Generates shell completion scripts for bash, zsh, fish, and `PowerShell`.

use clap::Command;
use clap_complete::{Shell, generate};
use fsbox_core::cli::ExitCode;
use std::io;
use tracing::info;

/// Prints the completion script for `shell` to stdout.
///
/// # Examples
///
/// ```no_run
/// use clap::Command;
/// use clap_complete::Shell;
/// use fsbox_cli::commands::completions;
///
/// let mut cmd = Command::new("fsbox");
/// let code = completions::run(Shell::Bash, &mut cmd);
/// assert!(code.is_success());
/// ```
pub fn run(shell: Shell, cmd: &mut Command) -> ExitCode {
    info!("Generating {} completions", shell);
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut io::stdout());
    ExitCode::SUCCESS
}
