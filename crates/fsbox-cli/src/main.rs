//! fsbox CLI.
//!
//! Command-line access to a sandboxed directory: every path is relative to
//! the sandbox root and nothing outside it can be read or changed.
//!
//! # Architecture
//!
//! The CLI is organized around subcommands:
//! - `read`, `list`, `tree`, `write`, `delete`, `patch` - one sandbox operation each
//! - `call` - a raw operation name plus JSON arguments
//! - `completions` - Generate shell completions
//!
//! # Examples
//!
//! ```bash
//! # Write and read back a file
//! fsbox -d ./workspace write notes/todo.txt --content "buy milk"
//! fsbox -d ./workspace read notes/todo.txt
//!
//! # Apply a patch from stdin
//! git diff notes/todo.txt | fsbox -d ./workspace patch notes/todo.txt
//!
//! # Same request an MCP client would send
//! fsbox call list '{"path": "notes"}' --format json
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use fsbox_cli::commands;
use fsbox_core::cli::{ExitCode, OutputFormat};
use fsbox_core::{BASE_DIR_ENV, DEFAULT_BASE_DIR, PATCH_PROGRAM_ENV, SandboxConfig};
use fsbox_files::{Dispatcher, Operation};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// fsbox - filesystem operations confined to one directory.
///
/// Paths containing `..`, absolute paths, and symlinks that lead outside
/// the sandbox are rejected.
#[derive(Parser, Debug)]
#[command(name = "fsbox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Sandbox root directory (created if missing)
    #[arg(short = 'd', long, global = true, env = BASE_DIR_ENV, default_value = DEFAULT_BASE_DIR)]
    directory: PathBuf,

    /// Program used to apply patches
    #[arg(long, global = true, env = PATCH_PROGRAM_ENV)]
    patch_program: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    format: String,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a file's content.
    Read {
        /// File path relative to the sandbox root
        path: String,
    },

    /// List a directory's immediate entries.
    List {
        /// Directory path relative to the sandbox root (default: the root)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Show the recursive tree under a directory.
    Tree {
        /// Directory path relative to the sandbox root (default: the root)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Create or replace a file.
    ///
    /// Content comes from `--content`, `--file`, or stdin, in that order.
    Write {
        /// File path relative to the sandbox root
        path: String,

        /// Content to write
        #[arg(short, long, conflicts_with = "file")]
        content: Option<String>,

        /// Host file whose content to write
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a file or directory.
    Delete {
        /// Path relative to the sandbox root
        path: String,

        /// Delete non-empty directories and their contents
        #[arg(short, long)]
        recursive: bool,
    },

    /// Apply a unified diff to a file.
    ///
    /// The diff comes from `--file` or stdin. The file is left unchanged if
    /// the diff does not apply cleanly.
    Patch {
        /// File path relative to the sandbox root
        path: String,

        /// Host file containing the diff
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Dispatch a raw request: operation name plus JSON arguments.
    ///
    /// ```bash
    /// fsbox call delete '{"path": "notes", "recursive": true}'
    /// ```
    Call {
        /// Operation name (read, list, tree, write, delete, patch)
        operation: String,

        /// Arguments as a JSON object
        args: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Parse output format
    let output_format = cli.format.parse::<OutputFormat>()?;

    // Execute command and get exit code
    let exit_code = execute_command(cli, output_format)?;

    // Exit with appropriate code
    std::process::exit(exit_code.as_i32());
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_sandbox(directory: &Path, patch_program: Option<PathBuf>) -> Result<Dispatcher> {
    let mut config = SandboxConfig::new(directory)
        .with_context(|| format!("cannot prepare sandbox at {}", directory.display()))?;
    if let Some(program) = patch_program {
        config = config.with_patch_program(program);
    }
    Ok(Dispatcher::new(&config))
}

fn execute_command(cli: Cli, output_format: OutputFormat) -> Result<ExitCode> {
    let operation = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            return Ok(commands::completions::run(shell, &mut cmd));
        }
        Commands::Call { operation, args } => {
            let dispatcher = open_sandbox(&cli.directory, cli.patch_program)?;
            return commands::call::run(&dispatcher, &operation, args.as_deref(), output_format);
        }
        Commands::Read { path } => Operation::Read { path },
        Commands::List { path } => Operation::List { path },
        Commands::Tree { path } => Operation::Tree { path },
        Commands::Write {
            path,
            content,
            file,
        } => Operation::Write {
            path,
            content: commands::common::read_input(content, file.as_deref())?,
        },
        Commands::Delete { path, recursive } => Operation::Delete { path, recursive },
        Commands::Patch { path, file } => Operation::Patch {
            path,
            patch: commands::common::read_input(None, file.as_deref())?,
        },
    };

    let dispatcher = open_sandbox(&cli.directory, cli.patch_program)?;
    commands::operation::run(&dispatcher, &operation, output_format)
}
