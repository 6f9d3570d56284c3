//! MCP server entry point for sandboxed filesystem access.
//!
//! # Usage
//!
//! Run the server via stdio transport:
//!
//! ```bash
//! fsbox-server --directory ./workspace
//! ```
//!
//! Or configure it in an MCP client:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "filesystem": {
//!       "command": "fsbox-server",
//!       "env": { "FILESYSTEM_BASE_DIR": "/home/me/workspace" }
//!     }
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use fsbox_core::{BASE_DIR_ENV, DEFAULT_BASE_DIR, PATCH_PROGRAM_ENV, SandboxConfig};
use fsbox_server::service::FsboxService;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// MCP server confining file access to a single directory.
#[derive(Parser, Debug)]
#[command(name = "fsbox-server", version, about)]
struct Args {
    /// Sandbox root directory (created if missing)
    #[arg(short = 'd', long, env = BASE_DIR_ENV, default_value = DEFAULT_BASE_DIR)]
    directory: PathBuf,

    /// Program used to apply patches
    #[arg(long, env = PATCH_PROGRAM_ENV)]
    patch_program: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is for MCP protocol)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fsbox_server=debug,fsbox_files=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let args = Args::parse();

    let mut config = SandboxConfig::new(&args.directory)
        .with_context(|| format!("cannot prepare sandbox at {}", args.directory.display()))?;
    if let Some(program) = args.patch_program {
        config = config.with_patch_program(program);
    }

    tracing::info!(
        base_dir = %config.base_dir().display(),
        "Starting fsbox-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Create and run the service with stdio transport
    let service = FsboxService::new(&config).serve(stdio()).await?;
    service.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
