//! vercomp — clone Jira project versions and components between projects.
//!
//! # Usage
//!
//! ```text
//! vercomp [--config <path>] [-v] clone [--dry-run] [--fail-fast] [--unarchive] [--json]
//! vercomp [--config <path>] [-v] check
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, clone::CloneArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "vercomp",
    version,
    about = "Copy Jira versions and components from one project to another",
    long_about = None,
)]
struct Cli {
    /// Config file (default: ~/.vercomp/config.yaml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log per-field differences and HTTP calls.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Converge the destination project onto the source project.
    Clone(CloneArgs),

    /// Validate the config, log in, and confirm both projects are reachable.
    Check(CheckArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Clone(args) => args.run(config),
        Commands::Check(args) => args.run(config),
    }
}

/// Logs go to stderr so `--json` output stays machine-readable. `RUST_LOG` wins.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug,ureq=info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
