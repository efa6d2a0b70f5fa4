use anyhow::Context;
use clap::Parser;
use memwrap::{Config, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "memwrap",
    version,
    about = "Normalize raw memory-management calls to instrumented safe wrappers",
    long_about = "Scan a C source tree and rewrite raw allocation calls to their instrumented \
    safe-wrapper equivalents (FREE/MALLOC/free become SAFE_FREE/SAFE_MALLOC). \
    Every modified file is backed up next to the original first, and remaining \
    malloc() calls are listed for manual conversion.\n\n\
    USAGE EXAMPLES:\n  \
      # Rewrite files under the current directory\n  \
      memwrap\n\n  \
      # Rewrite a specific tree without prompting\n  \
      memwrap --dir ./src --yes\n\n  \
      # Preview the changes only\n  \
      memwrap --dry-run"
)]
struct Cli {
    /// Directory to scan for source files
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    dir: PathBuf,

    /// Assume an affirmative answer to the confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,

    /// Dry run (report changes without writing files)
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let config = Config::builder()
        .root_dir(cli.dir)
        .assume_yes(cli.yes)
        .dry_run(cli.dry_run)
        .build()
        .context("Failed to build configuration")?;

    Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .context("Rewrite run failed")?;

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("memwrap=info"),
        1 => EnvFilter::new("memwrap=debug"),
        _ => EnvFilter::new("memwrap=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
