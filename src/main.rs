use anyhow::Result;
use clap::Parser;
use tasklist::{cli, logging, storage};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let log_path = args.log_file.clone().unwrap_or_else(storage::default_log_path);
    if let Err(e) = logging::init(&log_path) {
        eprintln!("warning: {e:#}");
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");

    cli::run(args)
}
