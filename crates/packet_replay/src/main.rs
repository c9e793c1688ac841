mod replay;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), replay::ReplayError> {
    let args = replay::Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let summary = replay::run(&args)?;
    info!(
        packets = summary.packets,
        failed_lines = summary.failed_lines,
        "replay finished"
    );
    Ok(())
}
