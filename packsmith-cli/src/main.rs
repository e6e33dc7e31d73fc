mod cli;
mod logging;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::Args;
use packsmith_lib::game::extract_modpack;
use packsmith_lib::game::installer::types::LogProgressReporter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let cwd = std::env::current_dir()?;
    let spec = args.to_spec(&cwd);

    // A fatal error has already been logged by the pipeline; exit normally.
    if let Ok(report) = extract_modpack(&spec, Arc::new(LogProgressReporter)).await {
        if args.open {
            if let Err(e) = open::that(&report.output_dir) {
                log::warn!("Could not open {:?}: {}", report.output_dir, e);
            }
        }
    }

    Ok(())
}
