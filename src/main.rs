mod app;
mod config;
mod input;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use config::Args;
use std::{fs::File, sync::Mutex};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }
    app::run(args)
}
