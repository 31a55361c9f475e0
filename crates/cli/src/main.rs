//! slideshow-cache CLI
//!
//! Operator tool for a slideshow HTTP response cache: list, inspect, seed and
//! prune entries in a cache root without running the host application.

// The panic hook reports straight to stderr
#![allow(clippy::print_stderr)]

mod cli;
mod commands;
mod errors;
mod tracing;

use crate::tracing::{TracingConfig, init_tracing};
use slideshow_cache::{CacheStorage, default_cache_root};

fn main() -> miette::Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    init_tracing(TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
    })?;

    let root = match cli.root {
        Some(root) => root,
        None => default_cache_root()?,
    };
    let storage = CacheStorage::open(&root)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(&storage, cli.command, &mut out)?;
    Ok(())
}
