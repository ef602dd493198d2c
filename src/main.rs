//! sheen - stylesheet build pipeline with a live-reloading proxy.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod notify;
mod pipeline;
mod proxy;
mod reload;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;
use core::BuildMode;

fn main() -> Result<()> {
    let args = Cli::parse();

    // Set global color override based on CLI option
    match args.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(args.verbose);

    let config = Arc::new(SiteConfig::load(&args)?);
    let mode = BuildMode::from_flag(args.production);

    match args.task() {
        Commands::Build => cli::build::build(config, mode),
        Commands::Watch => cli::watch::watch(config, mode),
    }
}
