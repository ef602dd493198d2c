//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Stylesheet build pipeline with a live-reloading proxy
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sheen.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "sheen.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Production mode: minify stylesheets
    #[arg(short, long, visible_alias = "build", global = true)]
    pub production: bool,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Task to run (default: build once)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available tasks
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Build stylesheets once
    #[command(visible_alias = "b")]
    Build,

    /// Watch sources, rebuild, and serve through the live-reload proxy
    #[command(visible_alias = "w")]
    Watch,
}

impl Cli {
    /// Resolved task; no subcommand runs the default task (a one-shot build).
    pub fn task(&self) -> Commands {
        self.command.unwrap_or(Commands::Build)
    }
}
