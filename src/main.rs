//! # Pokédash entry point
//!
//! ```text
//! main()
//!   ├─> init logging (tracing)
//!   ├─> parse CLI arguments (clap)
//!   ├─> load config, then the dataset (fatal on failure)
//!   ├─> subcommand given: print the result and exit
//!   └─> otherwise: write the default config if absent, then open the
//!       dashboard window (eframe)
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout, clippy::print_stderr)] // CLI output goes to the terminal
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod cli;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use pokedash::config::{DashboardConfig, get_config_path, load_config, write_if_missing};
use pokedash::dataset::Dataset;

fn main() -> Result<()> {
    if let Err(e) = pokedash::logging::init() {
        eprintln!("File logging unavailable: {e:#}");
    }

    let cli = cli::Cli::parse();

    let mut config = load_config();
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    let dataset = Dataset::load(&config.data_path)
        .inspect_err(|e| tracing::error!(path = %config.data_path.display(), error = %e, "Cannot start"))
        .with_context(|| format!("Failed to load {}", config.data_path.display()))?;

    if let Some(command) = cli.command {
        return cli::run_command(&dataset, command);
    }

    // first GUI launch: leave an editable copy of the defaults
    if let Err(e) = write_if_missing(&DashboardConfig::default(), &get_config_path()) {
        tracing::warn!(error = %e, "Could not write default config");
    }

    pokedash::gui::run(dataset, config)
}
