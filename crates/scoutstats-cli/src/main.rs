//! scoutstats - membership statistics from the organization's CSV exports.
//!
//! Loads a directory of exports, decodes the hierarchy from registration
//! numbers and prints yearly totals, dropdown options for the current
//! selection, a breakdown of the selected unit and optionally the treemap.

mod args;
mod report;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use scoutstats_core::{Config, DataLoader, SelectionState};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::Args;
use report::Report;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let args = Args::parse();

    let mut config = Config::load()?.with_env_overrides();
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if args.from.is_some() {
        config.year_from = args.from;
    }
    if args.to.is_some() {
        config.year_to = args.to;
    }
    if args.delimiter.is_some() {
        config.delimiter = args.delimiter;
    }
    if let Some(measure) = args.measure {
        config.measure = measure;
    }

    if args.save_config {
        config.save().context("Failed to save config")?;
        info!("Config saved");
    }

    let data_dir = config.data_dir();
    info!(dir = %data_dir.display(), "scoutstats starting");

    let mut loader = DataLoader::new(&data_dir);
    loader
        .load_all_csvs(config.delimiter_byte())
        .with_context(|| format!("Failed to load data from {}", data_dir.display()))?;

    if let Some(key) = args.preview_key() {
        print!("{}", loader.preview(key, args.rows));
        return Ok(());
    }

    let (records, summary) = loader.normalize_and_merge();
    let available = records.years();
    debug!(years = ?available, "Years in data");

    let year = args.year.or_else(|| config.selected_year(&available));
    let initial = SelectionState {
        year,
        ..SelectionState::default()
    };
    let selection = args
        .events()
        .iter()
        .fold(initial, |state, event| state.apply(event, &records));

    let report = Report::build(
        &records,
        summary,
        selection,
        config.year_range(&available),
        config.measure,
        args.treemap,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }

    Ok(())
}
