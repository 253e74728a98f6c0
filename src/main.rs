mod app;
mod color;
mod config;
mod data;
mod error;
mod report;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::DashboardApp;
use chrono::Local;
use clap::Parser;
use config::DashboardConfig;
use data::cache::TableCache;
use data::filter::{init_selection, FilterSelection};
use data::view::DashboardView;
use eframe::egui;
use state::AppState;

/// User engagement & revenue dashboard
#[derive(Parser, Debug)]
#[command(name = "engagement-dashboard", version, long_about = None)]
struct Cli {
    /// Data file to open at startup (.csv, .tsv, .json, .parquet)
    data: Option<PathBuf>,

    /// JSON file overriding churn thresholds and table sizes
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the dashboard as markdown instead of opening a window
    #[arg(long, requires = "data")]
    summary: bool,

    /// Write the summary to this file instead of stdout
    #[arg(long, requires = "summary")]
    out: Option<PathBuf>,

    /// Device types to include in the summary (repeatable; default: all)
    #[arg(long = "device", requires = "summary")]
    devices: Vec<String>,

    /// Game modes to include in the summary (repeatable; default: all)
    #[arg(long = "game-mode", requires = "summary")]
    game_modes: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::load_from(path)?,
        None => DashboardConfig::default(),
    };
    log::debug!("Using {config:?}");

    if cli.summary {
        return run_summary(&cli, &config);
    }

    let mut state = AppState::with_config(config);
    if let Some(path) = &cli.data {
        // A failed startup load is shown in the status line; the window
        // still opens so another file can be picked.
        let _ = state.load(path, Local::now().naive_local());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Engagement Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run the dashboard window: {e}"))
}

fn run_summary(cli: &Cli, config: &DashboardConfig) -> Result<()> {
    let path = cli.data.as_deref().context("--summary needs a data file")?;
    let table = TableCache::new()
        .get_or_load(path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    let defaults = init_selection(&table);
    let selection = FilterSelection {
        devices: if cli.devices.is_empty() {
            defaults.devices
        } else {
            cli.devices.iter().cloned().collect()
        },
        game_modes: if cli.game_modes.is_empty() {
            defaults.game_modes
        } else {
            cli.game_modes.iter().cloned().collect()
        },
    };

    let view = DashboardView::compute(&table, &selection, Local::now().naive_local(), config);
    let report = report::build_report(&path.display().to_string(), &view, &config.churn);

    match &cli.out {
        Some(out) => {
            std::fs::write(out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Summary written to {}.", out.display());
        }
        None => print!("{report}"),
    }
    Ok(())
}
