//! Définition et implémentation des commandes CLI
//!
//! - `watch`: boucle de rafraîchissement jusqu'à Ctrl-C (défaut)
//! - `inspect`: popup affiché par un clic à une position
//! - `snapshot`: export de l'état courant

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use tracing::{info, warn};

use plowmap::{render_html, render_text, LngLat, MapView, SourceId};
use plowmap_viewer::export::{export_metadata, export_source};
use plowmap_viewer::{HttpFeed, TickStatus, Viewer, ViewerConfig};

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the feeds and keep the map up to date until Ctrl-C
    Watch {
        /// Write each tick report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the popup a click at this position would open
    Inspect {
        /// Longitude of the click
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Latitude of the click
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Zoom level used for hit-testing (default: configured zoom)
        #[arg(long)]
        zoom: Option<f64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Fetch once and write vehicles, routes and metadata to a directory
    Snapshot {
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Html,
    Json,
}

/// Charge la configuration (preset ou fichier) puis les surcharges d'environnement
pub fn load_config(name_or_path: &str) -> Result<ViewerConfig> {
    let mut config = ViewerConfig::resolve(name_or_path)?;
    config.apply_env();
    config.validate()?;
    Ok(config)
}

async fn bootstrap(config: &ViewerConfig) -> Result<Viewer<HttpFeed>> {
    let feed = HttpFeed::new(&config.feeds)?;
    let (viewer, initial) = Viewer::bootstrap(config, feed).await?;
    if initial.status == TickStatus::Failed {
        warn!("Initial refresh failed, map starts empty");
    }
    Ok(viewer)
}

/// Exécute la commande watch
pub async fn cmd_watch(config: &ViewerConfig, report_path: Option<&Path>) -> Result<()> {
    let running = bootstrap(config).await?.start();
    let mut reports = running.refresh.reports();

    info!("Watching feeds, press Ctrl-C to stop");
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
            changed = reports.changed() => {
                if changed.is_err() {
                    warn!("Refresh loop ended unexpectedly");
                    break;
                }
                let report = reports.borrow_and_update().clone();
                if let (Some(report), Some(path)) = (report, report_path) {
                    if let Err(e) = report.save_to_file(path) {
                        warn!(path = %path.display(), error = %e, "Failed to save tick report");
                    }
                }
            }
        }
    }

    let ticks = running.refresh.shutdown().await?;
    info!(ticks, "Stopped");
    Ok(())
}

/// Exécute la commande inspect
pub async fn cmd_inspect(
    config: &ViewerConfig,
    lng: f64,
    lat: f64,
    zoom: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let viewer = bootstrap(config).await?;
    let target = LngLat::new(lng, lat);
    viewer
        .map
        .jump_to(target, zoom.unwrap_or(config.view.zoom));
    viewer.controller.on_move_end();

    let point = viewer.map.project(target);
    match viewer.controller.on_click(point) {
        Some(popup) => {
            let output = match format {
                OutputFormat::Text => render_text(&popup.content),
                OutputFormat::Html => render_html(&popup.content),
                OutputFormat::Json => serde_json::to_string_pretty(&popup)?,
            };
            println!("{}", output);
        }
        None => println!("Nothing here at {}", target),
    }
    Ok(())
}

/// Exécute la commande snapshot
pub async fn cmd_snapshot(config: &ViewerConfig, output: &Path) -> Result<()> {
    std::fs::create_dir_all(output)
        .context(format!("Failed to create directory: {}", output.display()))?;

    let viewer = bootstrap(config).await?;

    for source in [SourceId::Plows, SourceId::PlowRoutes] {
        let path = output.join(format!("{}.geojson", source.name()));
        let count = export_source(viewer.map.as_ref(), source, &path)?;
        info!(source = source.name(), features = count, path = %path.display(), "Exported");
    }

    match viewer.metadata().current() {
        Some(metadata) => {
            let path = output.join("meta.json");
            export_metadata(&metadata, &path)?;
            info!(path = %path.display(), "Exported metadata");
        }
        None => warn!("No metadata available, meta.json not written"),
    }

    Ok(())
}
