//! Point d'entrée CLI pour plowmap-viewer

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Carte live des chasse-neige: suivi, inspection et export
#[derive(Parser)]
#[command(name = "plowmap-viewer")]
#[command(author, version)]
#[command(about = "Live snowplow map viewer: poll the feeds, inspect popups, export snapshots")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config preset name (chicago) or path to a JSON config
    #[arg(long, default_value = "chicago", global = true)]
    config: String,

    /// Subcommand (default: watch)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = cli::load_config(&cli.config)?;
    info!(
        config = %cli.config,
        refresh_ms = config.refresh_ms,
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Watch { report: None }) {
        Commands::Watch { report } => {
            cli::cmd_watch(&config, report.as_deref()).await?;
        }
        Commands::Inspect {
            lng,
            lat,
            zoom,
            format,
        } => {
            cli::cmd_inspect(&config, lng, lat, zoom, format).await?;
        }
        Commands::Snapshot { output } => {
            info!(output = %output.display(), "Snapshot");
            cli::cmd_snapshot(&config, &output).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
