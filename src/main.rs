use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use halite_stats::config::AppConfig;
use halite_stats::fetch::{FileMatchHistory, HttpMatchHistory, MatchHistoryProvider};
use halite_stats::parse_duration;
use halite_stats::report::{OutputFormat, Reporter};
use halite_stats::session::Session;
use halite_stats::PlayerId;

#[derive(Parser)]
#[command(name = "halite-stats")]
#[command(about = "Average game scores for a Halite player, by mode and map size")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Match API root
    #[arg(long)]
    api_url: Option<String>,

    /// Number of most recent games to fetch
    #[arg(long)]
    limit: Option<u32>,

    /// Request timeout (e.g., "30s", "500ms")
    #[arg(long)]
    timeout: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Report on this player and exit instead of prompting
    #[arg(long)]
    player: Option<PlayerId>,

    /// Read match history from a saved API response instead of the network
    #[arg(long)]
    from_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
    }
    if let Some(limit) = cli.limit {
        config.api.match_limit = limit;
    }
    config.validate()?;

    // Initialize tracing
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer).init();
    }

    tracing::info!("Starting halite-stats v{}", env!("CARGO_PKG_VERSION"));

    let mut fetcher_config = config.api.fetcher_config();
    if let Some(timeout) = &cli.timeout {
        match parse_duration(timeout) {
            Some(d) if !d.is_zero() => fetcher_config.timeout = d,
            _ => bail!("Invalid --timeout (expected e.g. 30s or 500ms): {}", timeout),
        }
    }

    let provider: Box<dyn MatchHistoryProvider> = match &cli.from_file {
        Some(path) => Box::new(FileMatchHistory::new(path)),
        None => Box::new(HttpMatchHistory::new(fetcher_config)?),
    };
    tracing::info!("Using {} match history provider", provider.name());

    let session = Session::new(provider, Reporter::new(cli.format));
    let mut stdout = tokio::io::stdout();

    match cli.player {
        Some(player_id) => {
            let rendered = session.report_player(player_id).await?;
            stdout.write_all(rendered.as_bytes()).await?;
            stdout.flush().await?;
        }
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            let summary = session.run(stdin, &mut stdout).await?;
            tracing::info!(
                "Session ended: {} reports, {} failed requests",
                summary.reports,
                summary.failures
            );
        }
    }

    Ok(())
}
