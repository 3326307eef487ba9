use anyhow::{Context, Result};
use dk_lines::config::{Config, CONFIG_FILE};
use dk_lines::engine::scrape_league;
use dk_lines::feed::draftkings::DraftKingsFeed;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_LEAGUE: &str = "mlb";

/// Usage: dk-lines [league] [--futures]
///
/// Prints the game lines (or, with `--futures`, the futures book) to stdout as
/// JSON. Logging, including per-field extraction failures, goes to stderr
/// rather than stdout so the JSON output stays machine-readable.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(Path::new(CONFIG_FILE))?;

    // stdout carries the JSON output; logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let futures_mode = args.iter().any(|arg| arg == "--futures");
    let league_key = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .map(String::as_str)
        .unwrap_or(DEFAULT_LEAGUE);

    let feed = DraftKingsFeed::new(&config.draftkings)?;

    let output = if futures_mode {
        let book = feed.fetch_futures().await?;
        serde_json::to_string_pretty(&book).context("failed to serialize futures")?
    } else {
        let slate = scrape_league(&feed, league_key).await?;
        serde_json::to_string_pretty(&slate.games).context("failed to serialize game lines")?
    };

    println!("{}", output);
    Ok(())
}
