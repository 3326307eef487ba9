use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "config.toml";

const DK_EVENTGROUPS_URL: &str =
    "https://sportsbook-us-co.draftkings.com/sites/US-CO-SB/api/v4/eventgroups";
const DK_FUTURES_URL: &str = "https://sportsbook.draftkings.com/leagues/baseball/2003?category=team-futures&subcategory=world-series-2021";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub draftkings: DraftKingsFeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DraftKingsFeedConfig {
    /// Eventgroup API root; the event group id is appended as a path segment.
    #[serde(default = "default_dk_base_url")]
    pub base_url: String,
    /// Futures market page (HTML).
    #[serde(default = "default_dk_futures_url")]
    pub futures_url: String,
    #[serde(default = "default_dk_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_dk_base_url() -> String { DK_EVENTGROUPS_URL.to_string() }
fn default_dk_futures_url() -> String { DK_FUTURES_URL.to_string() }
fn default_dk_timeout() -> u64 { 10_000 }
fn default_user_agent() -> String { BROWSER_USER_AGENT.to_string() }

impl Default for DraftKingsFeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_dk_base_url(),
            futures_url: default_dk_futures_url(),
            request_timeout_ms: default_dk_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "dk_lines=info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Like `load`, but a missing file yields the built-in defaults.
    /// A file that exists and fails to parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config TOML")
    }
}
