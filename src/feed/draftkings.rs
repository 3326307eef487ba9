use super::futures::parse_futures_html;
use super::types::*;
use super::OfferFeed;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Leagues with a known DraftKings event group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum League {
    Nba,
    Mlb,
    Nfl,
    Cbb,
}

impl League {
    pub const ALL: [League; 4] = [League::Nba, League::Mlb, League::Nfl, League::Cbb];

    pub fn key(self) -> &'static str {
        match self {
            League::Nba => "nba",
            League::Mlb => "mlb",
            League::Nfl => "nfl",
            League::Cbb => "cbb",
        }
    }

    /// DraftKings eventgroup id for the league's game lines.
    pub fn event_group_id(self) -> u64 {
        match self {
            League::Nba => 88670846,
            League::Mlb => 88670847,
            League::Nfl => 88670561,
            League::Cbb => 88670771,
        }
    }
}

impl FromStr for League {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        League::ALL
            .into_iter()
            .find(|league| league.key() == s)
            .with_context(|| format!("DraftKings has no event group for league: {}", s))
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub struct DraftKingsFeed {
    client: Client,
    base_url: String,
    futures_url: String,
}

impl DraftKingsFeed {
    pub fn new(config: &crate::config::DraftKingsFeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            futures_url: config.futures_url.clone(),
        })
    }

    /// Build the eventgroup URL for a league's game lines.
    pub fn event_group_url(&self, league: League) -> String {
        format!(
            "{}/{}?includePromotions=true&format=json",
            self.base_url,
            league.event_group_id()
        )
    }

    /// GET a URL and return the body, treating non-2xx as an error.
    async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("DraftKings request failed: {}", url))?;

        let status = resp.status();
        tracing::info!(%status, url, "DraftKings response");
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("DraftKings error ({}): {}", status, body);
        }

        resp.text().await.context("DraftKings response read failed")
    }

    /// Scrape the configured futures market page.
    pub async fn fetch_futures(&self) -> Result<FuturesBook> {
        let html = self.get_text(&self.futures_url).await?;
        parse_futures_html(&html, chrono::Utc::now())
    }
}

#[async_trait]
impl OfferFeed for DraftKingsFeed {
    async fn fetch_offers(&self, league: League) -> Result<Vec<OfferEntry>> {
        let url = self.event_group_url(league);
        let body = self.get_text(&url).await?;
        let entries = parse_offer_entries(&body)
            .with_context(|| format!("bad {} eventgroup payload", league))?;
        tracing::debug!(%league, offers = entries.len(), "fetched DraftKings offers");
        Ok(entries)
    }
}
