pub mod draftkings;
pub mod futures;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use draftkings::League;
use types::OfferEntry;

/// Source of game-line offer entries for a league.
#[async_trait]
pub trait OfferFeed: Send + Sync {
    async fn fetch_offers(&self, league: League) -> Result<Vec<OfferEntry>>;
}
