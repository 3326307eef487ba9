//! DraftKings futures market page (HTML).
//!
//! Team labels and American odds are rendered as two separate runs of `span`
//! elements in page order; the n-th label belongs to the n-th price.

use super::types::{FuturesBook, FuturesOdds};
use crate::engine::probability::{american_to_probability, parse_american_odds};
use crate::engine::teams::normalize_team;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};

const TEAM_LABEL_SELECTOR: &str = "span.sportsbook-outcome-cell__label";
const AMERICAN_ODDS_SELECTOR: &str = "span.sportsbook-odds.american.default-color";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .ok()
        .with_context(|| format!("Invalid selector: {}", css))
}

fn select_text(document: &Html, css: &str) -> Result<Vec<String>> {
    let selector = selector(css)?;
    Ok(document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect())
}

/// Parse a futures page into team abbreviation -> implied probability.
/// Every entry is stamped with `now`.
///
/// Fails if the label and odds runs differ in length, since positional
/// pairing would then attach prices to the wrong teams.
pub fn parse_futures_html(html: &str, now: DateTime<Utc>) -> Result<FuturesBook> {
    let document = Html::parse_document(html);

    let labels = select_text(&document, TEAM_LABEL_SELECTOR)?;
    let prices = select_text(&document, AMERICAN_ODDS_SELECTOR)?;

    if labels.len() != prices.len() {
        anyhow::bail!(
            "futures page has {} team labels but {} odds values",
            labels.len(),
            prices.len()
        );
    }

    let mut book = FuturesBook::new();
    for (label, price) in labels.iter().zip(&prices) {
        let odds = parse_american_odds(price)
            .with_context(|| format!("unparseable odds {:?} for {}", price, label))?;
        book.insert(
            normalize_team(label),
            FuturesOdds {
                odds: american_to_probability(odds),
                date_time: now,
            },
        );
    }

    tracing::debug!(teams = book.len(), "parsed futures page");
    Ok(book)
}
