use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One futures-market price, stamped with the scrape time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuturesOdds {
    /// Implied probability in [0, 1].
    pub odds: f64,
    pub date_time: DateTime<Utc>,
}

/// Team abbreviation -> futures price.
pub type FuturesBook = BTreeMap<String, FuturesOdds>;

/// One game as DraftKings lists it: `[run line, totals, moneyline]`.
pub type OfferEntry = Vec<DkOffer>;

// DraftKings sportsbook eventgroup (v4) response types.
// Only the path down to the primary subcategory's offers is modeled.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkResponse {
    pub event_group: Option<DkEventGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkEventGroup {
    #[serde(default)]
    pub offer_categories: Vec<DkOfferCategory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkOfferCategory {
    #[serde(default)]
    pub offer_subcategory_descriptors: Vec<DkSubcategoryDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkSubcategoryDescriptor {
    pub offer_subcategory: Option<DkOfferSubcategory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkOfferSubcategory {
    #[serde(default)]
    pub offers: Vec<OfferEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkOffer {
    #[serde(default, deserialize_with = "lenient_outcomes")]
    pub outcomes: Vec<DkOutcome>,
}

/// Every field is optional and read leniently; a missing or unreadable value
/// becomes `None` and surfaces later as a per-field extraction failure rather
/// than a failed decode of the whole payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkOutcome {
    #[serde(default, deserialize_with = "lenient_text")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_line")]
    pub line: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub odds_american: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub odds_decimal: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub odds_fractional: Option<String>,
}

/// DraftKings has shipped odds both as strings ("1.91") and as bare numbers (1.91).
/// Any other JSON type reads as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A line is a number, or occasionally a numeric string ("-1.5").
fn lenient_line<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// An outcome that is not an object keeps its slot as an empty outcome, so
/// outcome indices stay aligned with away/home.
fn lenient_outcomes<'de, D>(deserializer: D) -> Result<Vec<DkOutcome>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| DkOutcome::deserialize(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// Extract the offer entries of the first subcategory of the first offer category:
/// `eventGroup.offerCategories[0].offerSubcategoryDescriptors[0].offerSubcategory.offers`.
/// Public for unit testing with fixtures.
pub fn parse_offer_entries(json: &str) -> Result<Vec<OfferEntry>> {
    let resp: DkResponse =
        serde_json::from_str(json).context("failed to parse DraftKings response")?;

    let event_group = resp
        .event_group
        .context("DraftKings response has no eventGroup")?;
    let category = event_group
        .offer_categories
        .into_iter()
        .next()
        .context("eventGroup has no offer categories")?;
    let descriptor = category
        .offer_subcategory_descriptors
        .into_iter()
        .next()
        .context("offer category has no subcategory descriptors")?;
    let subcategory = descriptor
        .offer_subcategory
        .context("subcategory descriptor has no offerSubcategory")?;

    Ok(subcategory.offers)
}
