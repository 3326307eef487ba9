//! Reshape DraftKings game offers into per-team betting lines.
//!
//! Each offer entry is `[run line, totals, moneyline]`, and each offer lists
//! the away outcome at index 0 and the home outcome at index 1. Totals are the
//! exception: outcome 0 is the over and outcome 1 the under, and both teams of
//! a game share them.

use super::teams::normalize_team;
use crate::feed::draftkings::League;
use crate::feed::types::{DkOutcome, OfferEntry};
use crate::feed::OfferFeed;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// `[line, odds]`, serialized as a two-element array.
pub type LinePrice = (f64, String);

/// Position of each market within an offer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    RunLine,
    Total,
    Moneyline,
}

impl Market {
    fn index(self) -> usize {
        match self {
            Market::RunLine => 0,
            Market::Total => 1,
            Market::Moneyline => 2,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Market::RunLine => "run line",
            Market::Total => "total",
            Market::Moneyline => "moneyline",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Away,
    Home,
}

impl Side {
    fn index(self) -> usize {
        match self {
            Side::Away => 0,
            Side::Home => 1,
        }
    }
}

/// Field groups recorded per team; each is extracted independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    Moneyline,
    RunLine,
    Over,
    Under,
}

impl fmt::Display for LineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineField::Moneyline => "moneyline",
            LineField::RunLine => "run line",
            LineField::Over => "over",
            LineField::Under => "under",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineError {
    #[error("offer entry has no {market} offer")]
    MissingOffer { market: Market },

    #[error("{market} offer has no outcome {index}")]
    MissingOutcome { market: Market, index: usize },

    #[error("{market} outcome {index} has no usable {field}")]
    MissingField {
        market: Market,
        index: usize,
        field: &'static str,
    },
}

/// A field group that could not be extracted and was left off the record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFailure {
    pub team: String,
    pub field: LineField,
    pub away: String,
    pub home: String,
    pub error: LineError,
}

/// Betting lines for one team. Markets missing from the payload are left
/// out of the serialized record entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameLines {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moneyline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moneyline_decimal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moneyline_fractional: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runline: Option<LinePrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runline_decimal: Option<LinePrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runline_fractional: Option<LinePrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over: Option<LinePrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_decimal: Option<LinePrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_fractional: Option<LinePrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub under: Option<LinePrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub under_decimal: Option<LinePrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub under_fractional: Option<LinePrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
}

/// All teams seen in one scrape, plus the fields that could not be read.
#[derive(Debug, Clone, Default)]
pub struct GameSlate {
    pub games: BTreeMap<String, GameLines>,
    pub failures: Vec<FieldFailure>,
}

/// One price in all three DraftKings formats.
#[derive(Debug, Clone, PartialEq)]
struct OddsFormats {
    american: String,
    decimal: String,
    fractional: String,
}

impl OddsFormats {
    fn with_line(self, line: f64) -> [LinePrice; 3] {
        [
            (line, self.american),
            (line, self.decimal),
            (line, self.fractional),
        ]
    }
}

fn outcome(entry: &OfferEntry, market: Market, index: usize) -> Result<&DkOutcome, LineError> {
    let offer = entry
        .get(market.index())
        .ok_or(LineError::MissingOffer { market })?;
    offer
        .outcomes
        .get(index)
        .ok_or(LineError::MissingOutcome { market, index })
}

fn required<'a>(
    value: &'a Option<String>,
    market: Market,
    index: usize,
    field: &'static str,
) -> Result<&'a str, LineError> {
    value.as_deref().ok_or(LineError::MissingField {
        market,
        index,
        field,
    })
}

fn prices(entry: &OfferEntry, market: Market, index: usize) -> Result<OddsFormats, LineError> {
    let o = outcome(entry, market, index)?;
    Ok(OddsFormats {
        american: required(&o.odds_american, market, index, "oddsAmerican")?.to_string(),
        decimal: required(&o.odds_decimal, market, index, "oddsDecimal")?.to_string(),
        fractional: required(&o.odds_fractional, market, index, "oddsFractional")?.to_string(),
    })
}

fn priced_line(
    entry: &OfferEntry,
    market: Market,
    index: usize,
) -> Result<[LinePrice; 3], LineError> {
    let line = outcome(entry, market, index)?
        .line
        .ok_or(LineError::MissingField {
            market,
            index,
            field: "line",
        })?;
    Ok(prices(entry, market, index)?.with_line(line))
}

/// Raw team label for one side, read from the moneyline offer.
pub fn team_label(entry: &OfferEntry, side: Side) -> Result<&str, LineError> {
    let index = side.index();
    let o = outcome(entry, Market::Moneyline, index)?;
    required(&o.label, Market::Moneyline, index, "label")
}

/// Lines for one side of a game. Failed field groups come back alongside
/// the partial record instead of aborting it.
pub fn side_lines(
    entry: &OfferEntry,
    side: Side,
    opponent: &str,
) -> (GameLines, Vec<(LineField, LineError)>) {
    let mut lines = GameLines::default();
    let mut errors = Vec::new();

    match prices(entry, Market::Moneyline, side.index()) {
        Ok(p) => {
            lines.moneyline = Some(p.american);
            lines.moneyline_decimal = Some(p.decimal);
            lines.moneyline_fractional = Some(p.fractional);
        }
        Err(e) => errors.push((LineField::Moneyline, e)),
    }

    match priced_line(entry, Market::RunLine, side.index()) {
        Ok([american, decimal, fractional]) => {
            lines.runline = Some(american);
            lines.runline_decimal = Some(decimal);
            lines.runline_fractional = Some(fractional);
        }
        Err(e) => errors.push((LineField::RunLine, e)),
    }

    // Totals are per game, not per side: over is always outcome 0, under outcome 1.
    match priced_line(entry, Market::Total, 0) {
        Ok([american, decimal, fractional]) => {
            lines.over = Some(american);
            lines.over_decimal = Some(decimal);
            lines.over_fractional = Some(fractional);
        }
        Err(e) => errors.push((LineField::Over, e)),
    }

    match priced_line(entry, Market::Total, 1) {
        Ok([american, decimal, fractional]) => {
            lines.under = Some(american);
            lines.under_decimal = Some(decimal);
            lines.under_fractional = Some(fractional);
        }
        Err(e) => errors.push((LineField::Under, e)),
    }

    lines.opponent = Some(opponent.to_string());
    (lines, errors)
}

/// Build the per-team slate from offer entries.
///
/// A team keeps the lines of the first entry it appears in. An entry without
/// both moneyline labels cannot be attributed to teams and fails the build.
pub fn build_game_slate(entries: &[OfferEntry]) -> Result<GameSlate> {
    let mut slate = GameSlate::default();

    for entry in entries {
        let away = normalize_team(team_label(entry, Side::Away)?);
        let home = normalize_team(team_label(entry, Side::Home)?);

        for (side, team, opponent) in [(Side::Away, &away, &home), (Side::Home, &home, &away)] {
            if slate.games.contains_key(team) {
                continue;
            }

            let (lines, errors) = side_lines(entry, side, opponent);
            for (field, error) in errors {
                tracing::warn!(
                    team = %team,
                    field = %field,
                    away = %away,
                    home = %home,
                    error = %error,
                    "line extraction failed"
                );
                slate.failures.push(FieldFailure {
                    team: team.clone(),
                    field,
                    away: away.clone(),
                    home: home.clone(),
                    error,
                });
            }
            slate.games.insert(team.clone(), lines);
        }
    }

    Ok(slate)
}

/// Resolve a league key, then scrape it. An unknown key fails before the feed is called.
pub async fn scrape_league(feed: &dyn OfferFeed, league_key: &str) -> Result<GameSlate> {
    let league: League = league_key.parse()?;
    scrape_games(feed, league).await
}

/// Fetch a league's game lines and reshape them per team.
pub async fn scrape_games(feed: &dyn OfferFeed, league: League) -> Result<GameSlate> {
    let entries = feed.fetch_offers(league).await?;
    let slate = build_game_slate(&entries)?;
    tracing::info!(
        %league,
        teams = slate.games.len(),
        failures = slate.failures.len(),
        "built game slate"
    );
    Ok(slate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::DkOffer;

    fn dk_outcome(
        label: &str,
        line: Option<f64>,
        american: &str,
        decimal: &str,
        fractional: &str,
    ) -> DkOutcome {
        DkOutcome {
            label: Some(label.to_string()),
            line,
            odds_american: Some(american.to_string()),
            odds_decimal: Some(decimal.to_string()),
            odds_fractional: Some(fractional.to_string()),
        }
    }

    fn offer(outcomes: Vec<DkOutcome>) -> DkOffer {
        DkOffer { outcomes }
    }

    /// Yankees (away) at Red Sox (home).
    fn game_entry() -> OfferEntry {
        vec![
            offer(vec![
                dk_outcome("NY Yankees", Some(-1.5), "+130", "2.30", "13/10"),
                dk_outcome("BOS Red Sox", Some(1.5), "-155", "1.65", "13/20"),
            ]),
            offer(vec![
                dk_outcome("O", Some(8.5), "-105", "1.95", "20/21"),
                dk_outcome("U", Some(8.5), "-115", "1.87", "20/23"),
            ]),
            offer(vec![
                dk_outcome("NY Yankees", None, "-135", "1.74", "20/27"),
                dk_outcome("BOS Red Sox", None, "+115", "2.15", "23/20"),
            ]),
        ]
    }

    fn cubs_cardinals_entry() -> OfferEntry {
        vec![
            offer(vec![
                dk_outcome("CHI Cubs", Some(1.5), "-190", "1.53", "10/19"),
                dk_outcome("STL Cardinals", Some(-1.5), "+160", "2.60", "8/5"),
            ]),
            offer(vec![
                dk_outcome("O", Some(9.0), "-110", "1.91", "10/11"),
                dk_outcome("U", Some(9.0), "-110", "1.91", "10/11"),
            ]),
            offer(vec![
                dk_outcome("CHI Cubs", None, "+105", "2.05", "21/20"),
                dk_outcome("STL Cardinals", None, "-125", "1.80", "4/5"),
            ]),
        ]
    }

    #[test]
    fn test_slate_teams_and_opponents() {
        let slate = build_game_slate(&[game_entry()]).unwrap();
        assert_eq!(slate.games.len(), 2);
        assert_eq!(slate.games["NYY"].opponent.as_deref(), Some("BOS"));
        assert_eq!(slate.games["BOS"].opponent.as_deref(), Some("NYY"));
        assert!(slate.failures.is_empty());
    }

    #[test]
    fn test_moneyline_by_side() {
        let slate = build_game_slate(&[game_entry()]).unwrap();
        let away = &slate.games["NYY"];
        assert_eq!(away.moneyline.as_deref(), Some("-135"));
        assert_eq!(away.moneyline_decimal.as_deref(), Some("1.74"));
        assert_eq!(away.moneyline_fractional.as_deref(), Some("20/27"));
        let home = &slate.games["BOS"];
        assert_eq!(home.moneyline.as_deref(), Some("+115"));
    }

    #[test]
    fn test_runline_by_side() {
        let slate = build_game_slate(&[game_entry()]).unwrap();
        assert_eq!(slate.games["NYY"].runline, Some((-1.5, "+130".to_string())));
        assert_eq!(slate.games["BOS"].runline, Some((1.5, "-155".to_string())));
        assert_eq!(slate.games["BOS"].runline_decimal, Some((1.5, "1.65".to_string())));
        assert_eq!(slate.games["BOS"].runline_fractional, Some((1.5, "13/20".to_string())));
    }

    #[test]
    fn test_totals_shared_by_both_sides() {
        let slate = build_game_slate(&[game_entry()]).unwrap();
        for team in ["NYY", "BOS"] {
            let lines = &slate.games[team];
            assert_eq!(lines.over, Some((8.5, "-105".to_string())));
            assert_eq!(lines.over_decimal, Some((8.5, "1.95".to_string())));
            assert_eq!(lines.under, Some((8.5, "-115".to_string())));
            assert_eq!(lines.under_fractional, Some((8.5, "20/23".to_string())));
        }
    }

    #[test]
    fn test_missing_moneyline_keeps_other_fields() {
        let mut entry = game_entry();
        entry[2].outcomes[0].odds_american = None;

        let slate = build_game_slate(&[entry]).unwrap();
        let away = &slate.games["NYY"];
        assert!(away.moneyline.is_none());
        assert!(away.moneyline_decimal.is_none());
        assert!(away.runline.is_some());
        assert!(away.over.is_some());
        assert!(away.under.is_some());
        assert_eq!(away.opponent.as_deref(), Some("BOS"));

        // the home side is unaffected
        assert_eq!(slate.games["BOS"].moneyline.as_deref(), Some("+115"));

        assert_eq!(slate.failures.len(), 1);
        let failure = &slate.failures[0];
        assert_eq!(failure.team, "NYY");
        assert_eq!(failure.field, LineField::Moneyline);
        assert_eq!(
            failure.error,
            LineError::MissingField {
                market: Market::Moneyline,
                index: 0,
                field: "oddsAmerican"
            }
        );
    }

    #[test]
    fn test_missing_runline_line() {
        let mut entry = game_entry();
        entry[0].outcomes[1].line = None;

        let slate = build_game_slate(&[entry]).unwrap();
        assert!(slate.games["BOS"].runline.is_none());
        assert!(slate.games["BOS"].runline_decimal.is_none());
        assert!(slate.games["BOS"].moneyline.is_some());
        assert!(slate.games["NYY"].runline.is_some());
        assert_eq!(slate.failures[0].field, LineField::RunLine);
    }

    #[test]
    fn test_unreadable_runline_line_drops_only_runline() {
        use crate::feed::types::parse_offer_entries;

        let json = r#"{"eventGroup": {"offerCategories": [{"offerSubcategoryDescriptors": [{
            "offerSubcategory": {"offers": [[
                {"outcomes": [
                    {"label": "NY Yankees", "line": "pk", "oddsAmerican": "+130", "oddsDecimal": "2.30", "oddsFractional": "13/10"},
                    {"label": "BOS Red Sox", "line": "1.5", "oddsAmerican": "-155", "oddsDecimal": "1.65", "oddsFractional": "13/20"}
                ]},
                {"outcomes": [
                    {"label": "O", "line": 8.5, "oddsAmerican": "-105", "oddsDecimal": "1.95", "oddsFractional": "20/21"},
                    {"label": "U", "line": 8.5, "oddsAmerican": "-115", "oddsDecimal": true, "oddsFractional": "20/23"}
                ]},
                {"outcomes": [
                    {"label": "NY Yankees", "oddsAmerican": "-135", "oddsDecimal": "1.74", "oddsFractional": "20/27"},
                    {"label": "BOS Red Sox", "oddsAmerican": "+115", "oddsDecimal": "2.15", "oddsFractional": "23/20"}
                ]}
            ]]}
        }]}]}}"#;

        let entries = parse_offer_entries(json).unwrap();
        let slate = build_game_slate(&entries).unwrap();

        let away = &slate.games["NYY"];
        assert!(away.runline.is_none());
        assert_eq!(away.moneyline.as_deref(), Some("-135"));
        assert_eq!(away.over, Some((8.5, "-105".to_string())));
        assert_eq!(away.opponent.as_deref(), Some("BOS"));

        // a numeric-string line is still usable
        assert_eq!(slate.games["BOS"].runline, Some((1.5, "-155".to_string())));

        // under has an unreadable decimal price, so both teams lose it
        assert!(away.under.is_none());
        assert!(slate.games["BOS"].under.is_none());

        assert!(slate.failures.contains(&FieldFailure {
            team: "NYY".to_string(),
            field: LineField::RunLine,
            away: "NYY".to_string(),
            home: "BOS".to_string(),
            error: LineError::MissingField {
                market: Market::RunLine,
                index: 0,
                field: "line",
            },
        }));
        assert_eq!(slate.failures.len(), 3);
    }

    #[test]
    fn test_missing_totals_offer() {
        let mut entry = game_entry();
        entry[1].outcomes.clear();

        let slate = build_game_slate(&[entry]).unwrap();
        for team in ["NYY", "BOS"] {
            assert!(slate.games[team].over.is_none());
            assert!(slate.games[team].under.is_none());
            assert!(slate.games[team].moneyline.is_some());
        }
        // over and under, for each team
        assert_eq!(slate.failures.len(), 4);
        assert!(slate
            .failures
            .iter()
            .all(|f| matches!(f.error, LineError::MissingOutcome { market: Market::Total, .. })));
    }

    #[test]
    fn test_entry_with_only_moneyline() {
        let entry = vec![DkOffer::default(), DkOffer::default(), game_entry().remove(2)];
        let slate = build_game_slate(&[entry]).unwrap();
        let away = &slate.games["NYY"];
        assert!(away.moneyline.is_some());
        assert!(away.runline.is_none());
        assert!(away.over.is_none());
        assert_eq!(away.opponent.as_deref(), Some("BOS"));
    }

    #[test]
    fn test_missing_label_fails_build() {
        let mut entry = game_entry();
        entry[2].outcomes[1].label = None;
        assert!(build_game_slate(&[entry]).is_err());
    }

    #[test]
    fn test_short_entry_fails_build() {
        let entry = vec![game_entry().remove(0)];
        assert!(build_game_slate(&[entry]).is_err());
    }

    #[test]
    fn test_first_seen_wins() {
        let mut rematch = game_entry();
        rematch[2].outcomes[0].odds_american = Some("-300".to_string());

        let slate = build_game_slate(&[game_entry(), cubs_cardinals_entry(), rematch]).unwrap();
        assert_eq!(slate.games.len(), 4);
        assert_eq!(slate.games["NYY"].moneyline.as_deref(), Some("-135"));
    }

    #[test]
    fn test_normalized_keys() {
        let slate = build_game_slate(&[cubs_cardinals_entry()]).unwrap();
        assert_eq!(slate.games["CHC"].opponent.as_deref(), Some("STL"));
        assert_eq!(slate.games["STL"].opponent.as_deref(), Some("CHC"));
    }

    #[test]
    fn test_idempotent() {
        let entries = [game_entry(), cubs_cardinals_entry(), game_entry()];
        let first = build_game_slate(&entries).unwrap();
        let second = build_game_slate(&entries).unwrap();
        assert_eq!(first.games, second.games);
        assert_eq!(first.failures, second.failures);
    }

    #[test]
    fn test_serialization_omits_missing_fields() {
        let mut entry = game_entry();
        entry[0].outcomes.clear();

        let slate = build_game_slate(&[entry]).unwrap();
        let json = serde_json::to_value(&slate.games["NYY"]).unwrap();
        assert!(json.get("runline").is_none());
        assert!(json.get("runline_decimal").is_none());
        assert_eq!(json["moneyline"], "-135");
        assert_eq!(json["over"], serde_json::json!([8.5, "-105"]));
        assert_eq!(json["opponent"], "BOS");
    }

    #[test]
    fn test_empty_entries() {
        let slate = build_game_slate(&[]).unwrap();
        assert!(slate.games.is_empty());
        assert!(slate.failures.is_empty());
    }

    #[test]
    fn test_line_error_messages() {
        assert_eq!(
            LineError::MissingOffer { market: Market::RunLine }.to_string(),
            "offer entry has no run line offer"
        );
        assert_eq!(
            LineError::MissingOutcome { market: Market::Total, index: 1 }.to_string(),
            "total offer has no outcome 1"
        );
    }
}
