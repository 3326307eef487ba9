/// Convert American odds to implied probability, rounded to 4 decimals.
/// Positive odds (e.g., +150): prob = 1 / (odds/100 + 1)
/// Negative odds (e.g., -150): prob = 1 - 1 / (|odds|/100 + 1)
///
/// No vig removal; a full market sums to more than 1.
pub fn american_to_probability(odds: i32) -> f64 {
    let odds = f64::from(odds);
    let prob = if odds > 0.0 {
        1.0 / (odds / 100.0 + 1.0)
    } else {
        1.0 - 1.0 / (-odds / 100.0 + 1.0)
    };
    round4(prob)
}

/// Ties go to the even digit: 1/32 = 0.03125 -> 0.0312.
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round_ties_even() / 10_000.0
}

/// Parse a DraftKings American odds string: "+150", "-180", "−180", "EVEN" (= +100).
/// DraftKings markup sometimes renders the sign as U+2212 MINUS SIGN.
pub fn parse_american_odds(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("EVEN") {
        return Some(100);
    }
    let s = s.replace('\u{2212}', "-");
    let odds = s.strip_prefix('+').unwrap_or(s.as_str()).parse::<i32>().ok()?;
    (odds != 0).then_some(odds)
}
