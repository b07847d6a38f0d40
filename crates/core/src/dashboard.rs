//! Dashboard metric change and trend calculation.

use serde::{Deserialize, Serialize};

/// Changes smaller than this many percent count as flat.
pub const TREND_DEAD_BAND: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Percent change from `previous` to `current`, rounded to two decimals.
///
/// `None` when there is no previous value. A zero baseline yields 100% for
/// any positive value and 0% when both are zero.
pub fn percent_change(current: f64, previous: Option<f64>) -> Option<f64> {
    let previous = previous?;
    if previous == 0.0 {
        return Some(if current == 0.0 {
            0.0
        } else if current > 0.0 {
            100.0
        } else {
            -100.0
        });
    }
    let change = (current - previous) / previous.abs() * 100.0;
    Some((change * 100.0).round() / 100.0)
}

pub fn trend(change: Option<f64>) -> Trend {
    match change {
        Some(c) if c > TREND_DEAD_BAND => Trend::Up,
        Some(c) if c < -TREND_DEAD_BAND => Trend::Down,
        _ => Trend::Flat,
    }
}

/// Share of `part` in `whole` as a rounded percentage.
pub fn rate(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    (part as f64 * 100.0 / whole as f64 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_against_previous() {
        assert_eq!(percent_change(110.0, Some(100.0)), Some(10.0));
        assert_eq!(percent_change(90.0, Some(100.0)), Some(-10.0));
        assert_eq!(percent_change(5.0, None), None);
        assert_eq!(percent_change(5.0, Some(0.0)), Some(100.0));
        assert_eq!(percent_change(0.0, Some(0.0)), Some(0.0));
        assert_eq!(percent_change(1.0, Some(3.0)), Some(-66.67));
    }

    #[test]
    fn trend_has_dead_band() {
        assert_eq!(trend(Some(0.4)), Trend::Flat);
        assert_eq!(trend(Some(-0.5)), Trend::Flat);
        assert_eq!(trend(Some(0.6)), Trend::Up);
        assert_eq!(trend(Some(-2.0)), Trend::Down);
        assert_eq!(trend(None), Trend::Flat);
    }

    #[test]
    fn rate_handles_empty_whole() {
        assert_eq!(rate(1, 4), 25.0);
        assert_eq!(rate(3, 0), 0.0);
    }
}
