//! Symbolic tokens accepted by the read-side APIs and the fetcher.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Leaderboard variant requested from the ranking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankCategory {
    Top,
    Controversial,
    TopAndControversial,
    Hated,
}

impl RankCategory {
    pub const ALL: [RankCategory; 4] = [
        RankCategory::Top,
        RankCategory::Controversial,
        RankCategory::TopAndControversial,
        RankCategory::Hated,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RankCategory::Top => "top",
            RankCategory::Controversial => "controversial",
            RankCategory::TopAndControversial => "top_and_controversial",
            RankCategory::Hated => "hated",
        }
    }
}

impl fmt::Display for RankCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// Lookback window for read-side reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Window {
    #[serde(rename = "week")]
    Week,
    #[default]
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "year")]
    Year,
}

impl Window {
    pub const ALL: [Window; 4] = [Window::Week, Window::Month, Window::SixMonths, Window::Year];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Window::Week => "week",
            Window::Month => "month",
            Window::SixMonths => "6months",
            Window::Year => "year",
        }
    }

    #[must_use]
    pub fn days(self) -> u32 {
        match self {
            Window::Week => 7,
            Window::Month => 30,
            Window::SixMonths => 180,
            Window::Year => 365,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Window {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Window::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownWindow(s.to_string()))
    }
}

/// Upstream listing time filter used when fetching a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lookback {
    Hour,
    Day,
    Week,
    Month,
}

impl Lookback {
    pub const ALL: [Lookback; 4] = [Lookback::Hour, Lookback::Day, Lookback::Week, Lookback::Month];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Lookback::Hour => "hour",
            Lookback::Day => "day",
            Lookback::Week => "week",
            Lookback::Month => "month",
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookback {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lookback::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownLookback(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_tokens_map_to_day_counts() {
        assert_eq!("week".parse::<Window>().unwrap().days(), 7);
        assert_eq!("month".parse::<Window>().unwrap().days(), 30);
        assert_eq!("6months".parse::<Window>().unwrap().days(), 180);
        assert_eq!("year".parse::<Window>().unwrap().days(), 365);
    }

    #[test]
    fn unknown_window_is_rejected() {
        assert_eq!(
            "fortnight".parse::<Window>().unwrap_err(),
            ValidationError::UnknownWindow("fortnight".to_string())
        );
    }

    #[test]
    fn default_window_is_month() {
        assert_eq!(Window::default(), Window::Month);
    }

    #[test]
    fn rank_category_accepts_all_four_tokens() {
        for token in ["top", "controversial", "top_and_controversial", "hated"] {
            let parsed: RankCategory = token.parse().unwrap();
            assert_eq!(parsed.as_str(), token);
        }
    }

    #[test]
    fn rank_category_rejects_unknown_token() {
        assert!(matches!(
            "best".parse::<RankCategory>(),
            Err(ValidationError::UnknownCategory(ref s)) if s == "best"
        ));
    }

    #[test]
    fn rank_category_serializes_snake_case() {
        let json = serde_json::to_string(&RankCategory::TopAndControversial).unwrap();
        assert_eq!(json, "\"top_and_controversial\"");
    }

    #[test]
    fn lookback_parses_upstream_tokens() {
        assert_eq!("day".parse::<Lookback>().unwrap(), Lookback::Day);
        assert!("year".parse::<Lookback>().is_err());
    }
}
