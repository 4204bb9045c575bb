use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Side of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "Long"),
            Direction::Short => write!(f, "Short"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Long" => Ok(Direction::Long),
            "Short" => Ok(Direction::Short),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// Win/loss classification of a trade. A pnl of exactly zero is breakeven,
/// never a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

/// One logged position. `pnl` is the only field the aggregation layer
/// consumes numerically; everything past `tags` is descriptive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub date: NaiveDate,
    pub instrument: String,
    pub direction: Direction,
    pub entry: f64,
    pub exit: f64,
    pub position: f64,
    /// Realized profit/loss in account currency, signed.
    pub pnl: f64,
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psychology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Vec<String>>,
}

impl Trade {
    pub fn outcome(&self) -> Outcome {
        if self.pnl > 0.0 {
            Outcome::Win
        } else if self.pnl < 0.0 {
            Outcome::Loss
        } else {
            Outcome::Breakeven
        }
    }
}

/// Write-side shape for creating or replacing a trade. The date arrives as
/// a string and is validated by the store; an `id` of zero means the store
/// assigns one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTradeInput {
    #[serde(default)]
    pub id: i64,
    pub date: String,
    pub instrument: String,
    pub direction: Direction,
    pub entry: f64,
    pub exit: f64,
    pub position: f64,
    pub pnl: f64,
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub psychology: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub risk: Option<f64>,
    #[serde(default)]
    pub screenshots: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeFilters {
    pub instrument: Option<String>,
    pub direction: Option<Direction>,
    pub tag: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classification() {
        let mut trade = sample_trade();
        trade.pnl = 12.5;
        assert_eq!(trade.outcome(), Outcome::Win);
        trade.pnl = -0.01;
        assert_eq!(trade.outcome(), Outcome::Loss);
        trade.pnl = 0.0;
        assert_eq!(trade.outcome(), Outcome::Breakeven);
    }

    #[test]
    fn test_date_serializes_as_plain_day() {
        let trade = sample_trade();
        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["date"], "2024-06-05");
        assert_eq!(json["direction"], "Long");
        // Absent extended fields stay out of the payload entirely.
        assert!(json.get("session").is_none());
    }

    fn sample_trade() -> Trade {
        Trade {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            instrument: "NQ100".to_string(),
            direction: Direction::Long,
            entry: 18000.0,
            exit: 18050.0,
            position: 1.0,
            pnl: 1050.0,
            tags: vec!["breakout".to_string()],
            session: None,
            timeframe: None,
            psychology: None,
            notes: None,
            risk: None,
            screenshots: None,
        }
    }
}
