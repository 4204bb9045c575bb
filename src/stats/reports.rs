use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::models::{Outcome, Trade};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentPnl {
    pub instrument: String,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPnl {
    pub weekday: String,
    pub pnl: f64,
    pub trades: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinLossDistribution {
    pub wins: u32,
    pub losses: u32,
    pub breakevens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPnl {
    pub session: String,
    pub pnl: f64,
}

/// Total P&L per instrument, alphabetical.
pub fn pnl_by_instrument(trades: &[Trade]) -> Vec<InstrumentPnl> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for trade in trades {
        *totals.entry(trade.instrument.as_str()).or_insert(0.0) += trade.pnl;
    }
    totals
        .into_iter()
        .map(|(instrument, pnl)| InstrumentPnl {
            instrument: instrument.to_string(),
            pnl,
        })
        .collect()
}

/// Total P&L per day of week, Sunday through Saturday, zeros filled so the
/// chart always has seven bars.
pub fn pnl_by_weekday(trades: &[Trade]) -> Vec<WeekdayPnl> {
    let mut totals = [(0.0f64, 0u32); 7];
    for trade in trades {
        let idx = trade.date.weekday().num_days_from_sunday() as usize;
        totals[idx].0 += trade.pnl;
        totals[idx].1 += 1;
    }
    WEEKDAYS
        .iter()
        .zip(totals)
        .map(|(weekday, (pnl, trades))| WeekdayPnl {
            weekday: weekday.to_string(),
            pnl,
            trades,
        })
        .collect()
}

pub fn win_loss_distribution(trades: &[Trade]) -> WinLossDistribution {
    let mut dist = WinLossDistribution {
        wins: 0,
        losses: 0,
        breakevens: 0,
    };
    for trade in trades {
        match trade.outcome() {
            Outcome::Win => dist.wins += 1,
            Outcome::Loss => dist.losses += 1,
            Outcome::Breakeven => dist.breakevens += 1,
        }
    }
    dist
}

/// Running P&L per trade in date order (stable within a day, so ties keep
/// their relative order).
pub fn cumulative_pnl(trades: &[Trade]) -> Vec<f64> {
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.date);

    let mut running = 0.0;
    ordered
        .iter()
        .map(|t| {
            running += t.pnl;
            running
        })
        .collect()
}

/// The session with the highest total P&L, skipping trades that carry no
/// session label. Ties keep the first session encountered.
pub fn best_session(trades: &[Trade]) -> Option<SessionPnl> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for trade in trades {
        let Some(session) = &trade.session else {
            continue;
        };
        match totals.iter_mut().find(|(name, _)| name == session) {
            Some((_, pnl)) => *pnl += trade.pnl,
            None => totals.push((session.clone(), trade.pnl)),
        }
    }

    let mut best: Option<(String, f64)> = None;
    for (session, pnl) in totals {
        if best.as_ref().is_none_or(|(_, b)| pnl > *b) {
            best = Some((session, pnl));
        }
    }
    best.map(|(session, pnl)| SessionPnl { session, pnl })
}

/// The least profitable day of week among those actually traded.
pub fn worst_weekday(trades: &[Trade]) -> Option<WeekdayPnl> {
    pnl_by_weekday(trades)
        .into_iter()
        .filter(|d| d.trades > 0)
        .min_by(|a, b| a.pnl.total_cmp(&b.pnl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use chrono::NaiveDate;

    fn trade(id: i64, date: &str, instrument: &str, pnl: f64, session: Option<&str>) -> Trade {
        Trade {
            id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            instrument: instrument.to_string(),
            direction: Direction::Long,
            entry: 0.0,
            exit: 0.0,
            position: 1.0,
            pnl,
            tags: vec![],
            session: session.map(str::to_string),
            timeframe: None,
            psychology: None,
            notes: None,
            risk: None,
            screenshots: None,
        }
    }

    #[test]
    fn test_pnl_by_instrument_groups_and_sums() {
        let trades = vec![
            trade(1, "2024-06-05", "NQ100", 100.0, None),
            trade(2, "2024-06-06", "EUR/USD", -40.0, None),
            trade(3, "2024-06-07", "NQ100", 25.0, None),
        ];
        let report = pnl_by_instrument(&trades);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].instrument, "EUR/USD");
        assert_eq!(report[0].pnl, -40.0);
        assert_eq!(report[1].instrument, "NQ100");
        assert_eq!(report[1].pnl, 125.0);
    }

    #[test]
    fn test_pnl_by_weekday_fills_all_seven_days() {
        // 2024-06-05 is a Wednesday.
        let trades = vec![trade(1, "2024-06-05", "NQ100", 77.0, None)];
        let report = pnl_by_weekday(&trades);
        assert_eq!(report.len(), 7);
        assert_eq!(report[0].weekday, "Sun");
        assert_eq!(report[3].weekday, "Wed");
        assert_eq!(report[3].pnl, 77.0);
        assert_eq!(report[3].trades, 1);
        assert_eq!(report[4].pnl, 0.0);
    }

    #[test]
    fn test_cumulative_pnl_sorted_by_date() {
        let trades = vec![
            trade(2, "2024-06-13", "NQ100", -638.0, None),
            trade(1, "2024-06-05", "NQ100", 1050.0, None),
            trade(3, "2024-06-20", "NQ100", 1180.0, None),
        ];
        assert_eq!(cumulative_pnl(&trades), vec![1050.0, 412.0, 1592.0]);
    }

    #[test]
    fn test_best_session_skips_unlabeled_trades() {
        let trades = vec![
            trade(1, "2024-06-05", "NQ100", 500.0, Some("London")),
            trade(2, "2024-06-06", "NQ100", 300.0, Some("New York")),
            trade(3, "2024-06-07", "NQ100", 400.0, Some("New York")),
            trade(4, "2024-06-08", "NQ100", 9999.0, None),
        ];
        let best = best_session(&trades).unwrap();
        assert_eq!(best.session, "New York");
        assert_eq!(best.pnl, 700.0);

        assert!(best_session(&[trade(1, "2024-06-05", "NQ100", 1.0, None)]).is_none());
    }

    #[test]
    fn test_worst_weekday_ignores_untraded_days() {
        let trades = vec![
            trade(1, "2024-06-05", "NQ100", -200.0, None), // Wed
            trade(2, "2024-06-06", "NQ100", 100.0, None),  // Thu
        ];
        let worst = worst_weekday(&trades).unwrap();
        assert_eq!(worst.weekday, "Wed");
        assert_eq!(worst.pnl, -200.0);

        assert!(worst_weekday(&[]).is_none());
    }

    #[test]
    fn test_win_loss_distribution() {
        let trades = vec![
            trade(1, "2024-06-05", "NQ100", 10.0, None),
            trade(2, "2024-06-06", "NQ100", -10.0, None),
            trade(3, "2024-06-07", "NQ100", 0.0, None),
        ];
        let dist = win_loss_distribution(&trades);
        assert_eq!(dist.wins, 1);
        assert_eq!(dist.losses, 1);
        assert_eq!(dist.breakevens, 1);
    }
}
