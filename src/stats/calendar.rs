use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Outcome, Trade};

/// Aggregated P&L, trade references and win rate for a single calendar
/// date. Derived, never stored; recomputed from scratch on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub total_pnl: f64,
    pub trade_ids: Vec<i64>,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
}

impl DayBucket {
    fn new(date: NaiveDate) -> Self {
        DayBucket {
            date,
            total_pnl: 0.0,
            trade_ids: Vec::new(),
            wins: 0,
            losses: 0,
            win_rate: 0.0,
        }
    }

    pub fn trades(&self) -> usize {
        self.trade_ids.len()
    }
}

/// One Sunday-to-Saturday calendar week of the displayed month. Weeks with
/// no trades are present with zeroed totals, not absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekBucket {
    /// 1-based position of the week within the month grid.
    pub week: u32,
    pub total_pnl: f64,
    pub trades: u32,
    pub win_rate: f64,
    pub trading_days: u32,
}

/// Best/worst day pointer. `date` is the sentinel `"N/A"` when the month
/// has no trades, so callers never see an unbounded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRef {
    pub date: String,
    pub pnl: f64,
}

impl DayRef {
    fn sentinel() -> Self {
        DayRef {
            date: "N/A".to_string(),
            pnl: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub total_pnl: f64,
    pub total_trades: u32,
    pub win_rate: f64,
    pub best_day: DayRef,
    pub worst_day: DayRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarData {
    pub daily: Vec<DayBucket>,
    pub weekly: Vec<WeekBucket>,
    pub monthly: MonthSummary,
}

impl CalendarData {
    fn empty() -> Self {
        CalendarData {
            daily: Vec::new(),
            weekly: Vec::new(),
            monthly: MonthSummary {
                total_pnl: 0.0,
                total_trades: 0,
                win_rate: 0.0,
                best_day: DayRef::sentinel(),
                worst_day: DayRef::sentinel(),
            },
        }
    }
}

/// Win rate as a percentage over trades with nonzero pnl. Breakeven trades
/// count toward trade totals but never toward this ratio; an empty
/// denominator yields 0, not NaN.
pub fn win_rate(wins: u32, losses: u32) -> f64 {
    let qualifying = wins + losses;
    if qualifying == 0 {
        0.0
    } else {
        (wins as f64 / qualifying as f64) * 100.0
    }
}

/// Groups trades by exact calendar date in a single pass, accumulating
/// totals and outcome counts.
pub fn bucket_by_day<'a, I>(trades: I) -> BTreeMap<NaiveDate, DayBucket>
where
    I: IntoIterator<Item = &'a Trade>,
{
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for trade in trades {
        let bucket = buckets
            .entry(trade.date)
            .or_insert_with(|| DayBucket::new(trade.date));
        bucket.total_pnl += trade.pnl;
        bucket.trade_ids.push(trade.id);
        match trade.outcome() {
            Outcome::Win => bucket.wins += 1,
            Outcome::Loss => bucket.losses += 1,
            Outcome::Breakeven => {}
        }
    }

    for bucket in buckets.values_mut() {
        bucket.win_rate = win_rate(bucket.wins, bucket.losses);
    }

    buckets
}

/// Derives the full calendar view for one Gregorian month (`month` is
/// 1-based). Trades outside the window stay bucketed but are excluded from
/// every rollup. Pure and idempotent: same inputs, same outputs.
pub fn calendar_month(trades: &[Trade], year: i32, month: u32) -> CalendarData {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return CalendarData::empty();
    };
    let days = days_in_month(first);

    // Week boundaries are fixed by the calendar: the grid starts on the
    // Sunday column, with the first and last weeks partially filled.
    let offset = first.weekday().num_days_from_sunday();
    let week_count = ((offset + days) as usize).div_ceil(7);

    let buckets = bucket_by_day(trades);
    let daily: Vec<DayBucket> = buckets
        .into_values()
        .filter(|b| b.date.year() == year && b.date.month() == month)
        .collect();

    let mut weekly: Vec<WeekBucket> = (1..=week_count as u32)
        .map(|week| WeekBucket {
            week,
            total_pnl: 0.0,
            trades: 0,
            win_rate: 0.0,
            trading_days: 0,
        })
        .collect();
    let mut week_outcomes = vec![(0u32, 0u32); week_count];

    let mut total_pnl = 0.0;
    let mut total_trades = 0u32;
    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut best: Option<&DayBucket> = None;
    let mut worst: Option<&DayBucket> = None;

    for bucket in &daily {
        let idx = ((offset + bucket.date.day() - 1) / 7) as usize;
        let week = &mut weekly[idx];
        week.total_pnl += bucket.total_pnl;
        week.trades += bucket.trades() as u32;
        week.trading_days += 1;
        week_outcomes[idx].0 += bucket.wins;
        week_outcomes[idx].1 += bucket.losses;

        total_pnl += bucket.total_pnl;
        total_trades += bucket.trades() as u32;
        wins += bucket.wins;
        losses += bucket.losses;

        // Strict comparisons keep the first occurrence in date order on ties.
        if best.is_none_or(|b| bucket.total_pnl > b.total_pnl) {
            best = Some(bucket);
        }
        if worst.is_none_or(|w| bucket.total_pnl < w.total_pnl) {
            worst = Some(bucket);
        }
    }

    for (week, &(w, l)) in weekly.iter_mut().zip(&week_outcomes) {
        week.win_rate = win_rate(w, l);
    }

    let day_ref = |bucket: Option<&DayBucket>| {
        bucket.map_or_else(DayRef::sentinel, |b| DayRef {
            date: b.date.format("%Y-%m-%d").to_string(),
            pnl: b.total_pnl,
        })
    };

    let monthly = MonthSummary {
        total_pnl,
        total_trades,
        win_rate: win_rate(wins, losses),
        best_day: day_ref(best),
        worst_day: day_ref(worst),
    };

    CalendarData {
        daily,
        weekly,
        monthly,
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    // First of the month always exists, so the unwrap branch is unreachable.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|next| next.signed_duration_since(first).num_days() as u32)
        .unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;

    fn trade(id: i64, date: &str, pnl: f64) -> Trade {
        Trade {
            id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            instrument: "NQ100".to_string(),
            direction: Direction::Long,
            entry: 0.0,
            exit: 0.0,
            position: 1.0,
            pnl,
            tags: vec![],
            session: None,
            timeframe: None,
            psychology: None,
            notes: None,
            risk: None,
            screenshots: None,
        }
    }

    #[test]
    fn test_june_2024_scenario() {
        let trades = vec![
            trade(1, "2024-06-05", 1050.0),
            trade(2, "2024-06-13", -638.0),
            trade(3, "2024-06-20", 1180.0),
        ];
        let data = calendar_month(&trades, 2024, 6);

        assert_eq!(data.monthly.total_pnl, 1592.0);
        assert_eq!(data.monthly.total_trades, 3);
        assert_eq!(data.monthly.best_day.date, "2024-06-20");
        assert_eq!(data.monthly.best_day.pnl, 1180.0);
        assert_eq!(data.monthly.worst_day.date, "2024-06-13");
        assert_eq!(data.monthly.worst_day.pnl, -638.0);

        // June 2024 starts on a Saturday: six calendar weeks in the grid,
        // all present even when empty.
        assert_eq!(data.weekly.len(), 6);
        assert_eq!(data.weekly[1].total_pnl, 1050.0);
        assert_eq!(data.weekly[2].total_pnl, -638.0);
        assert_eq!(data.weekly[3].total_pnl, 1180.0);
        assert_eq!(data.weekly[0].trades, 0);
        assert_eq!(data.weekly[5].trades, 0);
    }

    #[test]
    fn test_daily_totals_sum_to_month_total() {
        let trades = vec![
            trade(1, "2024-06-05", 1050.0),
            trade(2, "2024-06-05", -12.5),
            trade(3, "2024-06-13", -638.0),
            trade(4, "2024-06-20", 1180.0),
            trade(5, "2024-07-01", 999.0),
        ];
        let data = calendar_month(&trades, 2024, 6);

        let day_sum: f64 = data.daily.iter().map(|d| d.total_pnl).sum();
        assert!((day_sum - data.monthly.total_pnl).abs() < 1e-9);
        let week_sum: f64 = data.weekly.iter().map(|w| w.total_pnl).sum();
        assert!((week_sum - data.monthly.total_pnl).abs() < 1e-9);
    }

    #[test]
    fn test_trade_outside_month_excluded_from_rollups() {
        let trades = vec![trade(1, "2024-06-30", 100.0), trade(2, "2024-07-01", 50.0)];

        let june = calendar_month(&trades, 2024, 6);
        assert_eq!(june.monthly.total_trades, 1);
        assert_eq!(june.monthly.total_pnl, 100.0);

        let july = calendar_month(&trades, 2024, 7);
        assert_eq!(july.monthly.total_trades, 1);
        assert_eq!(july.monthly.total_pnl, 50.0);
        // Still bucketed though: the full map holds both dates.
        assert_eq!(bucket_by_day(&trades).len(), 2);
    }

    #[test]
    fn test_sunday_starts_a_new_week() {
        // 2024-06-01 is a Saturday, 2024-06-02 the following Sunday.
        let trades = vec![trade(1, "2024-06-01", 10.0), trade(2, "2024-06-02", 20.0)];
        let data = calendar_month(&trades, 2024, 6);

        assert_eq!(data.weekly[0].total_pnl, 10.0);
        assert_eq!(data.weekly[1].total_pnl, 20.0);
    }

    #[test]
    fn test_empty_month_reports_sentinel_day() {
        let data = calendar_month(&[], 2024, 6);
        assert_eq!(data.monthly.best_day.date, "N/A");
        assert_eq!(data.monthly.best_day.pnl, 0.0);
        assert_eq!(data.monthly.worst_day.date, "N/A");
        assert_eq!(data.monthly.win_rate, 0.0);
        assert_eq!(data.weekly.len(), 6);
        assert!(data.weekly.iter().all(|w| w.trades == 0));
    }

    #[test]
    fn test_breakeven_counts_toward_totals_not_win_rate() {
        let trades = vec![
            trade(1, "2024-06-05", 100.0),
            trade(2, "2024-06-05", 0.0),
            trade(3, "2024-06-06", -50.0),
        ];
        let data = calendar_month(&trades, 2024, 6);

        assert_eq!(data.monthly.total_trades, 3);
        // One win over two nonzero-pnl trades.
        assert_eq!(data.monthly.win_rate, 50.0);

        let breakeven_only = vec![trade(1, "2024-06-05", 0.0)];
        let data = calendar_month(&breakeven_only, 2024, 6);
        assert_eq!(data.monthly.total_trades, 1);
        assert_eq!(data.monthly.win_rate, 0.0);
    }

    #[test]
    fn test_win_rate_within_bounds() {
        let trades = vec![
            trade(1, "2024-06-03", 10.0),
            trade(2, "2024-06-03", 20.0),
            trade(3, "2024-06-04", -5.0),
        ];
        let data = calendar_month(&trades, 2024, 6);
        for day in &data.daily {
            assert!(day.win_rate >= 0.0 && day.win_rate <= 100.0);
        }
        assert!(data.monthly.win_rate >= 0.0 && data.monthly.win_rate <= 100.0);
    }

    #[test]
    fn test_best_day_tie_broken_by_first_date() {
        let trades = vec![trade(1, "2024-06-10", 500.0), trade(2, "2024-06-12", 500.0)];
        let data = calendar_month(&trades, 2024, 6);
        assert_eq!(data.monthly.best_day.date, "2024-06-10");
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let trades = vec![
            trade(1, "2024-06-05", 1050.0),
            trade(2, "2024-06-13", -638.0),
            trade(3, "2024-06-20", 1180.0),
        ];
        let first = calendar_month(&trades, 2024, 6);
        let second = calendar_month(&trades, 2024, 6);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_month_yields_empty_view() {
        let trades = vec![trade(1, "2024-06-05", 10.0)];
        let data = calendar_month(&trades, 2024, 13);
        assert!(data.daily.is_empty());
        assert!(data.weekly.is_empty());
        assert_eq!(data.monthly.best_day.date, "N/A");
    }

    #[test]
    fn test_day_bucket_win_rate_ignores_breakeven() {
        let trades = vec![
            trade(1, "2024-06-05", 100.0),
            trade(2, "2024-06-05", 0.0),
            trade(3, "2024-06-05", 0.0),
        ];
        let buckets = bucket_by_day(&trades);
        let day = &buckets[&NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()];
        assert_eq!(day.trades(), 3);
        assert_eq!(day.win_rate, 100.0);
    }
}
