use serde::{Deserialize, Serialize};

use crate::models::{Outcome, Trade};
use crate::stats::calendar::{bucket_by_day, win_rate};

/// Top-line summary statistics over the whole trade collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_trades: u32,
    pub wins: u32,
    pub losses: u32,
    pub breakevens: u32,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurvePoint {
    pub date: String,
    pub cumulative_pnl: f64,
    pub daily_pnl: f64,
    pub trade_count: u32,
}

/// One point of the drawdown curve: distance of the cumulative equity from
/// its running peak, never positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub date: String,
    pub value: f64,
}

pub fn dashboard_stats(trades: &[Trade]) -> DashboardStats {
    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut breakevens = 0u32;
    let mut total_pnl = 0.0;
    let mut gross_profit = 0.0;
    let mut gross_loss = 0.0;
    let mut best_trade = 0.0f64;
    let mut worst_trade = 0.0f64;

    for trade in trades {
        total_pnl += trade.pnl;
        match trade.outcome() {
            Outcome::Win => {
                wins += 1;
                gross_profit += trade.pnl;
            }
            Outcome::Loss => {
                losses += 1;
                gross_loss += trade.pnl.abs();
            }
            Outcome::Breakeven => breakevens += 1,
        }
        best_trade = best_trade.max(trade.pnl);
        worst_trade = worst_trade.min(trade.pnl);
    }

    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    DashboardStats {
        total_trades: trades.len() as u32,
        wins,
        losses,
        breakevens,
        win_rate: win_rate(wins, losses),
        total_pnl,
        gross_profit,
        gross_loss,
        profit_factor,
        best_trade,
        worst_trade,
        avg_win: if wins > 0 {
            gross_profit / wins as f64
        } else {
            0.0
        },
        avg_loss: if losses > 0 {
            gross_loss / losses as f64
        } else {
            0.0
        },
    }
}

/// Per-day and cumulative P&L in date order.
pub fn equity_curve(trades: &[Trade]) -> Vec<EquityCurvePoint> {
    let mut cumulative_pnl = 0.0;
    bucket_by_day(trades)
        .into_values()
        .map(|day| {
            cumulative_pnl += day.total_pnl;
            EquityCurvePoint {
                date: day.date.format("%Y-%m-%d").to_string(),
                cumulative_pnl,
                daily_pnl: day.total_pnl,
                trade_count: day.trades() as u32,
            }
        })
        .collect()
}

pub fn drawdown_curve(trades: &[Trade]) -> Vec<DrawdownPoint> {
    let mut peak = 0.0f64;
    equity_curve(trades)
        .into_iter()
        .map(|point| {
            peak = peak.max(point.cumulative_pnl);
            DrawdownPoint {
                date: point.date,
                value: point.cumulative_pnl - peak,
            }
        })
        .collect()
}
