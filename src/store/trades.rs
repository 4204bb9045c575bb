use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::models::{CreateTradeInput, Trade, TradeFilters};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("trade not found: {0}")]
    NotFound(i64),

    #[error("trade id already exists: {0}")]
    DuplicateId(i64),

    #[error("invalid trade date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// The authoritative in-memory trade collection for the session, newest
/// first. Durability is an external concern (see `Journal`); the store
/// itself never touches disk.
///
/// Ids are unique at all times: time-based for fresh trades, bumped past
/// any explicitly supplied id so later allocations cannot collide.
pub struct TradeStore {
    trades: Vec<Trade>,
    next_id: i64,
    revision: u64,
}

impl TradeStore {
    pub fn new() -> Self {
        TradeStore {
            trades: Vec::new(),
            next_id: Utc::now().timestamp_millis(),
            revision: 0,
        }
    }

    /// Rebuilds a store from persisted records, enforcing id uniqueness.
    pub fn from_trades(trades: Vec<Trade>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        let mut max_id = 0;
        for trade in &trades {
            if !seen.insert(trade.id) {
                return Err(StoreError::DuplicateId(trade.id));
            }
            max_id = max_id.max(trade.id);
        }

        Ok(TradeStore {
            trades,
            next_id: Utc::now().timestamp_millis().max(max_id),
            revision: 0,
        })
    }

    /// Adds a trade and returns the stored record. A zero input id gets a
    /// fresh unique one; a supplied nonzero id that collides is rejected.
    /// Non-finite numeric fields are normalized to zero so aggregation
    /// totals stay well-defined.
    pub fn add(&mut self, input: CreateTradeInput) -> Result<&Trade, StoreError> {
        let date = parse_date(&input.date)?;

        let id = if input.id == 0 {
            self.allocate_id()
        } else {
            if self.trades.iter().any(|t| t.id == input.id) {
                return Err(StoreError::DuplicateId(input.id));
            }
            self.next_id = self.next_id.max(input.id);
            input.id
        };

        let trade = materialize(id, date, input);
        log::debug!("add trade id={} date={} pnl={}", trade.id, trade.date, trade.pnl);

        self.trades.insert(0, trade);
        self.revision += 1;
        Ok(&self.trades[0])
    }

    /// Replaces the record matching `id`, retaining the id. An absent id is
    /// a `NotFound` error, never a silent no-op: an edit must not vanish.
    pub fn update(&mut self, id: i64, input: CreateTradeInput) -> Result<&Trade, StoreError> {
        let date = parse_date(&input.date)?;

        let pos = self
            .trades
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;

        self.trades[pos] = materialize(id, date, input);
        self.revision += 1;
        Ok(&self.trades[pos])
    }

    /// Removes and returns the record matching `id`. An absent id is a
    /// `NotFound` error and the collection is untouched.
    pub fn delete(&mut self, id: i64) -> Result<Trade, StoreError> {
        let pos = self
            .trades
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;

        self.revision += 1;
        Ok(self.trades.remove(pos))
    }

    pub fn get(&self, id: i64) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == id)
    }

    /// Current collection, insertion order (newest first).
    pub fn list(&self) -> &[Trade] {
        &self.trades
    }

    pub fn list_filtered(&self, filters: &TradeFilters) -> Vec<&Trade> {
        let matches = self.trades.iter().filter(|t| {
            if let Some(ref instrument) = filters.instrument {
                if !t.instrument.contains(instrument.as_str()) {
                    return false;
                }
            }
            if let Some(direction) = filters.direction {
                if t.direction != direction {
                    return false;
                }
            }
            if let Some(ref tag) = filters.tag {
                if !t.tags.iter().any(|candidate| candidate == tag) {
                    return false;
                }
            }
            if let Some(start) = filters.start_date {
                if t.date < start {
                    return false;
                }
            }
            if let Some(end) = filters.end_date {
                if t.date > end {
                    return false;
                }
            }
            true
        });

        match (filters.page, filters.limit) {
            (Some(page), Some(limit)) => {
                let offset = page.saturating_sub(1) * limit;
                matches.skip(offset).take(limit).collect()
            }
            _ => matches.collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Bumped on every successful mutation; consumers compare revisions to
    /// discard results computed against an older snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn allocate_id(&mut self) -> i64 {
        let mut id = Utc::now().timestamp_millis();
        if id <= self.next_id {
            id = self.next_id + 1;
        }
        self.next_id = id;
        id
    }
}

impl Default for TradeStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| StoreError::InvalidDate(raw.to_string()))
}

fn materialize(id: i64, date: NaiveDate, input: CreateTradeInput) -> Trade {
    Trade {
        id,
        date,
        instrument: input.instrument,
        direction: input.direction,
        entry: finite_or_zero(input.entry),
        exit: finite_or_zero(input.exit),
        position: finite_or_zero(input.position),
        pnl: finite_or_zero(input.pnl),
        tags: input.tags,
        session: input.session,
        timeframe: input.timeframe,
        psychology: input.psychology,
        notes: input.notes,
        risk: input.risk.map(finite_or_zero),
        screenshots: input.screenshots,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
