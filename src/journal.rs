use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::ai::{Insight, InsightError, InsightProvider};
use crate::export::{self, ExportError, ImportResult};
use crate::models::{PsychologyEntry, Trade};
use crate::stats::{
    self, CalendarData, DashboardStats, DrawdownPoint, EquityCurvePoint,
};
use crate::store::{LocalStorage, StoreError, TradeStore};

/// Storage keys for persisted state. One opaque JSON blob each.
pub const TRADES_KEY: &str = "trades";
pub const PSYCHOLOGY_KEY: &str = "psychologyJournal";
pub const AUTH_KEY: &str = "authToken";

/// Top-level application context: owns the trade store and the persisted
/// storage, and is passed by handle to every consumer. All mutations go
/// through store operations; derived views are recomputed on demand.
pub struct Journal {
    store: TradeStore,
    storage: LocalStorage,
}

impl Journal {
    /// Opens a journal over `data_dir`, restoring the persisted trade
    /// collection if one exists.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let storage = LocalStorage::new(data_dir).context("opening journal storage")?;

        let trades: Option<Vec<Trade>> = storage
            .get(TRADES_KEY)
            .context("reading persisted trades")?;
        let store = match trades {
            Some(trades) => {
                TradeStore::from_trades(trades).context("rebuilding trade store")?
            }
            None => TradeStore::new(),
        };

        log::info!("journal opened with {} trades", store.len());
        Ok(Journal { store, storage })
    }

    pub fn store(&self) -> &TradeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TradeStore {
        &mut self.store
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Persists the current trade collection. The store itself carries no
    /// durability contract; this is where it lives.
    pub fn save(&self) -> Result<()> {
        self.storage
            .set(TRADES_KEY, &self.store.list())
            .context("persisting trades")
    }

    // Derived views.

    pub fn calendar_month(&self, year: i32, month: u32) -> CalendarData {
        stats::calendar_month(self.store.list(), year, month)
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        stats::dashboard_stats(self.store.list())
    }

    pub fn equity_curve(&self) -> Vec<EquityCurvePoint> {
        stats::equity_curve(self.store.list())
    }

    pub fn drawdown_curve(&self) -> Vec<DrawdownPoint> {
        stats::drawdown_curve(self.store.list())
    }

    /// Most recent trades, newest first.
    pub fn recent_trades(&self, count: usize) -> &[Trade] {
        let trades = self.store.list();
        &trades[..trades.len().min(count)]
    }

    // CSV surface.

    pub fn export_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        export::write_trades_csv(writer, self.store.list())
    }

    /// Imports trades from CSV. Rows carrying an id that already exists are
    /// counted as duplicates and skipped; other bad rows are reported.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<ImportResult, ExportError> {
        let parsed = export::read_trades_csv(reader)?;

        let mut result = ImportResult {
            imported: 0,
            duplicates: 0,
            errors: parsed.errors,
        };
        for input in parsed.trades {
            match self.store.add(input) {
                Ok(_) => result.imported += 1,
                Err(StoreError::DuplicateId(_)) => result.duplicates += 1,
                Err(e) => result.errors.push(e.to_string()),
            }
        }

        log::info!(
            "CSV import: {} imported, {} duplicates, {} errors",
            result.imported,
            result.duplicates,
            result.errors.len()
        );
        Ok(result)
    }

    // Persisted side state.

    pub fn psychology_entries(&self) -> Result<Vec<PsychologyEntry>> {
        Ok(self
            .storage
            .get(PSYCHOLOGY_KEY)
            .context("reading psychology journal")?
            .unwrap_or_default())
    }

    pub fn save_psychology_entries(&self, entries: &[PsychologyEntry]) -> Result<()> {
        self.storage
            .set(PSYCHOLOGY_KEY, &entries)
            .context("persisting psychology journal")
    }

    pub fn is_authenticated(&self) -> bool {
        self.storage.contains(AUTH_KEY)
    }

    pub fn set_authenticated(&self, on: bool) -> Result<()> {
        if on {
            self.storage
                .set(AUTH_KEY, &"dummy-token")
                .context("persisting auth flag")?;
        } else {
            self.storage.remove(AUTH_KEY).context("clearing auth flag")?;
        }
        Ok(())
    }

    // AI insight.

    /// Requests an insight over the current trades. The returned insight is
    /// tagged with the store revision it was computed against; check it
    /// with [`Journal::insight_is_current`] before displaying.
    pub async fn request_insight<P: InsightProvider>(
        &self,
        provider: &P,
    ) -> Result<Insight, InsightError> {
        let revision = self.store.revision();
        let text = provider.generate_insight(self.store.list()).await?;
        Ok(Insight { text, revision })
    }

    /// Whether an insight still reflects the store it was requested from.
    /// A stale result must be disregarded, not applied.
    pub fn insight_is_current(&self, insight: &Insight) -> bool {
        insight.revision == self.store.revision()
    }
}
