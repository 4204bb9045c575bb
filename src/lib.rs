pub mod ai;
pub mod export;
pub mod journal;
pub mod models;
pub mod stats;
pub mod store;

pub use ai::{GeminiClient, Insight, InsightError, InsightProvider};
pub use export::{ExportError, ImportResult};
pub use journal::Journal;
pub use models::{CreateTradeInput, Direction, Outcome, Trade, TradeFilters};
pub use stats::{CalendarData, DashboardStats, DayBucket, MonthSummary, WeekBucket};
pub use store::{LocalStorage, StorageError, StoreError, TradeStore};
