//! Pure, deterministic aggregation over the trade collection: calendar
//! bucketing, dashboard statistics and report breakdowns. Everything here
//! is recomputed from scratch on demand; nothing is cached or patched
//! incrementally.

pub mod calendar;
pub mod dashboard;
pub mod reports;

pub use calendar::*;
pub use dashboard::*;
pub use reports::*;
