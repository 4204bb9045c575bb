pub mod local;
pub mod trades;

pub use local::{LocalStorage, StorageError};
pub use trades::{StoreError, TradeStore};
