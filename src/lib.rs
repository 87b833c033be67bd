// GroceryTracker - household grocery ledger with pluggable key-value persistence

pub mod config;
pub mod error;
pub mod fields;
pub mod file_store;
pub mod filter;
pub mod ledger;
pub mod models;
pub mod share;
pub mod sqlite_store;
pub mod storage;
pub mod summary;
pub mod voice;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use error::LedgerError;
pub use fields::{Defaults, ItemFields};
pub use file_store::FileStore;
pub use filter::{Field, FieldValue, Filter, FilterOp};
pub use ledger::{Ledger, Snapshot};
pub use models::{Item, Status, Unit, now_ms};
pub use sqlite_store::SqliteStore;
pub use storage::{DEFAULT_STORAGE_KEY, MemoryStorage, Storage};
pub use summary::Totals;
