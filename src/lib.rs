pub mod analysis;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod http_client;
pub mod index;
pub mod model;
pub mod query;
pub mod slot;

pub use cache::{CacheStats, FplCache, LoadReport};
pub use config::CacheConfig;
pub use error::{CacheError, FetchError, QueryError};
pub use fetch::{DatasetKind, HttpFetcher, Payload, SnapshotFetcher};
pub use slot::{DatasetSlot, RefreshOutcome};
