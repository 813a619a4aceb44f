use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::CacheError;
use crate::fetch::{DatasetKind, SnapshotFetcher};
use crate::index::IndexSet;

#[derive(Debug)]
pub struct Generation<I> {
    pub number: u64,
    pub fetched_at: Instant,
    pub fetched_at_utc: DateTime<Utc>,
    pub index: I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Fresh,
    Refreshed { generation: u64 },
    /// Fetch failed; the previous generation stays installed.
    ServedStale,
}

pub struct DatasetSlot<I> {
    ttl: Duration,
    fetcher: Arc<dyn SnapshotFetcher>,
    clock: Arc<dyn Clock>,
    refresh_lock: Mutex<()>,
    current: ArcSwapOption<Generation<I>>,
}

impl<I: IndexSet> DatasetSlot<I> {
    pub fn new(ttl: Duration, fetcher: Arc<dyn SnapshotFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            fetcher,
            clock,
            refresh_lock: Mutex::new(()),
            current: ArcSwapOption::empty(),
        }
    }

    pub fn kind(&self) -> DatasetKind {
        I::KIND
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn current(&self) -> Option<Arc<Generation<I>>> {
        self.current.load_full()
    }

    pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
        self.current.load_full().map(|g| g.fetched_at_utc)
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_for(self.ttl)
    }

    pub fn is_stale_for(&self, ttl: Duration) -> bool {
        let current = self.current.load();
        match &*current {
            None => true,
            Some(generation) => {
                self.clock
                    .now()
                    .saturating_duration_since(generation.fetched_at)
                    > ttl
            }
        }
    }

    pub fn ensure_loaded(&self) -> Result<RefreshOutcome, CacheError> {
        if !self.is_stale() {
            return Ok(RefreshOutcome::Fresh);
        }
        self.refresh(false)
    }

    pub fn refresh(&self, force: bool) -> Result<RefreshOutcome, CacheError> {
        let _guard = self
            .refresh_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !force && !self.is_stale() {
            debug!(dataset = %I::KIND, "snapshot refreshed by a concurrent caller");
            return Ok(RefreshOutcome::Fresh);
        }

        let previous = self.current.load_full();
        let built = self.fetcher.fetch(I::KIND).and_then(I::build);

        match built {
            Ok(index) => {
                let number = previous.as_ref().map_or(1, |g| g.number + 1);
                let records = index.record_count();
                self.current.store(Some(Arc::new(Generation {
                    number,
                    fetched_at: self.clock.now(),
                    fetched_at_utc: Utc::now(),
                    index,
                })));
                info!(dataset = %I::KIND, generation = number, records, "snapshot installed");
                Ok(RefreshOutcome::Refreshed { generation: number })
            }
            Err(err) => match previous {
                Some(stale) => {
                    warn!(
                        dataset = %I::KIND,
                        generation = stale.number,
                        error = %err,
                        "refresh failed, serving stale snapshot"
                    );
                    Ok(RefreshOutcome::ServedStale)
                }
                None => {
                    error!(dataset = %I::KIND, error = %err, "initial load failed");
                    Err(CacheError::ColdFetch {
                        kind: I::KIND,
                        source: err,
                    })
                }
            },
        }
    }
}
