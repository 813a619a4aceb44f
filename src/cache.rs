use std::sync::Arc;

use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::fetch::{HttpFetcher, SnapshotFetcher};
use crate::index::{BootstrapIndex, FixtureIndex};
use crate::slot::{DatasetSlot, Generation, RefreshOutcome};

pub type BootstrapView = Arc<Generation<BootstrapIndex>>;
pub type FixturesView = Arc<Generation<FixtureIndex>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub bootstrap: RefreshOutcome,
    pub fixtures: RefreshOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub players: usize,
    pub teams: usize,
    pub fixtures: usize,
}

// The two datasets refresh independently and may sit at different
// generations at any moment.
pub struct FplCache {
    pub(crate) bootstrap: DatasetSlot<BootstrapIndex>,
    pub(crate) fixtures: DatasetSlot<FixtureIndex>,
}

impl FplCache {
    pub fn from_config(config: &CacheConfig) -> Self {
        let fetcher = Arc::new(HttpFetcher::new(
            config.base_url.clone(),
            config.request_timeout,
        ));
        Self::new(config, fetcher)
    }

    pub fn new(config: &CacheConfig, fetcher: Arc<dyn SnapshotFetcher>) -> Self {
        Self::with_clock(config, fetcher, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &CacheConfig,
        fetcher: Arc<dyn SnapshotFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bootstrap: DatasetSlot::new(
                config.bootstrap_ttl,
                Arc::clone(&fetcher),
                Arc::clone(&clock),
            ),
            fixtures: DatasetSlot::new(config.fixtures_ttl, fetcher, clock),
        }
    }

    pub fn bootstrap_slot(&self) -> &DatasetSlot<BootstrapIndex> {
        &self.bootstrap
    }

    pub fn fixtures_slot(&self) -> &DatasetSlot<FixtureIndex> {
        &self.fixtures
    }

    pub fn ensure_loaded(&self) -> Result<LoadReport, CacheError> {
        let (bootstrap, fixtures) = rayon::join(
            || self.bootstrap.ensure_loaded(),
            || self.fixtures.ensure_loaded(),
        );
        Ok(LoadReport {
            bootstrap: bootstrap?,
            fixtures: fixtures?,
        })
    }

    pub fn refresh(&self, force: bool) -> Result<LoadReport, CacheError> {
        let (bootstrap, fixtures) = rayon::join(
            || self.bootstrap.refresh(force),
            || self.fixtures.refresh(force),
        );
        let report = LoadReport {
            bootstrap: bootstrap?,
            fixtures: fixtures?,
        };
        if force {
            let stats = self.stats();
            info!(
                players = stats.players,
                teams = stats.teams,
                fixtures = stats.fixtures,
                "forced refresh finished"
            );
        }
        Ok(report)
    }

    pub fn refresh_bootstrap(&self, force: bool) -> Result<RefreshOutcome, CacheError> {
        self.bootstrap.refresh(force)
    }

    pub fn refresh_fixtures(&self, force: bool) -> Result<RefreshOutcome, CacheError> {
        self.fixtures.refresh(force)
    }

    pub fn bootstrap_view(&self) -> Option<BootstrapView> {
        self.bootstrap.current()
    }

    pub fn fixtures_view(&self) -> Option<FixturesView> {
        self.fixtures.current()
    }

    pub fn stats(&self) -> CacheStats {
        let (players, teams) = self
            .bootstrap_view()
            .map(|g| (g.index.player_count(), g.index.team_count()))
            .unwrap_or_default();
        let fixtures = self.fixtures_view().map_or(0, |g| g.index.len());
        CacheStats {
            players,
            teams,
            fixtures,
        }
    }
}
