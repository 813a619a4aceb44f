use std::fmt;
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use tracing::debug;

use crate::error::FetchError;
use crate::http_client::build_client;
use crate::model::{Bootstrap, Fixture, ManagerPicks};

pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Bootstrap,
    Fixtures,
}

impl DatasetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::Bootstrap => "bootstrap",
            DatasetKind::Fixtures => "fixtures",
        }
    }

    fn path(self) -> &'static str {
        match self {
            DatasetKind::Bootstrap => "bootstrap-static/",
            DatasetKind::Fixtures => "fixtures/",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    Bootstrap(Bootstrap),
    Fixtures(Vec<Fixture>),
}

impl Payload {
    pub fn kind(&self) -> DatasetKind {
        match self {
            Payload::Bootstrap(_) => DatasetKind::Bootstrap,
            Payload::Fixtures(_) => DatasetKind::Fixtures,
        }
    }
}

pub trait SnapshotFetcher: Send + Sync {
    fn fetch(&self, kind: DatasetKind) -> Result<Payload, FetchError>;
}

pub struct HttpFetcher {
    base_url: String,
    timeout: Duration,
    client: OnceCell<Client>,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client, FetchError> {
        self.client.get_or_try_init(|| build_client(self.timeout))
    }

    fn get_body(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client()?
            .get(url)
            .send()
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }

    // Picks bypass the cache.
    pub fn fetch_manager_picks(
        &self,
        manager_id: u32,
        gameweek: u32,
    ) -> Result<ManagerPicks, FetchError> {
        let url = format!(
            "{}/entry/{manager_id}/event/{gameweek}/picks/",
            self.base_url
        );
        debug!(%url, manager_id, gameweek, "fetching manager picks");
        let body = self.get_body(&url)?;
        parse_picks_json(&body)
    }
}

impl SnapshotFetcher for HttpFetcher {
    fn fetch(&self, kind: DatasetKind) -> Result<Payload, FetchError> {
        let url = format!("{}/{}", self.base_url, kind.path());
        debug!(%url, "fetching snapshot");
        let body = self.get_body(&url)?;
        match kind {
            DatasetKind::Bootstrap => parse_bootstrap_json(&body).map(Payload::Bootstrap),
            DatasetKind::Fixtures => parse_fixtures_json(&body).map(Payload::Fixtures),
        }
    }
}

pub fn parse_bootstrap_json(raw: &str) -> Result<Bootstrap, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FetchError::Empty(DatasetKind::Bootstrap));
    }
    serde_json::from_str(trimmed).map_err(|source| FetchError::Malformed {
        kind: DatasetKind::Bootstrap,
        source,
    })
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FetchError::Empty(DatasetKind::Fixtures));
    }
    serde_json::from_str(trimmed).map_err(|source| FetchError::Malformed {
        kind: DatasetKind::Fixtures,
        source,
    })
}

pub fn parse_picks_json(raw: &str) -> Result<ManagerPicks, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FetchError::EmptyPicks);
    }
    serde_json::from_str(trimmed).map_err(FetchError::MalformedPicks)
}
