use thiserror::Error;

use crate::fetch::DatasetKind;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("http {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("malformed {kind} payload: {source}")]
    Malformed {
        kind: DatasetKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("empty {0} payload")]
    Empty(DatasetKind),

    #[error("malformed manager picks payload: {0}")]
    MalformedPicks(#[source] serde_json::Error),

    #[error("empty manager picks payload")]
    EmptyPicks,

    #[error("fetcher returned a {got} payload for a {expected} request")]
    WrongPayload {
        expected: DatasetKind,
        got: DatasetKind,
    },
}

/// Refresh failure that could not be absorbed by serving a stale snapshot.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("{kind} dataset unavailable and nothing cached: {source}")]
    ColdFetch {
        kind: DatasetKind,
        #[source]
        source: FetchError,
    },
}

impl CacheError {
    pub fn kind(&self) -> DatasetKind {
        match self {
            CacheError::ColdFetch { kind, .. } => *kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unsupported {option} '{value}' (valid: {valid})")]
    UnsupportedOption {
        option: &'static str,
        value: String,
        valid: &'static str,
    },

    #[error("no team matches '{0}'")]
    UnknownTeam(String),

    #[error("too many players to compare: {given} (max {max})")]
    TooManyPlayers { given: usize, max: usize },

    #[error("FPL_MANAGER_ID must be numeric, got: {0}")]
    InvalidManagerId(String),

    #[error("no manager id: pass one or set FPL_MANAGER_ID")]
    MissingManagerId,

    #[error("current gameweek could not be determined")]
    NoCurrentGameweek,
}
