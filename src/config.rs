use std::env;
use std::time::Duration;

use crate::error::QueryError;
use crate::fetch::DEFAULT_BASE_URL;

const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const MANAGER_ID_ENV: &str = "FPL_MANAGER_ID";

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub bootstrap_ttl: Duration,
    pub fixtures_ttl: Duration,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

impl CacheConfig {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            bootstrap_ttl: ttl,
            fixtures_ttl: ttl,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Self {
        let shared = env_u64("FPL_CACHE_TTL_SECS").unwrap_or(DEFAULT_TTL_SECS);
        let bootstrap_ttl = env_u64("FPL_BOOTSTRAP_TTL_SECS").unwrap_or(shared);
        let fixtures_ttl = env_u64("FPL_FIXTURES_TTL_SECS").unwrap_or(shared);
        let base_url = env::var("FPL_BASE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = env_u64("FPL_HTTP_TIMEOUT_SECS")
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);

        Self {
            bootstrap_ttl: Duration::from_secs(bootstrap_ttl),
            fixtures_ttl: Duration::from_secs(fixtures_ttl),
            base_url,
            request_timeout: Duration::from_secs(timeout),
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
}

/// Explicit id first, then `FPL_MANAGER_ID`.
pub fn resolve_manager_id(explicit: Option<u32>) -> Result<u32, QueryError> {
    manager_id_from(explicit, env::var(MANAGER_ID_ENV).ok().as_deref())
}

pub fn manager_id_from(explicit: Option<u32>, env_value: Option<&str>) -> Result<u32, QueryError> {
    if let Some(id) = explicit.filter(|id| *id > 0) {
        return Ok(id);
    }
    let Some(raw) = env_value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Err(QueryError::MissingManagerId);
    };
    match raw.parse::<u32>() {
        Ok(0) => Err(QueryError::MissingManagerId),
        Ok(id) => Ok(id),
        Err(_) => Err(QueryError::InvalidManagerId(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::manager_id_from;
    use crate::error::QueryError;

    #[test]
    fn explicit_manager_id_wins_over_env() {
        assert_eq!(manager_id_from(Some(42), Some("7")), Ok(42));
        assert_eq!(manager_id_from(None, Some(" 7 ")), Ok(7));
        assert_eq!(manager_id_from(Some(0), Some("7")), Ok(7));
    }

    #[test]
    fn missing_or_garbled_manager_id_is_rejected() {
        assert_eq!(manager_id_from(None, None), Err(QueryError::MissingManagerId));
        assert_eq!(manager_id_from(None, Some("")), Err(QueryError::MissingManagerId));
        assert_eq!(
            manager_id_from(None, Some("abc")),
            Err(QueryError::InvalidManagerId("abc".to_string()))
        );
    }
}
