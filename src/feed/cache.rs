//! Per-sport standings cache.
//!
//! Standings move slowly and the document is large, so it is cached for a
//! fixed five minutes per sport key. An entry is replaced wholesale on
//! refresh, never merged, and this cache is the only stateful piece of
//! the whole subsystem.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::model::Sport;

/// Fixed time-to-live for a cached standings document.
pub const STANDINGS_TTL: Duration = Duration::from_secs(5 * 60);

struct CachedStandings {
    data: Value,
    fetched_at: Instant,
}

/// Thread-safe standings cache keyed by sport.
#[derive(Clone)]
pub struct StandingsCache {
    inner: Arc<RwLock<HashMap<Sport, CachedStandings>>>,
    ttl: Duration,
}

impl StandingsCache {
    pub fn new() -> Self {
        Self::with_ttl(STANDINGS_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        StandingsCache {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// The cached document for a sport, when present and fresh.
    pub async fn get(&self, sport: Sport) -> Option<Value> {
        let inner = self.inner.read().await;
        let cached = inner.get(&sport)?;
        if cached.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        Some(cached.data.clone())
    }

    /// Replace the entry for a sport wholesale.
    pub async fn put(&self, sport: Sport, data: Value) {
        let mut inner = self.inner.write().await;
        inner.insert(
            sport,
            CachedStandings {
                data,
                fetched_at: Instant::now(),
            },
        );
        debug!("standings cached for {}", sport);
    }
}

impl Default for StandingsCache {
    fn default() -> Self {
        Self::new()
    }
}
