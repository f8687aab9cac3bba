pub mod cache;
pub mod espn;
pub mod provider;

pub use cache::{StandingsCache, STANDINGS_TTL};
pub use espn::EspnFeed;
pub use provider::{FeedClient, FeedError};

use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::engine::{normalize_event, sort_games};
use crate::model::{Game, Sport};

/// Fetch one sport's scoreboard and normalize it to canonical games.
/// Placeholder events drop out here.
pub async fn scoreboard_games(
    feed: &dyn FeedClient,
    sport: Sport,
    date: NaiveDate,
    cancel: &CancellationToken,
) -> Result<Vec<Game>, FeedError> {
    let events = feed.scoreboard(sport, date, cancel).await?;
    Ok(events
        .iter()
        .filter_map(|event| normalize_event(event, sport))
        .collect())
}

/// Fetch several sports' scoreboards concurrently and keep whatever
/// succeeded: one sport's feed failing must not cost the others their
/// games. Cancellation is not an error, just an empty result.
pub async fn fetch_scoreboards(
    feed: &dyn FeedClient,
    sports: &[Sport],
    date: NaiveDate,
    cancel: &CancellationToken,
) -> Vec<Game> {
    let fetches = sports.iter().map(|&sport| async move {
        (sport, scoreboard_games(feed, sport, date, cancel).await)
    });
    let results = futures_util::future::join_all(fetches).await;

    let mut games = Vec::new();
    for (sport, result) in results {
        match result {
            Ok(sport_games) => games.extend(sport_games),
            Err(err) if err.is_cancelled() => {}
            Err(err) => warn!("unable to load scores for {}: {}", sport, err),
        }
    }
    sort_games(&mut games);
    games
}

/// Standings document for a sport, via the cache: a fresh cached copy is
/// returned as-is, otherwise the feed is queried and the cache entry
/// replaced.
pub async fn standings_for(
    feed: &dyn FeedClient,
    cache: &StandingsCache,
    sport: Sport,
    cancel: &CancellationToken,
) -> Result<Value, FeedError> {
    if let Some(cached) = cache.get(sport).await {
        return Ok(cached);
    }
    let doc = feed.standings(sport, cancel).await?;
    cache.put(sport, doc.clone()).await;
    Ok(doc)
}

/// Serializes a sequence of detail fetches: beginning a new request
/// cancels the previous one's token, so a stale response resolves as
/// [`FeedError::Cancelled`] and can never overwrite newer state.
pub struct RequestSlot {
    current: Mutex<CancellationToken>,
}

impl RequestSlot {
    pub fn new() -> Self {
        RequestSlot {
            current: Mutex::new(CancellationToken::new()),
        }
    }

    /// Cancel any in-flight request and issue the token for the new one.
    pub fn begin(&self) -> CancellationToken {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        current.cancel();
        *current = CancellationToken::new();
        current.clone()
    }
}

impl Default for RequestSlot {
    fn default() -> Self {
        Self::new()
    }
}
