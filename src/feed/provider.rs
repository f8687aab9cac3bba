use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::model::Sport;

/// Typed failures at the feed boundary. Transport problems never cross
/// into the normalization engine; they surface here and stop.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid feed url: {0}")]
    Url(#[from] url::ParseError),

    /// The request was superseded by newer user action; callers discard
    /// this rather than surfacing it.
    #[error("request cancelled")]
    Cancelled,
}

impl FeedError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FeedError::Cancelled)
    }
}

/// Trait every feed backend must implement. All calls accept a
/// cancellation token; a cancelled call returns [`FeedError::Cancelled`]
/// promptly instead of running to completion.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Raw scoreboard events for a sport and date, already filtered to the
    /// requested calendar date.
    async fn scoreboard(
        &self,
        sport: Sport,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<Value>, FeedError>;

    /// Raw summary/boxscore document for one event.
    async fn summary(
        &self,
        sport: Sport,
        event_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, FeedError>;

    /// Raw standings document for a sport.
    async fn standings(&self, sport: Sport, cancel: &CancellationToken)
        -> Result<Value, FeedError>;

    /// Best-effort team document; `None` is a valid, non-error result.
    async fn team_info(
        &self,
        sport: Sport,
        team_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, FeedError>;

    /// Best-effort roster document.
    async fn roster(
        &self,
        sport: Sport,
        team_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, FeedError>;

    /// Best-effort schedule document.
    async fn schedule(
        &self,
        sport: Sport,
        team_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, FeedError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
