use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::provider::{FeedClient, FeedError};
use crate::model::Sport;

const DEFAULT_BASE_URL: &str = "https://site.api.espn.com/apis/";

/// Feed backend for ESPN's public site API.
pub struct EspnFeed {
    http: Client,
    /// Base URL, overridable for tests.
    base: Url,
}

impl EspnFeed {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let base = Url::parse(base_url.unwrap_or(DEFAULT_BASE_URL))
            .context("Invalid feed base URL")?;
        Ok(EspnFeed { http, base })
    }

    fn scoreboard_url(&self, sport: Sport, date: NaiveDate) -> Result<Url, FeedError> {
        let mut url = self
            .base
            .join(&format!("site/v2/sports/{}/scoreboard", sport.path()))?;
        url.query_pairs_mut()
            .append_pair("dates", &date.format("%Y%m%d").to_string());
        // The college basketball scoreboard returns a tiny subset unless
        // asked for the full Division I slate.
        if sport == Sport::CollegeBasketball {
            url.query_pairs_mut()
                .append_pair("limit", "200")
                .append_pair("groups", "50");
        }
        Ok(url)
    }

    fn summary_url(&self, sport: Sport, event_id: &str) -> Result<Url, FeedError> {
        let mut url = self
            .base
            .join(&format!("site/v2/sports/{}/summary", sport.path()))?;
        url.query_pairs_mut().append_pair("event", event_id);
        Ok(url)
    }

    fn standings_url(&self, sport: Sport) -> Result<Url, FeedError> {
        Ok(self
            .base
            .join(&format!("v2/sports/{}/standings", sport.path()))?)
    }

    fn team_url(&self, sport: Sport, team_id: &str, suffix: &str) -> Result<Url, FeedError> {
        Ok(self.base.join(&format!(
            "site/v2/sports/{}/teams/{}{}",
            sport.path(),
            team_id,
            suffix
        ))?)
    }

    async fn get_json(&self, url: Url, cancel: &CancellationToken) -> Result<Value, FeedError> {
        debug!("GET {}", url);
        let request = async {
            let resp = self.http.get(url.clone()).send().await?;
            if !resp.status().is_success() {
                return Err(FeedError::Status(resp.status()));
            }
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(FeedError::Decode)
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(FeedError::Cancelled),
            result = request => result,
        }
    }

    /// Best-effort endpoints: any upstream failure is a `None`, not an
    /// error. Cancellation still propagates.
    async fn get_optional(
        &self,
        url: Url,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, FeedError> {
        match self.get_json(url, cancel).await {
            Ok(doc) => Ok(Some(doc)),
            Err(FeedError::Cancelled) => Err(FeedError::Cancelled),
            Err(err) => {
                debug!("best-effort feed call failed: {}", err);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl FeedClient for EspnFeed {
    async fn scoreboard(
        &self,
        sport: Sport,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<Value>, FeedError> {
        let url = self.scoreboard_url(sport, date)?;
        let raw = self.get_json(url, cancel).await?;
        let events = raw
            .get("events")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(events_for_date(events, date))
    }

    async fn summary(
        &self,
        sport: Sport,
        event_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, FeedError> {
        let url = self.summary_url(sport, event_id)?;
        self.get_json(url, cancel).await
    }

    async fn standings(
        &self,
        sport: Sport,
        cancel: &CancellationToken,
    ) -> Result<Value, FeedError> {
        let url = self.standings_url(sport)?;
        self.get_json(url, cancel).await
    }

    async fn team_info(
        &self,
        sport: Sport,
        team_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, FeedError> {
        let url = self.team_url(sport, team_id, "")?;
        self.get_optional(url, cancel).await
    }

    async fn roster(
        &self,
        sport: Sport,
        team_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, FeedError> {
        let url = self.team_url(sport, team_id, "/roster")?;
        self.get_optional(url, cancel).await
    }

    async fn schedule(
        &self,
        sport: Sport,
        team_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, FeedError> {
        let url = self.team_url(sport, team_id, "/schedule")?;
        self.get_optional(url, cancel).await
    }

    fn name(&self) -> &str {
        "ESPN"
    }
}

/// The feed sometimes returns games from adjacent dates; keep only events
/// on the requested UTC calendar date. Events without a parseable date
/// cannot be placed on any day and are dropped.
fn events_for_date(events: Vec<Value>, date: NaiveDate) -> Vec<Value> {
    events
        .into_iter()
        .filter(|event| {
            event
                .get("date")
                .and_then(Value::as_str)
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|dt| dt.with_timezone(&Utc).date_naive() == date)
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_filtered_to_requested_date() {
        let events = vec![
            json!({"id": "1", "date": "2025-10-12T17:00:00Z"}),
            json!({"id": "2", "date": "2025-10-13T01:00:00Z"}),
            json!({"id": "3", "date": "not-a-date"}),
            json!({"id": "4"}),
        ];
        let date = NaiveDate::from_ymd_opt(2025, 10, 12).unwrap();
        let kept = events_for_date(events, date);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0]["id"], "1");
    }

    #[test]
    fn urls_are_built_against_the_base() {
        let feed = EspnFeed::new(Some("http://localhost:9999/apis/"), Duration::from_secs(1))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 10, 12).unwrap();

        let url = feed.scoreboard_url(Sport::Nfl, date).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9999/apis/site/v2/sports/football/nfl/scoreboard?dates=20251012"
        );

        let cbb = feed.scoreboard_url(Sport::CollegeBasketball, date).unwrap();
        assert!(cbb.as_str().contains("limit=200"));
        assert!(cbb.as_str().contains("groups=50"));

        let standings = feed.standings_url(Sport::Nhl).unwrap();
        assert_eq!(
            standings.as_str(),
            "http://localhost:9999/apis/v2/sports/hockey/nhl/standings"
        );

        let summary = feed.summary_url(Sport::Mlb, "401001").unwrap();
        assert_eq!(
            summary.as_str(),
            "http://localhost:9999/apis/site/v2/sports/baseball/mlb/summary?event=401001"
        );

        let roster = feed.team_url(Sport::Nba, "7", "/roster").unwrap();
        assert_eq!(
            roster.as_str(),
            "http://localhost:9999/apis/site/v2/sports/basketball/nba/teams/7/roster"
        );
    }

    #[tokio::test]
    async fn pre_cancelled_token_short_circuits() {
        let feed = EspnFeed::new(Some("http://localhost:9999/apis/"), Duration::from_secs(1))
            .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = feed
            .summary(Sport::Nfl, "401001", &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
