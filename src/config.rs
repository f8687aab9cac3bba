use chrono::NaiveDate;
use clap::Parser;

use crate::model::Sport;

/// Multi-sport live scoreboard viewer
#[derive(Parser, Debug, Clone)]
#[command(name = "scorefeed", version, about)]
pub struct Config {
    /// Date to show, YYYY-MM-DD (defaults to today)
    #[arg(long, env = "SCOREFEED_DATE")]
    pub date: Option<NaiveDate>,

    /// Sports to fetch, comma-separated keys (defaults to all of
    /// nfl,nba,mlb,nhl,college-football,college-basketball)
    #[arg(long, env = "SCOREFEED_SPORTS", value_delimiter = ',')]
    pub sports: Vec<Sport>,

    /// Show only games currently in progress
    #[arg(long, default_value = "false")]
    pub live_only: bool,

    /// Show enriched detail for one event id (requires a single --sports key)
    #[arg(long)]
    pub event: Option<String>,

    /// Also show standings for the matchup (with --event)
    #[arg(long, default_value = "false")]
    pub standings: bool,

    /// Feed base URL override (for testing against a local stub)
    #[arg(long, env = "SCOREFEED_BASE_URL")]
    pub base_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, env = "SCOREFEED_TIMEOUT_SECS", default_value = "10")]
    pub timeout_secs: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.event.is_some() && self.sports.len() != 1 {
            anyhow::bail!("--event requires exactly one --sports key to identify the league");
        }
        if self.standings && self.event.is_none() {
            anyhow::bail!("--standings only applies together with --event");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be positive");
        }
        Ok(())
    }

    /// Sports to query; an empty selection means all of them.
    pub fn sports(&self) -> Vec<Sport> {
        if self.sports.is_empty() {
            Sport::ALL.to_vec()
        } else {
            self.sports.clone()
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
