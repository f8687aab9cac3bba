use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sports the engine understands. Fixed enumeration; adding a league means
/// adding a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sport {
    Nfl,
    Nba,
    Mlb,
    Nhl,
    CollegeFootball,
    CollegeBasketball,
}

impl Sport {
    pub const ALL: [Sport; 6] = [
        Sport::Nfl,
        Sport::Nba,
        Sport::Mlb,
        Sport::Nhl,
        Sport::CollegeFootball,
        Sport::CollegeBasketball,
    ];

    /// Stable key used in CLI arguments and cache keys.
    pub fn key(self) -> &'static str {
        match self {
            Sport::Nfl => "nfl",
            Sport::Nba => "nba",
            Sport::Mlb => "mlb",
            Sport::Nhl => "nhl",
            Sport::CollegeFootball => "college-football",
            Sport::CollegeBasketball => "college-basketball",
        }
    }

    /// Upstream API path segment for this sport.
    pub fn path(self) -> &'static str {
        match self {
            Sport::Nfl => "football/nfl",
            Sport::Nba => "basketball/nba",
            Sport::Mlb => "baseball/mlb",
            Sport::Nhl => "hockey/nhl",
            Sport::CollegeFootball => "football/college-football",
            Sport::CollegeBasketball => "basketball/mens-college-basketball",
        }
    }

    pub fn is_college(self) -> bool {
        matches!(self, Sport::CollegeFootball | Sport::CollegeBasketball)
    }

    pub fn is_football(self) -> bool {
        matches!(self, Sport::Nfl | Sport::CollegeFootball)
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sport::ALL
            .into_iter()
            .find(|sport| sport.key() == s)
            .ok_or_else(|| format!("unknown sport key '{}'", s))
    }
}

/// Canonical game status derived from the raw state/detail triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Scheduled,
    Live,
    Halftime,
    Postponed,
    Final,
}

impl GameStatus {
    /// Ordering rank: live < halftime < scheduled < postponed < final.
    pub fn sort_rank(self) -> u8 {
        match self {
            GameStatus::Live => 0,
            GameStatus::Halftime => 1,
            GameStatus::Scheduled => 2,
            GameStatus::Postponed => 3,
            GameStatus::Final => 4,
        }
    }
}

/// Which side of a matchup a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Away,
    Home,
}

/// One team of a matchup as it appears on the scoreboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSide {
    pub id: Option<String>,
    pub name: String,
    pub short_name: String,
    pub abbreviation: Option<String>,
    pub logo: Option<String>,
    /// Won/lost record summary, e.g. "10-4".
    pub record: Option<String>,
}

/// Betting lines attached to a game. Omitted from `Game` entirely when no
/// field is present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    /// Point spread from the away team's perspective. The home spread is
    /// never stored; read it via [`Odds::home_spread`].
    pub spread: Option<f64>,
    pub over_under: Option<f64>,
    pub away_moneyline: Option<f64>,
    pub home_moneyline: Option<f64>,
}

impl Odds {
    /// The home team's spread is always the negation of the stored away spread.
    pub fn home_spread(&self) -> Option<f64> {
        self.spread.map(|s| -s)
    }

    pub fn is_empty(&self) -> bool {
        self.spread.is_none()
            && self.over_under.is_none()
            && self.away_moneyline.is_none()
            && self.home_moneyline.is_none()
    }
}

/// Which half of the inning is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InningHalf {
    Top,
    Bottom,
}

/// Base-occupancy state, from most to least occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bases {
    Loaded,
    FirstAndSecond,
    FirstAndThird,
    SecondAndThird,
    First,
    Second,
    Third,
    Empty,
}

impl Bases {
    pub fn from_runners(first: bool, second: bool, third: bool) -> Bases {
        match (first, second, third) {
            (true, true, true) => Bases::Loaded,
            (true, true, false) => Bases::FirstAndSecond,
            (true, false, true) => Bases::FirstAndThird,
            (false, true, true) => Bases::SecondAndThird,
            (true, false, false) => Bases::First,
            (false, true, false) => Bases::Second,
            (false, false, true) => Bases::Third,
            (false, false, false) => Bases::Empty,
        }
    }
}

impl fmt::Display for Bases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Bases::Loaded => "loaded",
            Bases::FirstAndSecond => "1st & 2nd",
            Bases::FirstAndThird => "1st & 3rd",
            Bases::SecondAndThird => "2nd & 3rd",
            Bases::First => "1st",
            Bases::Second => "2nd",
            Bases::Third => "3rd",
            Bases::Empty => "empty",
        };
        f.write_str(s)
    }
}

/// Baseball-only live state extracted from the competition situation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseballState {
    pub at_bat: Option<Side>,
    pub inning: Option<i64>,
    pub half: Option<InningHalf>,
    pub bases: Bases,
    pub balls: Option<u8>,
    pub strikes: Option<u8>,
    pub outs: Option<u8>,
}

/// A canonical scoreboard game. Produced fresh on every fetch and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub sport: Sport,
    pub away: TeamSide,
    pub home: TeamSide,
    /// Numeric text or empty, never absent, so display logic stays total.
    pub away_score: String,
    pub home_score: String,
    pub status: GameStatus,
    /// Free-text status detail from the feed, e.g. "End of 2nd Quarter".
    pub time: String,
    /// Formatted start time, populated only for scheduled games.
    pub display_time: String,
    pub full_date_time: Option<DateTime<Utc>>,
    pub period: Option<i64>,
    pub clock: Option<String>,
    /// Team id currently in possession (football only).
    pub possession_team: Option<String>,
    pub baseball: Option<BaseballState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds: Option<Odds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,
}

/// One statistic row from a team boxscore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub name: String,
    pub display_value: String,
}

/// A matched boxscore team: parsed statistics plus the raw player stat
/// groups, whose layout varies too much by sport to flatten here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamBox {
    pub side: Side,
    pub team_id: Option<String>,
    pub name: String,
    pub statistics: Vec<StatLine>,
    pub players: Vec<serde_json::Value>,
}

/// One play from the play log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub id: Option<String>,
    pub text: String,
    pub type_text: Option<String>,
    pub period: Option<i64>,
    pub clock: Option<String>,
    pub away_score: Option<i64>,
    pub home_score: Option<i64>,
    pub scoring: bool,
    pub team_id: Option<String>,
}

/// The top performer for one stat category on one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub athlete: String,
    pub display_value: String,
    pub team_id: Option<String>,
}

/// One stat category with at most one leader per team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderCategory {
    pub name: String,
    pub display_name: String,
    pub leaders: Vec<Leader>,
}

/// Live football game-state snapshot: down, distance, field position,
/// possession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Situation {
    /// Down-and-distance text, "-" when unknown.
    pub down_distance: String,
    /// Field-position text, "-" when unknown.
    pub yard_line_text: String,
    /// Normalized 0–100 field coordinate: 0 = away goal line, 100 = home
    /// goal line.
    pub yard_line: Option<u8>,
    pub possession: Option<Side>,
    pub red_zone: bool,
}

/// One point of the win-probability series. `home + away == 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinProbabilityPoint {
    pub home: f64,
    pub away: f64,
    pub play_id: Option<String>,
    pub period: Option<i64>,
    pub clock: Option<String>,
}

/// The most recent win-probability snapshot with its attributed play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinProbability {
    pub home: f64,
    pub away: f64,
    pub play: Option<Play>,
}

/// Enriched per-game detail assembled from a summary/boxscore document.
/// Every field has its own fallback chain; absence of one never blanks the
/// others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameDetail {
    pub away_team: Option<TeamBox>,
    pub home_team: Option<TeamBox>,
    /// Ordered by occurrence, newest last.
    pub plays: Vec<Play>,
    pub leaders: Vec<LeaderCategory>,
    pub headlines: Vec<String>,
    /// Display cells for periods 1–4 plus overtime; "-" when unknown.
    pub away_linescores: [String; 5],
    pub home_linescores: [String; 5],
    pub situation: Option<Situation>,
    pub win_probability: Vec<WinProbabilityPoint>,
    pub latest_win_probability: Option<WinProbability>,
}

/// One team's row in a standings grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub team_id: Option<String>,
    pub name: String,
    pub abbreviation: Option<String>,
    pub wins: f64,
    pub losses: f64,
    pub win_percent: f64,
}

/// A named standings grouping (division or conference), entries sorted by
/// wins desc then win-percentage desc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsGroup {
    pub name: String,
    pub entries: Vec<StandingsEntry>,
}

/// Standings filtered down to the groupings containing the requested teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredStandings {
    pub groups: Vec<StandingsGroup>,
    /// True when no team matched and the first groupings were returned as an
    /// approximate fallback.
    pub approximate: bool,
}

/// Identifiers used to locate teams in a standings tree. Never assumed
/// complete; matching degrades as lists empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamIdentifiers {
    pub ids: Vec<String>,
    pub names: Vec<String>,
    pub abbreviations: Vec<String>,
}

impl TeamIdentifiers {
    /// Collect the identifiers of both sides of a game.
    pub fn from_game(game: &Game) -> Self {
        let mut idents = TeamIdentifiers::default();
        for side in [&game.home, &game.away] {
            if let Some(id) = &side.id {
                idents.ids.push(id.clone());
            }
            if !side.name.is_empty() {
                idents.names.push(side.name.clone());
            }
            if let Some(abbr) = &side.abbreviation {
                idents.abbreviations.push(abbr.clone());
            }
        }
        idents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sport_key_round_trip() {
        for sport in Sport::ALL {
            assert_eq!(sport.key().parse::<Sport>().unwrap(), sport);
        }
        assert!("cricket".parse::<Sport>().is_err());
    }

    #[test]
    fn status_rank_ordering() {
        assert!(GameStatus::Live.sort_rank() < GameStatus::Halftime.sort_rank());
        assert!(GameStatus::Halftime.sort_rank() < GameStatus::Scheduled.sort_rank());
        assert!(GameStatus::Scheduled.sort_rank() < GameStatus::Postponed.sort_rank());
        assert!(GameStatus::Postponed.sort_rank() < GameStatus::Final.sort_rank());
    }

    #[test]
    fn home_spread_is_negated_away_spread() {
        let odds = Odds {
            spread: Some(3.5),
            ..Odds::default()
        };
        assert_eq!(odds.home_spread(), Some(-3.5));

        let none = Odds::default();
        assert_eq!(none.home_spread(), None);
        assert!(none.is_empty());
    }

    #[test]
    fn bases_priority() {
        assert_eq!(Bases::from_runners(true, true, true), Bases::Loaded);
        assert_eq!(Bases::from_runners(true, false, true), Bases::FirstAndThird);
        assert_eq!(Bases::from_runners(false, false, true), Bases::Third);
        assert_eq!(Bases::from_runners(false, false, false), Bases::Empty);
        assert_eq!(Bases::FirstAndSecond.to_string(), "1st & 2nd");
    }
}
