//! Deterministic ordering and live filtering over canonical games.

use std::cmp::Ordering;

use crate::model::{Game, GameStatus};

/// Total order: status rank first (live < halftime < scheduled < postponed
/// < final), then start time ascending, then sport key, then home-team
/// name. Games without a parseable start time sort after dated ones within
/// their status band.
pub fn compare_games(a: &Game, b: &Game) -> Ordering {
    a.status
        .sort_rank()
        .cmp(&b.status.sort_rank())
        .then_with(|| match (a.full_date_time, b.full_date_time) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.sport.key().cmp(b.sport.key()))
        .then_with(|| a.home.name.cmp(&b.home.name))
}

/// Stable sort by [`compare_games`].
pub fn sort_games(games: &mut [Game]) {
    games.sort_by(compare_games);
}

pub fn is_live(game: &Game) -> bool {
    matches!(game.status, GameStatus::Live | GameStatus::Halftime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Sport, TeamSide};
    use chrono::{TimeZone, Utc};

    fn game(id: &str, sport: Sport, status: GameStatus, hour: Option<u32>, home: &str) -> Game {
        Game {
            id: id.to_string(),
            sport,
            away: TeamSide {
                name: "Away".to_string(),
                short_name: "Away".to_string(),
                ..TeamSide::default()
            },
            home: TeamSide {
                name: home.to_string(),
                short_name: home.to_string(),
                ..TeamSide::default()
            },
            away_score: String::new(),
            home_score: String::new(),
            status,
            time: String::new(),
            display_time: String::new(),
            full_date_time: hour
                .map(|h| Utc.with_ymd_and_hms(2025, 10, 12, h, 0, 0).unwrap()),
            period: None,
            clock: None,
            possession_team: None,
            baseball: None,
            odds: None,
            broadcast: None,
        }
    }

    #[test]
    fn status_band_dominates() {
        let mut games = vec![
            game("final", Sport::Nfl, GameStatus::Final, Some(13), "A"),
            game("sched", Sport::Nfl, GameStatus::Scheduled, Some(10), "B"),
            game("post", Sport::Nfl, GameStatus::Postponed, Some(11), "C"),
            game("half", Sport::Nfl, GameStatus::Halftime, Some(12), "D"),
            game("live", Sport::Nfl, GameStatus::Live, Some(23), "E"),
        ];
        sort_games(&mut games);
        let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["live", "half", "sched", "post", "final"]);
    }

    #[test]
    fn within_status_date_then_sport_then_home() {
        let mut games = vec![
            game("late", Sport::Nfl, GameStatus::Scheduled, Some(20), "A"),
            game("early", Sport::Nfl, GameStatus::Scheduled, Some(13), "B"),
            game("nhl", Sport::Nhl, GameStatus::Scheduled, Some(13), "A"),
            game("undated", Sport::Nfl, GameStatus::Scheduled, None, "Z"),
            game("nba2", Sport::Nba, GameStatus::Scheduled, Some(13), "Beta"),
            game("nba1", Sport::Nba, GameStatus::Scheduled, Some(13), "Alpha"),
        ];
        sort_games(&mut games);
        let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["nba1", "nba2", "early", "nhl", "late", "undated"]);
    }

    #[test]
    fn ordering_is_consistent_for_equal_games() {
        let a = game("x", Sport::Nfl, GameStatus::Live, Some(13), "A");
        let b = game("y", Sport::Nfl, GameStatus::Live, Some(13), "A");
        assert_eq!(compare_games(&a, &b), Ordering::Equal);
        assert_eq!(compare_games(&b, &a), Ordering::Equal);
    }

    #[test]
    fn live_filter_includes_halftime() {
        assert!(is_live(&game("a", Sport::Nfl, GameStatus::Live, None, "A")));
        assert!(is_live(&game("b", Sport::Nfl, GameStatus::Halftime, None, "A")));
        assert!(!is_live(&game("c", Sport::Nfl, GameStatus::Final, None, "A")));
        assert!(!is_live(&game("d", Sport::Nfl, GameStatus::Scheduled, None, "A")));
    }
}
