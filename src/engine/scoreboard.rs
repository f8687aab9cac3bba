//! Scoreboard Normalizer: one raw scoreboard event in, one canonical
//! [`Game`] out.
//!
//! The feed is known to emit placeholder events (TBD matchups, empty
//! competitions), so a raw event that cannot yield a complete matchup is
//! dropped by returning `None` rather than reported as an error.

use chrono::{DateTime, Local, Utc};
use serde_json::Value;

use crate::engine::extract::{
    arr_of, flag_of, id_of, int_of, num_of, number, score_of, str_of, string_of,
};
use crate::model::{
    Bases, BaseballState, Game, GameStatus, InningHalf, Odds, Side, Sport, TeamSide,
};

/// Map one raw scoreboard event to a canonical game. Returns `None` for
/// placeholder events: no competition, no competitors, a missing home or
/// away competitor, or a competitor with no team name.
pub fn normalize_event(event: &Value, sport: Sport) -> Option<Game> {
    let competition = event.get("competitions")?.get(0)?;
    let competitors = arr_of(competition, "competitors");
    if competitors.is_empty() {
        return None;
    }

    let home = competitor_for(competitors, "home", 1)?;
    let away = competitor_for(competitors, "away", 0)?;

    let home_side = team_side(home)?;
    let away_side = team_side(away)?;

    let status = event.get("status").unwrap_or(&Value::Null);
    let status_type = status.get("type").unwrap_or(&Value::Null);
    let state = str_of(status_type, &["state"]).unwrap_or("");
    let detail = str_of(status_type, &["detail"]).unwrap_or("");
    let short_detail = str_of(status_type, &["shortDetail"]).unwrap_or("");
    let normalized = normalize_status(state, detail, short_detail);

    let time = string_of(status_type, &["shortDetail", "detail", "description"])
        .unwrap_or_default();

    let full_date_time = str_of(event, &["date"]).and_then(parse_event_date);
    let display_time = if normalized == GameStatus::Scheduled {
        format_display_time(full_date_time)
    } else {
        String::new()
    };

    let situation = competition.get("situation").unwrap_or(&Value::Null);
    let possession_team = if sport.is_football() {
        extract_possession(situation, competition)
    } else {
        None
    };
    let baseball = if sport == Sport::Mlb {
        Some(extract_baseball_state(situation, status))
    } else {
        None
    };

    let id = id_of(event, &["id"]).unwrap_or_else(|| {
        format!("{}-{}-{}", sport.key(), away_side.name, home_side.name)
    });

    Some(Game {
        id,
        sport,
        away_score: score_of(away, "score"),
        home_score: score_of(home, "score"),
        away: away_side,
        home: home_side,
        status: normalized,
        time,
        display_time,
        full_date_time,
        period: int_of(status, &["period"]),
        clock: extract_clock(status),
        possession_team,
        baseball,
        odds: extract_odds(competition),
        broadcast: extract_broadcast(event, competition),
    })
}

/// Derive the canonical status from the raw `{state, detail, shortDetail}`
/// triad. Detail-text signals always win over the raw state code: the state
/// is coarser than the free-text detail.
pub fn normalize_status(state: &str, detail: &str, short_detail: &str) -> GameStatus {
    let detail = detail.to_lowercase();
    let short = short_detail.to_lowercase();
    let combined = if detail.is_empty() { short } else { detail };

    if combined.contains("postponed") || combined.contains("canceled") {
        return GameStatus::Postponed;
    }
    if combined.contains("halftime") {
        return GameStatus::Halftime;
    }

    match state {
        "pre" => GameStatus::Scheduled,
        "post" | "final" => GameStatus::Final,
        "in" => {
            if combined.contains("end") {
                GameStatus::Halftime
            } else {
                GameStatus::Live
            }
        }
        _ => {
            if combined.contains("final") {
                GameStatus::Final
            } else if combined.contains("live") {
                GameStatus::Live
            } else {
                GameStatus::Scheduled
            }
        }
    }
}

fn competitor_for<'a>(competitors: &'a [Value], home_away: &str, fallback: usize) -> Option<&'a Value> {
    competitors
        .iter()
        .find(|c| str_of(c, &["homeAway"]) == Some(home_away))
        .or_else(|| competitors.get(fallback))
}

/// A competitor missing a team display name is a placeholder; the caller
/// drops the whole event.
fn team_side(competitor: &Value) -> Option<TeamSide> {
    let team = competitor.get("team")?;
    let name = string_of(team, &["displayName", "name"])?;
    let short_name = string_of(team, &["shortDisplayName", "abbreviation"])
        .unwrap_or_else(|| name.clone());

    Some(TeamSide {
        id: id_of(team, &["id"]),
        name,
        short_name,
        abbreviation: string_of(team, &["abbreviation"]),
        logo: pick_logo(team),
        record: extract_record(competitor),
    })
}

/// Pick a logo usable on a dark background. The feed lists multiple
/// variants with no semantic tag, so this is a best-effort text heuristic:
/// prefer alternate/light variants, then anything not explicitly dark, then
/// the first available URL.
fn pick_logo(team: &Value) -> Option<String> {
    let logos = arr_of(team, "logos");
    let hrefs: Vec<&str> = logos
        .iter()
        .filter_map(|entry| str_of(entry, &["href"]))
        .collect();

    let alternate = hrefs.iter().find(|href| {
        let lower = href.to_lowercase();
        lower.contains("alternate")
            || lower.contains("alt")
            || lower.contains("light")
            || lower.contains("white")
    });
    let non_dark = hrefs.iter().find(|href| {
        let lower = href.to_lowercase();
        !lower.contains("dark") && !lower.contains("black")
    });

    alternate
        .or(non_dark)
        .or_else(|| hrefs.first())
        .map(|href| href.to_string())
        .or_else(|| string_of(team, &["logo"]))
}

/// Record summary, preferring the overall ("total") record over splits.
fn extract_record(competitor: &Value) -> Option<String> {
    let records = arr_of(competitor, "records");
    let total = records
        .iter()
        .find(|record| str_of(record, &["type"]) == Some("total"))
        .or_else(|| records.first())?;
    string_of(total, &["summary"])
}

/// Football possession id: explicit possession field first (scalar or
/// nested object), then last-play team ids, then a possession-team id
/// nested in last play. First non-null wins.
fn extract_possession(situation: &Value, competition: &Value) -> Option<String> {
    possession_id(situation.get("possession"))
        .or_else(|| id_of(situation.get("lastPlay")?.get("team")?, &["id"]))
        .or_else(|| id_of(competition.get("lastPlay")?.get("team")?, &["id"]))
        .or_else(|| possession_id(situation.get("lastPlay")?.get("possessionTeam")))
        .or_else(|| possession_id(competition.get("lastPlay")?.get("possessionTeam")))
}

/// A possession value may be a bare id or a `{team: {id}}` / `{id}` object.
pub(crate) fn possession_id(value: Option<&Value>) -> Option<String> {
    let value = value?;
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => value
            .get("team")
            .and_then(|team| id_of(team, &["id"]))
            .or_else(|| id_of(value, &["id"])),
        _ => None,
    }
}

fn extract_baseball_state(situation: &Value, status: &Value) -> BaseballState {
    let inning_half = str_of(situation, &["inningHalf"]);

    let at_bat = inning_half.map(|half| if half == "top" { Side::Away } else { Side::Home });

    let inning = int_of(situation, &["inning"]).or_else(|| int_of(status, &["period"]));

    let half = match situation.get("topOfInning") {
        Some(Value::Bool(top)) => Some(if *top { InningHalf::Top } else { InningHalf::Bottom }),
        _ => match situation.get("inningHalf") {
            Some(Value::Number(n)) if n.as_i64() == Some(1) => Some(InningHalf::Top),
            Some(Value::Number(n)) if n.as_i64() == Some(2) => Some(InningHalf::Bottom),
            Some(Value::String(s)) if s == "top" => Some(InningHalf::Top),
            Some(Value::String(s)) if s == "bottom" => Some(InningHalf::Bottom),
            _ => None,
        },
    };

    BaseballState {
        at_bat,
        inning,
        half,
        bases: Bases::from_runners(
            flag_of(situation, "onFirst"),
            flag_of(situation, "onSecond"),
            flag_of(situation, "onThird"),
        ),
        balls: int_of(situation, &["balls"]).map(|n| n as u8),
        strikes: int_of(situation, &["strikes"]).map(|n| n as u8),
        outs: int_of(situation, &["outs"]).map(|n| n as u8),
    }
}

/// Spread is stored from the away perspective: the away close line when
/// present, else the negated home close line. The whole structure is
/// omitted when no odds field resolves.
fn extract_odds(competition: &Value) -> Option<Odds> {
    let odds = competition.get("odds")?.get(0)?;

    let spread = odds.get("pointSpread").and_then(|point_spread| {
        close_line(point_spread.get("away"))
            .or_else(|| close_line(point_spread.get("home")).map(|line| -line))
    });
    let over_under = odds
        .get("overUnder")
        .and_then(|total| total.get("close"))
        .and_then(|close| num_of(close, &["line"]));
    let moneyline = odds.get("moneyline").unwrap_or(&Value::Null);
    let away_moneyline = close_line(moneyline.get("away"));
    let home_moneyline = close_line(moneyline.get("home"));

    let odds = Odds {
        spread,
        over_under,
        away_moneyline,
        home_moneyline,
    };
    (!odds.is_empty()).then_some(odds)
}

fn close_line(side: Option<&Value>) -> Option<f64> {
    num_of(side?.get("close")?, &["line"])
}

/// Broadcast label, checked across the four locations the feed is known to
/// use.
fn extract_broadcast(event: &Value, competition: &Value) -> Option<String> {
    string_of(event, &["broadcast"])
        .or_else(|| {
            let broadcast = arr_of(competition, "broadcasts").first()?;
            arr_of(broadcast, "names")
                .first()
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| string_of(broadcast.get("media")?, &["shortName"]))
        })
        .or_else(|| {
            let geo = arr_of(event, "geoBroadcasts").first()?;
            string_of(geo.get("media")?, &["shortName"])
        })
        .or_else(|| {
            let broadcast = arr_of(event, "broadcasts").first()?;
            arr_of(broadcast, "names")
                .first()
                .and_then(Value::as_str)
                .map(str::to_string)
        })
}

fn extract_clock(status: &Value) -> Option<String> {
    string_of(status, &["displayClock"])
        .or_else(|| status.get("clock").and_then(number).map(|c| c.to_string()))
}

fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn format_display_time(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(dt) => dt.with_timezone(&Local).format("%-I:%M %p").to_string(),
        None => "TBD".to_string(),
    }
}
