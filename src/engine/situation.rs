//! Live game-state (situation) resolution for football.
//!
//! Summary documents bury the situation node in a different place per sport
//! and per live/final state, so it is located by a bounded-depth search of
//! the whole document rather than a fixed path. Field position is then
//! normalized to a single 0–100 coordinate (0 = away goal line, 100 = home
//! goal line) so red-zone and rendering logic never re-parse feed text.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::engine::extract::{flag_of, num_of, number, str_of, string_of};
use crate::engine::scoreboard::possession_id;
use crate::model::{Game, Side, Situation};

/// Circular or pathological documents exist upstream; the search never
/// follows more than this many levels.
const MAX_DEPTH: usize = 10;

/// Subtrees that are large and cannot contain situation data.
const EXCLUDED_KEYS: &[&str] = &["plays", "athletes", "links"];

const TEXT_FIELDS: &[&str] = &[
    "downDistanceText",
    "shortDownDistanceText",
    "yardLineText",
    "possessionText",
];

static DOWN_DISTANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[a-z]{2}\s&\s\d+").unwrap());
static YARD_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"at\s([A-Z]{2,4}\s\d{1,2})").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Locate the situation node: depth-first, bounded at [`MAX_DEPTH`], keys
/// that sound like situation data visited before the rest, known-irrelevant
/// subtrees skipped.
pub fn find_situation(doc: &Value) -> Option<&Value> {
    find_at(doc, 0)
}

fn find_at(value: &Value, depth: usize) -> Option<&Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => {
            if qualifies(value) {
                return Some(value);
            }
            let children: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(key, child)| {
                    (child.is_object() || child.is_array())
                        && !EXCLUDED_KEYS.contains(&key.as_str())
                })
                .collect();
            let (priority, rest): (Vec<_>, Vec<_>) = children
                .into_iter()
                .partition(|(key, _)| is_priority_key(key));
            priority
                .into_iter()
                .chain(rest)
                .find_map(|(_, child)| find_at(child, depth + 1))
        }
        Value::Array(items) => items.iter().find_map(|item| find_at(item, depth + 1)),
        _ => None,
    }
}

fn is_priority_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.contains("situation") || lower.contains("lastplay") || key == "status"
}

/// A node is a situation when it carries descriptive text, or a numeric
/// down/distance pair with a meaningful (non-zero) down.
fn qualifies(value: &Value) -> bool {
    if str_of(value, TEXT_FIELDS).is_some() {
        return true;
    }
    let down = value.get("down").and_then(number);
    let distance = value.get("distance").and_then(number);
    matches!((down, distance), (Some(d), Some(_)) if d > 0.0)
}

/// Down-and-distance display text: descriptive text when present, else
/// synthesized from the numeric pair ("1st & 10" style).
pub fn down_distance_text(situation: &Value) -> Option<String> {
    string_of(situation, &["downDistanceText", "shortDownDistanceText"]).or_else(|| {
        let down = situation.get("down").and_then(number)? as i64;
        let distance = situation.get("distance").and_then(number)? as i64;
        (down > 0).then(|| format!("{} & {}", ordinal(down), distance))
    })
}

fn ordinal(n: i64) -> String {
    let suffix = match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Normalize field position to 0–100 (0 = away goal, 100 = home goal).
///
/// Descriptive text is preferred: a yard number next to the home
/// abbreviation counts from the home goal, next to the away abbreviation
/// from the away goal, and midfield text is exactly 50. When text parsing
/// fails, a raw numeric yard line is interpreted through the same
/// own/opponent logic.
pub fn normalized_yard_line(
    yard_line_text: &str,
    raw_yard_line: Option<f64>,
    away_abbr: Option<&str>,
    home_abbr: Option<&str>,
) -> Option<u8> {
    let text = yard_line_text.to_uppercase();
    let text_number = NUMBER_RE
        .find(&text)
        .and_then(|m| m.as_str().parse::<i64>().ok());

    if text.contains("MIDFIELD") {
        return Some(50);
    }
    if let (Some(abbr), Some(n)) = (nonempty_upper(home_abbr), text_number) {
        if text.contains(&abbr) {
            return Some(clamp_yard(if n == 50 { 50 } else { 100 - n }));
        }
    }
    if let (Some(abbr), Some(n)) = (nonempty_upper(away_abbr), text_number) {
        if text.contains(&abbr) {
            return Some(clamp_yard(n));
        }
    }

    let raw = raw_yard_line? as i64;
    if raw <= 50 {
        if text.contains("OPP") {
            return Some(clamp_yard(100 - raw));
        }
        if text.contains("OWN") {
            return Some(clamp_yard(raw));
        }
    }
    Some(clamp_yard(raw))
}

fn nonempty_upper(abbr: Option<&str>) -> Option<String> {
    abbr.filter(|a| !a.is_empty()).map(str::to_uppercase)
}

fn clamp_yard(n: i64) -> u8 {
    n.clamp(0, 100) as u8
}

/// Resolve the full [`Situation`] for a game from its summary document.
/// Returns `None` when the document has no locatable situation and no
/// possession signal — typically a non-football or pre-game document.
pub fn resolve(doc: &Value, game: &Game) -> Option<Situation> {
    let node = find_situation(doc);
    let possession_team = possession_team_id(node, doc);
    if node.is_none() && possession_team.is_none() {
        return None;
    }

    let possession = possession_team.as_deref().and_then(|id| {
        if game.away.id.as_deref() == Some(id) {
            Some(Side::Away)
        } else if game.home.id.as_deref() == Some(id) {
            Some(Side::Home)
        } else {
            None
        }
    });

    let node = node.unwrap_or(&Value::Null);
    let down_distance = down_distance_text(node)
        .or_else(|| last_play_match(doc, &DOWN_DISTANCE_RE, 0))
        .unwrap_or_else(|| "-".to_string());

    let yard_line_text = string_of(node, &["yardLineText", "possessionText"])
        .or_else(|| synthesized_yard_text(node, game))
        .or_else(|| last_play_match(doc, &YARD_TEXT_RE, 1))
        .unwrap_or_else(|| "-".to_string());

    let raw_yard_line = num_of(node, &["yardLine", "yardline", "location"]);
    let yard_line = normalized_yard_line(
        &yard_line_text,
        raw_yard_line,
        game.away.abbreviation.as_deref(),
        game.home.abbreviation.as_deref(),
    );

    let red_zone = match (possession, yard_line) {
        (Some(Side::Away), Some(y)) => y >= 80,
        (Some(Side::Home), Some(y)) => y <= 20,
        _ => false,
    };

    Some(Situation {
        down_distance,
        yard_line_text,
        yard_line,
        possession,
        red_zone,
    })
}

/// Possession id for the detail view: the situation node first, then the
/// current drive's team, then a header competitor flagged as possessing.
fn possession_team_id(node: Option<&Value>, doc: &Value) -> Option<String> {
    let from_node = node.and_then(|sit| {
        possession_id(sit.get("possession"))
            .or_else(|| sit.get("possessionTeam").and_then(|t| possession_id(Some(t))))
            .or_else(|| possession_id(sit.get("lastPlay")?.get("team")))
    });
    from_node
        .or_else(|| possession_id(doc.get("drives")?.get("current")?.get("team")))
        .or_else(|| {
            let competitors = doc
                .get("header")?
                .get("competitions")?
                .get(0)?
                .get("competitors")?
                .as_array()?;
            competitors
                .iter()
                .find(|c| {
                    flag_of(c, "possession")
                        || c.get("possessionTeam").and_then(|t| t.get("id")).is_some()
                })
                .and_then(|c| possession_id(c.get("team")))
        })
}

/// Yard-line text synthesized from a raw numeric yard line, when an
/// abbreviation is available to anchor it.
fn synthesized_yard_text(node: &Value, game: &Game) -> Option<String> {
    let yard_line = num_of(node, &["yardLine"])? as i64;
    if yard_line == 50 {
        return Some("Midfield".to_string());
    }
    if yard_line > 50 {
        let abbr = game.home.abbreviation.as_deref()?;
        Some(format!("{} {}", abbr, 100 - yard_line))
    } else {
        let abbr = game.away.abbreviation.as_deref()?;
        Some(format!("{} {}", abbr, yard_line))
    }
}

/// Last-ditch text extraction from the current drive's last play.
fn last_play_match(doc: &Value, re: &Regex, group: usize) -> Option<String> {
    let text = doc
        .get("drives")?
        .get("current")?
        .get("lastPlay")?
        .get("text")?
        .as_str()?;
    re.captures(text)?
        .get(group)
        .map(|m| m.as_str().to_string())
}
