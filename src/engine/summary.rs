//! Summary Extractor: one raw summary/boxscore document in, one
//! [`GameDetail`] out.
//!
//! The document shape varies by sport and by live/final state, so every
//! field is resolved through its own ordered fallback chain and the
//! extraction never fails as a whole: a missing preferred source for one
//! field leaves the other fields untouched.

use serde_json::Value;

use crate::engine::analytics::{
    latest_win_probability, normalize_win_probability, reconstruct_period_scores,
};
use crate::engine::extract::{arr_of, flag_of, id_of, int_of, number, str_of, string_of};
use crate::engine::situation;
use crate::model::{Game, GameDetail, Leader, LeaderCategory, Play, Side, StatLine, TeamBox};

/// Known leader categories, in display order. Anything else the feed sends
/// is appended after these in encounter order.
const LEADER_ORDER: &[&str] = &[
    "passingYards",
    "rushingYards",
    "receivingYards",
    "sacks",
    "totalTackles",
];

/// Assemble enriched detail for `game` from its raw summary document.
pub fn extract_detail(doc: &Value, game: &Game) -> GameDetail {
    let boxscore = doc.get("boxscore").unwrap_or(&Value::Null);
    let teams = arr_of(boxscore, "teams");

    let away_index = team_index(teams, game, Side::Away);
    let home_index = team_index(teams, game, Side::Home);
    let away_raw = away_index.and_then(|i| teams.get(i));
    let home_raw = home_index.and_then(|i| teams.get(i));

    let plays = collect_plays(doc);
    let combined = combined_play_log(doc);
    let (away_reconstructed, home_reconstructed) = reconstruct_period_scores(&combined);

    let away_official = resolve_linescores(doc, boxscore, game, Side::Away, away_raw);
    let home_official = resolve_linescores(doc, boxscore, game, Side::Home, home_raw);

    let win_probability = win_probability_candidates(doc)
        .into_iter()
        .map(normalize_win_probability)
        .find(|points| !points.is_empty())
        .unwrap_or_default();
    let latest = latest_win_probability(&win_probability, &combined);

    GameDetail {
        away_team: away_raw.map(|raw| parse_team_box(raw, Side::Away)),
        home_team: home_raw.map(|raw| parse_team_box(raw, Side::Home)),
        plays,
        leaders: extract_leaders(doc, boxscore),
        headlines: extract_headlines(doc),
        away_linescores: period_cells(away_official, &away_reconstructed),
        home_linescores: period_cells(home_official, &home_reconstructed),
        situation: situation::resolve(doc, game),
        win_probability,
        latest_win_probability: latest,
    }
}

/// Three-tier team match: id, then display name, then short name. Raw
/// boxscore ordering is not guaranteed to match the scoreboard's home/away
/// assignment, so position is only the last resort (index 0 = away,
/// index 1 = home).
fn team_index(teams: &[Value], game: &Game, side: Side) -> Option<usize> {
    let want = match side {
        Side::Away => &game.away,
        Side::Home => &game.home,
    };

    let by_id = want.id.as_deref().and_then(|id| {
        teams
            .iter()
            .position(|t| team_field(t, &["id"]).as_deref() == Some(id))
    });
    let by_name = || {
        teams
            .iter()
            .position(|t| team_field(t, &["displayName"]).as_deref() == Some(want.name.as_str()))
    };
    let by_short = || {
        teams.iter().position(|t| {
            team_field(t, &["shortDisplayName", "name"]).as_deref()
                == Some(want.short_name.as_str())
        })
    };

    by_id.or_else(by_name).or_else(by_short).or(match side {
        Side::Away => (!teams.is_empty()).then_some(0),
        Side::Home => (teams.len() > 1).then_some(1),
    })
}

fn team_field(boxscore_team: &Value, keys: &[&str]) -> Option<String> {
    let team = boxscore_team.get("team")?;
    id_of(team, keys).or_else(|| string_of(team, keys))
}

fn parse_team_box(raw: &Value, side: Side) -> TeamBox {
    let team = raw.get("team").unwrap_or(&Value::Null);
    let statistics = arr_of(raw, "statistics")
        .iter()
        .filter_map(|stat| {
            let name = string_of(stat, &["name", "label"])?;
            let display_value = string_of(stat, &["displayValue"])
                .or_else(|| stat.get("value").and_then(number).map(format_number))?;
            Some(StatLine { name, display_value })
        })
        .collect();

    // Player stat groups live either under the first statistics entry or a
    // players key; their layout varies too much by sport to flatten.
    let players = arr_of(raw, "statistics")
        .first()
        .map(|stat| arr_of(stat, "athletes").to_vec())
        .filter(|athletes| !athletes.is_empty())
        .unwrap_or_else(|| arr_of(raw, "players").to_vec());

    TeamBox {
        side,
        team_id: id_of(team, &["id"]),
        name: string_of(team, &["displayName", "name"]).unwrap_or_default(),
        statistics,
        players,
    }
}

/// Play log for display: the first populated source wins.
fn collect_plays(doc: &Value) -> Vec<Play> {
    play_sources(doc)
        .into_iter()
        .find(|plays| !plays.is_empty())
        .unwrap_or_default()
}

/// Every play from every source, for score reconstruction and play
/// attribution across documents that split the log between drives.
fn combined_play_log(doc: &Value) -> Vec<Play> {
    play_sources(doc).into_iter().flatten().collect()
}

fn play_sources(doc: &Value) -> Vec<Vec<Play>> {
    let boxscore = doc.get("boxscore").unwrap_or(&Value::Null);
    let drives = doc.get("drives").unwrap_or(&Value::Null);

    let drive_previous: Vec<Play> = arr_of(drives, "previous")
        .iter()
        .flat_map(|drive| arr_of(drive, "plays"))
        .map(parse_play)
        .collect();
    let drive_current: Vec<Play> = drives
        .get("current")
        .map(|drive| arr_of(drive, "plays").iter().map(parse_play).collect())
        .unwrap_or_default();

    vec![
        arr_of(doc, "plays").iter().map(parse_play).collect(),
        arr_of(boxscore, "plays").iter().map(parse_play).collect(),
        drive_previous,
        drive_current,
    ]
}

fn parse_play(raw: &Value) -> Play {
    Play {
        id: id_of(raw, &["id"]),
        text: string_of(raw, &["text", "shortText"]).unwrap_or_default(),
        type_text: raw.get("type").and_then(|t| string_of(t, &["text"])),
        period: play_period(raw),
        clock: raw
            .get("clock")
            .and_then(|clock| {
                string_of(clock, &["displayValue"]).or_else(|| clock.as_str().map(str::to_string))
            }),
        away_score: play_score(raw, "awayScore", "away"),
        home_score: play_score(raw, "homeScore", "home"),
        scoring: flag_of(raw, "scoringPlay"),
        team_id: raw
            .get("team")
            .and_then(|team| id_of(team, &["id"]))
            .or_else(|| id_of(raw, &["team"])),
    }
}

fn play_period(raw: &Value) -> Option<i64> {
    raw.get("period")
        .and_then(|period| {
            period
                .get("number")
                .and_then(number)
                .or_else(|| number(period))
        })
        .or_else(|| raw.get("periodNumber").and_then(number))
        .map(|n| n as i64)
}

/// Score aliases: a flat key, a `score.{side}` object, or a `scores.{side}`
/// object.
fn play_score(raw: &Value, flat_key: &str, side_key: &str) -> Option<i64> {
    raw.get(flat_key)
        .and_then(number)
        .or_else(|| raw.get("score")?.get(side_key).and_then(number))
        .or_else(|| raw.get("scores")?.get(side_key).and_then(number))
        .map(|n| n as i64)
}

/// Linescore resolution for one side, in fixed precedence: header
/// competitor, the boxscore team's own list, a team-keyed list on the
/// boxscore, the same lookup at top level, else empty.
fn resolve_linescores<'a>(
    doc: &'a Value,
    boxscore: &'a Value,
    game: &Game,
    side: Side,
    box_team: Option<&'a Value>,
) -> &'a [Value] {
    let team_id = box_team
        .and_then(|t| team_field(t, &["id"]))
        .or_else(|| match side {
            Side::Away => game.away.id.clone(),
            Side::Home => game.home.id.clone(),
        });

    let from_header = header_competitor(doc, game, side)
        .map(|competitor| arr_of(competitor, "linescores"))
        .filter(|linescores| !linescores.is_empty());
    let from_team = box_team
        .map(|t| arr_of(t, "linescores"))
        .filter(|linescores| !linescores.is_empty());

    from_header
        .or(from_team)
        .or_else(|| keyed_linescores(boxscore, team_id.as_deref()))
        .or_else(|| keyed_linescores(doc, team_id.as_deref()))
        .unwrap_or(&[])
}

/// A `linescores` list keyed by team id, as some documents carry at the
/// boxscore or top level.
fn keyed_linescores<'a>(root: &'a Value, team_id: Option<&str>) -> Option<&'a [Value]> {
    let team_id = team_id?;
    let entry = arr_of(root, "linescores").iter().find(|entry| {
        id_of(entry, &["teamId"])
            .or_else(|| entry.get("team").and_then(|t| id_of(t, &["id"])))
            .as_deref()
            == Some(team_id)
    })?;
    let linescores = arr_of(entry, "linescores");
    (!linescores.is_empty()).then_some(linescores)
}

fn header_competitor<'a>(doc: &'a Value, game: &Game, side: Side) -> Option<&'a Value> {
    let competitors = doc
        .get("header")?
        .get("competitions")?
        .get(0)?
        .get("competitors")?
        .as_array()?;

    let (want_id, want_home_away) = match side {
        Side::Away => (game.away.id.as_deref(), "away"),
        Side::Home => (game.home.id.as_deref(), "home"),
    };

    competitors.iter().find(|c| {
        let by_id = match want_id {
            Some(id) => c
                .get("team")
                .and_then(|t| id_of(t, &["id"]))
                .as_deref()
                == Some(id),
            None => false,
        };
        by_id || str_of(c, &["homeAway"]) == Some(want_home_away)
    })
}

/// Display cells for periods 1–5. Official linescores always win;
/// reconstruction fills the gaps, and "-" keeps the row total.
fn period_cells(official: &[Value], reconstructed: &[u32; 5]) -> [String; 5] {
    std::array::from_fn(|i| {
        let period = i + 1;
        linescore_cell(official, period)
            .or_else(|| (reconstructed[i] > 0).then(|| reconstructed[i].to_string()))
            .unwrap_or_else(|| "-".to_string())
    })
}

/// One period's official cell: positional first, then keyed by period
/// number.
fn linescore_cell(linescores: &[Value], period: usize) -> Option<String> {
    if let Some(cell) = linescores.get(period - 1).and_then(cell_value) {
        return Some(cell);
    }
    linescores
        .iter()
        .find(|ls| {
            int_of(ls, &["period"]) == Some(period as i64)
                || ls
                    .get("period")
                    .and_then(|p| p.get("number"))
                    .and_then(number)
                    == Some(period as f64)
        })
        .and_then(cell_value)
}

fn cell_value(cell: &Value) -> Option<String> {
    match cell {
        Value::Number(n) => n.as_f64().map(format_number),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(_) => string_of(cell, &["displayValue", "text"])
            .or_else(|| cell.get("value").and_then(number).map(format_number))
            .or_else(|| cell.get("score").and_then(number).map(format_number)),
        _ => None,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Invert the raw "per team, categories, leader list" structure into "per
/// category, one leader per team", deduplicating categories by name across
/// teams and putting the known categories first.
fn extract_leaders(doc: &Value, boxscore: &Value) -> Vec<LeaderCategory> {
    let mut source = arr_of(doc, "leaders");
    if source.is_empty() {
        source = arr_of(boxscore, "leaders");
    }
    if source.is_empty() {
        if let Some(header_leaders) = doc
            .get("header")
            .and_then(|h| h.get("competitions"))
            .and_then(|c| c.get(0))
            .map(|c| arr_of(c, "leaders"))
        {
            source = header_leaders;
        }
    }

    let mut categories: Vec<LeaderCategory> = Vec::new();
    for team_leader in source {
        let team_id = team_leader.get("team").and_then(|t| id_of(t, &["id"]));
        for category in arr_of(team_leader, "leaders") {
            let Some(name) = string_of(category, &["name", "displayName"]) else {
                continue;
            };
            let Some(top) = arr_of(category, "leaders").first() else {
                continue;
            };
            let leader = Leader {
                athlete: top
                    .get("athlete")
                    .and_then(|a| string_of(a, &["displayName", "shortName"]))
                    .unwrap_or_default(),
                display_value: string_of(top, &["displayValue"])
                    .or_else(|| top.get("value").and_then(number).map(format_number))
                    .unwrap_or_default(),
                team_id: team_id.clone(),
            };

            match categories.iter_mut().find(|c| c.name == name) {
                Some(existing) => existing.leaders.push(leader),
                None => categories.push(LeaderCategory {
                    display_name: string_of(category, &["displayName"])
                        .unwrap_or_else(|| name.clone()),
                    name,
                    leaders: vec![leader],
                }),
            }
        }
    }

    // Stable sort: known categories in fixed order, the rest keep their
    // encounter order after them.
    categories.sort_by_key(|category| {
        LEADER_ORDER
            .iter()
            .position(|known| *known == category.name)
            .unwrap_or(LEADER_ORDER.len())
    });
    categories
}

fn extract_headlines(doc: &Value) -> Vec<String> {
    let mut headlines: Vec<String> = arr_of(doc, "headlines")
        .iter()
        .filter_map(|entry| string_of(entry, &["description", "shortLinkText", "headline"]))
        .collect();
    headlines.extend(
        arr_of(doc, "commentary")
            .iter()
            .filter_map(|entry| string_of(entry, &["text"])),
    );
    headlines
}

/// Ordered win-probability sources; the first that normalizes to a
/// non-empty series wins.
fn win_probability_candidates(doc: &Value) -> Vec<&Value> {
    let boxscore = doc.get("boxscore");
    let header_competition = doc
        .get("header")
        .and_then(|h| h.get("competitions"))
        .and_then(|c| c.get(0));

    [
        doc.get("winprobability"),
        doc.get("winProbability"),
        boxscore.and_then(|b| b.get("winprobability")),
        boxscore.and_then(|b| b.get("winProbability")),
        doc.get("predictor"),
        doc.get("analytics").and_then(|a| a.get("winProbability")),
        header_competition.and_then(|c| c.get("predictor")),
        header_competition.and_then(|c| c.get("winProbability")),
    ]
    .into_iter()
    .flatten()
    .collect()
}
