//! Derived analytics: values the feed does not supply directly.
//!
//! Two reconstructions live here. Period-by-period scoring is rebuilt from
//! the play log when no official linescore exists (common for in-progress
//! games). The win-probability series is normalized from whichever of the
//! three raw encodings arrives (point array, single object, bare number)
//! into fractions that always sum to one, with the latest point attributed
//! to a concrete play.

use serde_json::Value;

use crate::engine::extract::{id_of, number, string_of};
use crate::model::{Play, WinProbability, WinProbabilityPoint};

/// Regulation length used for the probability chart's time axis.
pub const GAME_SECONDS: u32 = 3600;
const PERIOD_SECONDS: u32 = 15 * 60;

const SCORING_TYPE_MARKERS: &[&str] = &["touchdown", "field goal", "safety", "goal"];

/// Rebuild per-period score buckets (periods 1–4 plus overtime in slot 5)
/// from the play log.
///
/// Plays qualify as scoring plays via the explicit flag, a scoring play-type
/// text, or a running score that moved since the previous tracked play. The
/// qualifying plays are then walked in stable period order; only advances
/// past the side's running high-water mark are credited, so a corrected or
/// out-of-order entry can never push a side's bucket sum past its actual
/// score.
pub fn reconstruct_period_scores(plays: &[Play]) -> ([u32; 5], [u32; 5]) {
    let mut away_buckets = [0u32; 5];
    let mut home_buckets = [0u32; 5];

    let mut tracked_away = 0i64;
    let mut tracked_home = 0i64;
    let mut scoring: Vec<&Play> = Vec::new();
    for play in plays {
        let moved = match (play.away_score, play.home_score) {
            (Some(a), Some(h)) => a != tracked_away || h != tracked_home,
            _ => false,
        };
        if play.scoring || has_scoring_type(play) || moved {
            scoring.push(play);
        }
        if let (Some(a), Some(h)) = (play.away_score, play.home_score) {
            tracked_away = a;
            tracked_home = h;
        }
    }

    // Stable: ties keep encounter order.
    scoring.sort_by_key(|play| play.period.unwrap_or(0));

    let mut last_away = 0i64;
    let mut last_home = 0i64;
    for play in scoring {
        let away = play.away_score.unwrap_or(0);
        let home = play.home_score.unwrap_or(0);
        let bucket = (play.period.unwrap_or(1).clamp(1, 5) - 1) as usize;

        let away_delta = away - last_away;
        let home_delta = home - last_home;
        if away_delta > 0 {
            away_buckets[bucket] += away_delta as u32;
        }
        if home_delta > 0 {
            home_buckets[bucket] += home_delta as u32;
        }
        // Baselines are high-water marks: a downward correction credits
        // nothing now and cannot re-credit already-counted points later.
        last_away = last_away.max(away);
        last_home = last_home.max(home);
    }

    (away_buckets, home_buckets)
}

fn has_scoring_type(play: &Play) -> bool {
    play.type_text
        .as_deref()
        .map(|t| {
            let lower = t.to_lowercase();
            SCORING_TYPE_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .unwrap_or(false)
}

/// Normalize raw win-probability data (an array of points, a single
/// object, or a bare number) into a series of fractions in [0, 1] with
/// `home + away == 1` at every point.
pub fn normalize_win_probability(raw: &Value) -> Vec<WinProbabilityPoint> {
    match raw {
        Value::Array(items) => items.iter().filter_map(point_from_value).collect(),
        Value::Object(_) | Value::Number(_) => {
            point_from_value(raw).into_iter().collect()
        }
        _ => Vec::new(),
    }
}

fn point_from_value(value: &Value) -> Option<WinProbabilityPoint> {
    if let Some(n) = value.as_f64() {
        let home = normalize_fraction(n);
        return Some(WinProbabilityPoint {
            home,
            away: 1.0 - home,
            play_id: None,
            period: None,
            clock: None,
        });
    }
    if !value.is_object() {
        return None;
    }

    let home_raw = home_probability(value);
    let away_raw = away_probability(value);
    let (home, away) = match (home_raw, away_raw) {
        (Some(h), _) => {
            let h = normalize_fraction(h);
            // The home value is authoritative; the away side is always its
            // complement so the pair sums to one.
            (h, 1.0 - h)
        }
        (None, Some(a)) => {
            let a = normalize_fraction(a);
            (1.0 - a, a)
        }
        (None, None) => return None,
    };

    Some(WinProbabilityPoint {
        home,
        away,
        play_id: id_of(value, &["playId"])
            .or_else(|| value.get("play").and_then(|p| id_of(p, &["id"]))),
        period: point_period(value),
        clock: point_clock(value),
    })
}

fn home_probability(value: &Value) -> Option<f64> {
    ["homeWinPercentage", "homeWinProbability", "homeProbability", "homeTeamProbability"]
        .iter()
        .find_map(|key| value.get(key).and_then(number))
        .or_else(|| value.get("homeTeam")?.get("winProbability").and_then(number))
}

fn away_probability(value: &Value) -> Option<f64> {
    ["awayWinPercentage", "awayWinProbability", "awayProbability", "awayTeamProbability"]
        .iter()
        .find_map(|key| value.get(key).and_then(number))
        .or_else(|| value.get("awayTeam")?.get("winProbability").and_then(number))
}

/// Values above 1 are percentages; divide down and clamp into [0, 1].
fn normalize_fraction(p: f64) -> f64 {
    let p = if p > 1.0 { p / 100.0 } else { p };
    p.clamp(0.0, 1.0)
}

fn point_period(value: &Value) -> Option<i64> {
    let direct = value.get("period");
    let nested = value.get("play").and_then(|p| p.get("period"));
    [direct, nested].into_iter().flatten().find_map(period_number)
}

fn period_number(period: &Value) -> Option<i64> {
    period
        .get("number")
        .and_then(number)
        .or_else(|| number(period))
        .map(|n| n as i64)
}

fn point_clock(value: &Value) -> Option<String> {
    clock_text(value.get("clock"))
        .or_else(|| clock_text(value.get("play")?.get("clock")))
}

fn clock_text(clock: Option<&Value>) -> Option<String> {
    let clock = clock?;
    string_of(clock, &["displayValue"]).or_else(|| clock.as_str().map(str::to_string))
}

/// The most recent point of the series, with its play attributed from the
/// combined play log: exact id match first, then substring containment in
/// either direction (ids are sometimes truncated or prefixed), then the
/// chronologically last play.
pub fn latest_win_probability(
    points: &[WinProbabilityPoint],
    plays: &[Play],
) -> Option<WinProbability> {
    let last = points.last()?;
    let play = attribute_play(last.play_id.as_deref(), plays);
    Some(WinProbability {
        home: last.home,
        away: last.away,
        play: play.cloned(),
    })
}

fn attribute_play<'a>(play_id: Option<&str>, plays: &'a [Play]) -> Option<&'a Play> {
    if let Some(target) = play_id {
        let exact = plays
            .iter()
            .find(|play| play.id.as_deref() == Some(target));
        let fuzzy = || {
            plays.iter().find(|play| {
                play.id
                    .as_deref()
                    .map(|id| id.contains(target) || target.contains(id))
                    .unwrap_or(false)
            })
        };
        if let Some(found) = exact.or_else(fuzzy) {
            return Some(found);
        }
    }
    plays.last()
}

/// Seconds of game time elapsed at a point, from its period and remaining
/// clock, capped at regulation length.
pub fn elapsed_seconds(period: i64, clock: &str) -> Option<u32> {
    let (minutes, seconds) = clock.trim().split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    let remaining = (minutes * 60 + seconds).min(PERIOD_SECONDS);
    // Overtime periods land past regulation and get capped anyway.
    let period = period.clamp(1, 5) as u32;
    let elapsed = (period - 1) * PERIOD_SECONDS + (PERIOD_SECONDS - remaining);
    Some(elapsed.min(GAME_SECONDS))
}

/// Horizontal chart positions in [0, 1] for the series: game-clock elapsed
/// time when every point carries a parseable clock, even spacing otherwise.
/// The vertical axis is the caller's concern; it must stay symmetric about
/// the 50% center line.
pub fn chart_positions(points: &[WinProbabilityPoint]) -> Vec<f64> {
    if points.is_empty() {
        return Vec::new();
    }
    let clocked: Option<Vec<u32>> = points
        .iter()
        .map(|point| {
            let period = point.period?;
            elapsed_seconds(period, point.clock.as_deref()?)
        })
        .collect();

    match clocked {
        Some(seconds) => seconds
            .into_iter()
            .map(|s| f64::from(s) / f64::from(GAME_SECONDS))
            .collect(),
        None => even_spacing(points.len()),
    }
}

fn even_spacing(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![0.0];
    }
    (0..len).map(|i| i as f64 / (len - 1) as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn play(period: i64, away: i64, home: i64, scoring: bool) -> Play {
        Play {
            id: None,
            text: String::new(),
            type_text: None,
            period: Some(period),
            clock: None,
            away_score: Some(away),
            home_score: Some(home),
            scoring,
            team_id: None,
        }
    }

    // ── Period reconstruction ────────────────────────────────────────────

    #[test]
    fn reconstructs_buckets_from_scoring_plays() {
        let plays = vec![
            play(1, 7, 0, true),
            play(2, 7, 3, true),
            play(2, 14, 3, true),
            play(4, 14, 10, true),
        ];
        let (away, home) = reconstruct_period_scores(&plays);
        assert_eq!(away, [7, 7, 0, 0, 0]);
        assert_eq!(home, [0, 3, 0, 7, 0]);
    }

    #[test]
    fn untagged_score_movement_still_counts() {
        // No scoring flag, no type text: the score moved, so it qualifies.
        let plays = vec![play(1, 0, 0, false), play(1, 3, 0, false)];
        let (away, home) = reconstruct_period_scores(&plays);
        assert_eq!(away, [3, 0, 0, 0, 0]);
        assert_eq!(home, [0, 0, 0, 0, 0]);
    }

    #[test]
    fn corrected_entries_never_double_credit() {
        // Score regresses (correction) then advances again: the regression
        // credits nothing, and only the advance past the prior high-water
        // mark lands in a bucket. Bucket sums stay within the real score.
        let plays = vec![
            play(1, 7, 0, true),
            play(2, 3, 0, true),
            play(2, 10, 0, true),
        ];
        let (away, _) = reconstruct_period_scores(&plays);
        assert_eq!(away, [7, 3, 0, 0, 0]);
        assert!(away.iter().sum::<u32>() <= 10);
    }

    #[test]
    fn out_of_order_entries_are_redistributed_by_period() {
        // Encountered newest-first; the stable period sort restores order
        // before the walk.
        let plays = vec![play(2, 10, 0, true), play(1, 7, 0, true)];
        let (away, _) = reconstruct_period_scores(&plays);
        assert_eq!(away, [7, 3, 0, 0, 0]);
    }

    #[test]
    fn buckets_never_exceed_final_score() {
        let plays = vec![
            play(1, 7, 7, true),
            play(2, 10, 7, true),
            play(3, 10, 14, true),
            play(4, 17, 21, true),
        ];
        let (away, home) = reconstruct_period_scores(&plays);
        assert!(away.iter().sum::<u32>() <= 17);
        assert!(home.iter().sum::<u32>() <= 21);
    }

    #[test]
    fn overtime_periods_clamp_to_slot_five() {
        let plays = vec![play(4, 7, 7, true), play(6, 10, 7, true)];
        let (away, _) = reconstruct_period_scores(&plays);
        assert_eq!(away[4], 3);
    }

    #[test]
    fn reconstruction_is_deterministic() {
        let plays = vec![play(1, 7, 0, true), play(2, 7, 3, true)];
        assert_eq!(
            reconstruct_period_scores(&plays),
            reconstruct_period_scores(&plays)
        );
    }

    #[test]
    fn scoring_type_text_qualifies_play() {
        let mut td = play(1, 7, 0, false);
        td.type_text = Some("Rushing Touchdown".to_string());
        let (away, _) = reconstruct_period_scores(&[td]);
        assert_eq!(away[0], 7);
    }

    // ── Win probability ──────────────────────────────────────────────────

    #[test]
    fn normalizes_fraction_array() {
        let raw = json!([
            {"homeWinPercentage": 0.62, "playId": "p1"},
            {"homeWinPercentage": 0.70, "playId": "p2"}
        ]);
        let points = normalize_win_probability(&raw);
        assert_eq!(points.len(), 2);
        for point in &points {
            assert!(point.home >= 0.0 && point.home <= 1.0);
            assert_relative_eq!(point.home + point.away, 1.0, epsilon = 1e-9);
        }
        assert_relative_eq!(points[1].home, 0.70, epsilon = 1e-9);
        assert_relative_eq!(points[1].away, 0.30, epsilon = 1e-9);
    }

    #[test]
    fn percentages_are_divided_down() {
        let raw = json!([{"homeWinPercentage": 62.0}]);
        let points = normalize_win_probability(&raw);
        assert_relative_eq!(points[0].home, 0.62, epsilon = 1e-9);
        assert_relative_eq!(points[0].home + points[0].away, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn bare_number_becomes_single_point() {
        let points = normalize_win_probability(&json!(0.55));
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].home, 0.55, epsilon = 1e-9);
        assert_relative_eq!(points[0].away, 0.45, epsilon = 1e-9);

        let pct = normalize_win_probability(&json!(55));
        assert_relative_eq!(pct[0].home, 0.55, epsilon = 1e-9);
    }

    #[test]
    fn away_only_fills_home_complement() {
        let raw = json!({"awayWinProbability": 0.25});
        let points = normalize_win_probability(&raw);
        assert_relative_eq!(points[0].home, 0.75, epsilon = 1e-9);
        assert_relative_eq!(points[0].away, 0.25, epsilon = 1e-9);
    }

    #[test]
    fn predictor_object_shape_is_understood() {
        let raw = json!({"homeTeam": {"winProbability": 83.1}});
        let points = normalize_win_probability(&raw);
        assert_relative_eq!(points[0].home, 0.831, epsilon = 1e-9);
    }

    #[test]
    fn unrecognized_values_yield_empty_series() {
        assert!(normalize_win_probability(&json!(null)).is_empty());
        assert!(normalize_win_probability(&json!({"foo": 1})).is_empty());
        assert!(normalize_win_probability(&json!("0.5")).is_empty());
    }

    // ── Play attribution ─────────────────────────────────────────────────

    fn id_play(id: &str) -> Play {
        Play {
            id: Some(id.to_string()),
            text: format!("play {}", id),
            ..Play::default()
        }
    }

    #[test]
    fn attribution_prefers_exact_id() {
        let plays = vec![id_play("100"), id_play("200")];
        let points = normalize_win_probability(&json!([
            {"homeWinPercentage": 0.5, "playId": "200"}
        ]));
        let latest = latest_win_probability(&points, &plays).unwrap();
        assert_eq!(latest.play.unwrap().id.as_deref(), Some("200"));
    }

    #[test]
    fn attribution_falls_back_to_substring_then_last() {
        let plays = vec![id_play("abc100"), id_play("xyz")];
        // "100" is a substring of "abc100", the truncated-id case.
        let points = normalize_win_probability(&json!([
            {"homeWinPercentage": 0.5, "playId": "100"}
        ]));
        let latest = latest_win_probability(&points, &plays).unwrap();
        assert_eq!(latest.play.unwrap().id.as_deref(), Some("abc100"));

        // Unknown id: the chronologically last play wins.
        let points = normalize_win_probability(&json!([
            {"homeWinPercentage": 0.5, "playId": "nope"}
        ]));
        let latest = latest_win_probability(&points, &plays).unwrap();
        assert_eq!(latest.play.unwrap().id.as_deref(), Some("xyz"));
    }

    #[test]
    fn no_points_no_snapshot() {
        assert!(latest_win_probability(&[], &[id_play("1")]).is_none());
    }

    // ── Chart time axis ──────────────────────────────────────────────────

    #[test]
    fn elapsed_seconds_mapping() {
        // Start of the game: 15:00 left in Q1.
        assert_eq!(elapsed_seconds(1, "15:00"), Some(0));
        // 4:21 left in Q2.
        assert_eq!(elapsed_seconds(2, "4:21"), Some(900 + 900 - 261));
        // End of regulation.
        assert_eq!(elapsed_seconds(4, "0:00"), Some(3600));
        // Overtime caps at regulation length.
        assert_eq!(elapsed_seconds(5, "10:00"), Some(3600));
        assert_eq!(elapsed_seconds(1, "bogus"), None);
    }

    #[test]
    fn chart_positions_use_clock_when_complete() {
        let raw = json!([
            {"homeWinPercentage": 0.5, "period": {"number": 1}, "clock": {"displayValue": "15:00"}},
            {"homeWinPercentage": 0.6, "period": {"number": 2}, "clock": {"displayValue": "15:00"}},
            {"homeWinPercentage": 0.7, "period": {"number": 4}, "clock": {"displayValue": "0:00"}}
        ]);
        let points = normalize_win_probability(&raw);
        let positions = chart_positions(&points);
        assert_relative_eq!(positions[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(positions[1], 0.25, epsilon = 1e-9);
        assert_relative_eq!(positions[2], 1.0, epsilon = 1e-9);
        // Monotone in game time.
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn chart_positions_fall_back_to_even_spacing() {
        let raw = json!([
            {"homeWinPercentage": 0.5},
            {"homeWinPercentage": 0.6},
            {"homeWinPercentage": 0.7}
        ]);
        let points = normalize_win_probability(&raw);
        let positions = chart_positions(&points);
        assert_relative_eq!(positions[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(positions[1], 0.5, epsilon = 1e-9);
        assert_relative_eq!(positions[2], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn single_point_sits_at_origin() {
        let points = normalize_win_probability(&json!(0.5));
        assert_eq!(chart_positions(&points), vec![0.0]);
    }
}
