//! Standings Matcher: reduce a raw standings tree to the divisions
//! containing a given pair of teams.
//!
//! Four document shapes exist upstream. A shape-detection step resolves
//! which one arrived so each branch is handled exhaustively instead of
//! duck-typing its way through the tree.

use serde_json::Value;

use crate::engine::diag;
use crate::engine::extract::{arr_of, id_of, num_of, str_of, string_of};
use crate::model::{FilteredStandings, StandingsEntry, StandingsGroup, TeamIdentifiers};

/// The known upstream layouts for a standings document.
enum StandingsShape<'a> {
    /// `children` conferences, each optionally subdivided into divisions.
    ConferenceTree(&'a [Value]),
    /// A single flat `standings.entries` list.
    FlatEntries(&'a Value),
    /// A `groups` array of leaf groupings.
    Groups(&'a [Value]),
    /// The document itself is an array of groupings.
    TopArray(&'a [Value]),
    Unknown,
}

fn detect_shape(doc: &Value) -> StandingsShape<'_> {
    if let Some(children) = doc.get("children").and_then(Value::as_array) {
        if !children.is_empty() {
            return StandingsShape::ConferenceTree(children);
        }
    }
    if doc
        .get("standings")
        .map(|standings| !arr_of(standings, "entries").is_empty())
        .unwrap_or(false)
    {
        return StandingsShape::FlatEntries(doc);
    }
    if let Some(groups) = doc.get("groups").and_then(Value::as_array) {
        if !groups.is_empty() {
            return StandingsShape::Groups(groups);
        }
    }
    if let Some(items) = doc.as_array() {
        if !items.is_empty() {
            return StandingsShape::TopArray(items);
        }
    }
    StandingsShape::Unknown
}

/// Filter a raw standings document down to the groupings containing the
/// identified teams.
///
/// Returns the matching groups when any team is found; the first two
/// groupings flagged `approximate` when none match; `None` only when the
/// document contains no recognizable grouping at all.
pub fn filter_standings(doc: &Value, idents: &TeamIdentifiers) -> Option<FilteredStandings> {
    let raw_groups = collect_leaf_groups(doc);
    let groups: Vec<StandingsGroup> = raw_groups.iter().filter_map(|g| parse_group(g)).collect();
    if groups.is_empty() {
        return None;
    }

    let matching: Vec<StandingsGroup> = groups
        .iter()
        .filter(|group| group.entries.iter().any(|entry| entry_matches(entry, idents)))
        .cloned()
        .collect();

    if !matching.is_empty() {
        return Some(FilteredStandings {
            groups: matching,
            approximate: false,
        });
    }

    // No team matched anywhere: hand back the first two groupings so the
    // caller can still render something, explicitly marked approximate.
    Some(FilteredStandings {
        groups: groups.into_iter().take(2).collect(),
        approximate: true,
    })
}

/// Every leaf grouping in whichever shape the document uses, in encounter
/// order.
fn collect_leaf_groups(doc: &Value) -> Vec<&Value> {
    match detect_shape(doc) {
        StandingsShape::ConferenceTree(conferences) => conferences
            .iter()
            .flat_map(|conference| {
                let divisions = arr_of(conference, "children");
                if divisions.is_empty() {
                    // Conference-level standings with no division subdivision.
                    vec![conference]
                } else {
                    divisions.iter().collect()
                }
            })
            .collect(),
        StandingsShape::FlatEntries(doc) => vec![doc],
        StandingsShape::Groups(groups) => groups.iter().collect(),
        StandingsShape::TopArray(items) => items
            .iter()
            .flat_map(|item| {
                let children = arr_of(item, "children");
                if children.is_empty() {
                    vec![item]
                } else {
                    children.iter().collect()
                }
            })
            .collect(),
        StandingsShape::Unknown => {
            diag::warn_once(
                "standings-unknown-shape",
                "standings document matched no known layout",
            );
            Vec::new()
        }
    }
}

/// Parse one grouping; groupings with no entries are dropped. Entries come
/// out sorted by wins desc, then win-percentage desc.
fn parse_group(group: &Value) -> Option<StandingsGroup> {
    let entries_raw = arr_of(group.get("standings")?, "entries");
    if entries_raw.is_empty() {
        return None;
    }

    let mut entries: Vec<StandingsEntry> = entries_raw.iter().map(parse_entry).collect();
    entries.sort_by(|a, b| {
        b.wins
            .partial_cmp(&a.wins)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                b.win_percent
                    .partial_cmp(&a.win_percent)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    Some(StandingsGroup {
        name: string_of(group, &["name", "abbreviation", "shortName"])
            .unwrap_or_else(|| "Standings".to_string()),
        entries,
    })
}

fn parse_entry(entry: &Value) -> StandingsEntry {
    let team = entry.get("team").unwrap_or(&Value::Null);
    StandingsEntry {
        team_id: id_of(team, &["id"]),
        name: string_of(team, &["displayName", "name"]).unwrap_or_default(),
        abbreviation: string_of(team, &["abbreviation"]),
        wins: stat_value(entry, "wins").unwrap_or(0.0),
        losses: stat_value(entry, "losses").unwrap_or(0.0),
        win_percent: stat_value(entry, "winPercent").unwrap_or(0.0),
    }
}

fn stat_value(entry: &Value, name: &str) -> Option<f64> {
    arr_of(entry, "stats")
        .iter()
        .find(|stat| str_of(stat, &["name"]) == Some(name))
        .and_then(|stat| num_of(stat, &["value"]))
}

/// Id exact match, or name containment in either direction, or
/// abbreviation exact match — all case-insensitive, and each identifier
/// list may be empty.
fn entry_matches(entry: &StandingsEntry, idents: &TeamIdentifiers) -> bool {
    if let Some(team_id) = &entry.team_id {
        if idents.ids.iter().any(|id| id == team_id) {
            return true;
        }
    }

    let entry_name = entry.name.to_lowercase();
    if !entry_name.is_empty()
        && idents.names.iter().any(|name| {
            let name = name.to_lowercase();
            entry_name.contains(&name) || name.contains(&entry_name)
        })
    {
        return true;
    }

    if let Some(abbr) = &entry.abbreviation {
        let abbr = abbr.to_lowercase();
        if idents
            .abbreviations
            .iter()
            .any(|candidate| candidate.to_lowercase() == abbr)
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str, name: &str, abbr: &str, wins: f64, losses: f64) -> Value {
        let games = wins + losses;
        json!({
            "team": {"id": id, "displayName": name, "abbreviation": abbr},
            "stats": [
                {"name": "wins", "value": wins},
                {"name": "losses", "value": losses},
                {"name": "winPercent", "value": if games > 0.0 { wins / games } else { 0.0 }}
            ]
        })
    }

    fn conference_tree() -> Value {
        json!({
            "children": [
                {"name": "East Conference", "children": [
                    {"name": "North Division", "standings": {"entries": [
                        entry("7", "Riverton Bears", "RIV", 10.0, 4.0),
                        entry("9", "Lakeside Gulls", "LAK", 11.0, 3.0),
                        entry("12", "Harbor Owls", "HAR", 6.0, 8.0)
                    ]}},
                    {"name": "South Division", "standings": {"entries": [
                        entry("21", "Dune Foxes", "DUN", 9.0, 5.0)
                    ]}}
                ]},
                {"name": "West Conference", "children": [
                    {"name": "Coast Division", "standings": {"entries": [
                        entry("31", "Summit Elk", "SUM", 8.0, 6.0)
                    ]}}
                ]}
            ]
        })
    }

    fn idents(ids: &[&str], names: &[&str], abbrs: &[&str]) -> TeamIdentifiers {
        TeamIdentifiers {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            names: names.iter().map(|s| s.to_string()).collect(),
            abbreviations: abbrs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn two_teams_in_same_division_yield_exactly_that_division() {
        let result = filter_standings(
            &conference_tree(),
            &idents(&["7", "9"], &["Riverton Bears", "Lakeside Gulls"], &[]),
        )
        .unwrap();
        assert!(!result.approximate);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].name, "North Division");
    }

    #[test]
    fn teams_in_different_divisions_yield_both() {
        let result = filter_standings(&conference_tree(), &idents(&["7", "31"], &[], &[])).unwrap();
        assert!(!result.approximate);
        let names: Vec<&str> = result.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["North Division", "Coast Division"]);
    }

    #[test]
    fn entries_sorted_by_wins_then_percentage() {
        let result = filter_standings(&conference_tree(), &idents(&["7"], &[], &[])).unwrap();
        let entries = &result.groups[0].entries;
        assert_eq!(entries[0].name, "Lakeside Gulls");
        assert_eq!(entries[1].name, "Riverton Bears");
        assert_eq!(entries[2].name, "Harbor Owls");
    }

    #[test]
    fn no_match_falls_back_to_first_two_groups_marked_approximate() {
        let result =
            filter_standings(&conference_tree(), &idents(&["404"], &["Nowhere FC"], &[])).unwrap();
        assert!(result.approximate);
        assert_eq!(result.groups.len(), 2);
        assert_eq!(result.groups[0].name, "North Division");
        assert_eq!(result.groups[1].name, "South Division");
    }

    #[test]
    fn name_containment_matches_either_direction() {
        let result = filter_standings(&conference_tree(), &idents(&[], &["Riverton"], &[])).unwrap();
        assert!(!result.approximate);
        assert_eq!(result.groups[0].name, "North Division");

        // Identifier longer than the entry name.
        let result = filter_standings(
            &conference_tree(),
            &idents(&[], &["Dune Foxes Football Club"], &[]),
        )
        .unwrap();
        assert!(!result.approximate);
        assert_eq!(result.groups[0].name, "South Division");
    }

    #[test]
    fn abbreviation_matches_exactly_case_insensitive() {
        let result = filter_standings(&conference_tree(), &idents(&[], &[], &["sum"])).unwrap();
        assert!(!result.approximate);
        assert_eq!(result.groups[0].name, "Coast Division");
    }

    #[test]
    fn conference_only_tree_uses_conference_groupings() {
        let doc = json!({
            "children": [
                {"name": "East", "standings": {"entries": [entry("7", "Riverton Bears", "RIV", 3.0, 1.0)]}},
                {"name": "West", "standings": {"entries": [entry("31", "Summit Elk", "SUM", 2.0, 2.0)]}}
            ]
        });
        let result = filter_standings(&doc, &idents(&["7"], &[], &[])).unwrap();
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].name, "East");
    }

    #[test]
    fn flat_entries_shape() {
        let doc = json!({
            "name": "League Table",
            "standings": {"entries": [
                entry("7", "Riverton Bears", "RIV", 3.0, 1.0),
                entry("9", "Lakeside Gulls", "LAK", 1.0, 3.0)
            ]}
        });
        let result = filter_standings(&doc, &idents(&["9"], &[], &[])).unwrap();
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].name, "League Table");
        assert_eq!(result.groups[0].entries[0].name, "Riverton Bears");
    }

    #[test]
    fn top_level_array_shape() {
        let doc = json!([
            {"name": "Group A", "standings": {"entries": [entry("7", "Riverton Bears", "RIV", 3.0, 1.0)]}},
            {"name": "Group B", "standings": {"entries": [entry("9", "Lakeside Gulls", "LAK", 2.0, 2.0)]}}
        ]);
        let result = filter_standings(&doc, &idents(&["9"], &[], &[])).unwrap();
        assert_eq!(result.groups[0].name, "Group B");
    }

    #[test]
    fn unrecognizable_document_is_none() {
        assert!(filter_standings(&json!({"events": []}), &idents(&["7"], &[], &[])).is_none());
        assert!(filter_standings(&json!(null), &idents(&["7"], &[], &[])).is_none());
    }

    #[test]
    fn empty_identifiers_degrade_to_approximate_fallback() {
        let result = filter_standings(&conference_tree(), &TeamIdentifiers::default()).unwrap();
        assert!(result.approximate);
        assert_eq!(result.groups.len(), 2);
    }
}
