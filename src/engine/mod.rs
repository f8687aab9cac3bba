//! The normalization and derivation engine.
//!
//! Everything in here is pure and synchronous: raw `serde_json::Value`
//! documents in, canonical records out. Shape mismatches never raise;
//! each field resolves through a documented fallback chain to a safe
//! default, and unmatchable entities are dropped rather than fabricated.

pub mod analytics;
pub mod diag;
pub mod extract;
pub mod ordering;
pub mod scoreboard;
pub mod situation;
pub mod standings;
pub mod summary;

pub use analytics::{chart_positions, normalize_win_probability, reconstruct_period_scores};
pub use ordering::{compare_games, is_live, sort_games};
pub use scoreboard::normalize_event;
pub use standings::filter_standings;
pub use summary::extract_detail;
