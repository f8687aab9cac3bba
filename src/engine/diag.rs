//! One-shot diagnostics keyed by event name.
//!
//! Feed anomalies (an unknown standings shape, a play log with no scores)
//! repeat on every poll; emitting them once per process keeps the log
//! readable without hiding the signal.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};
use tracing::warn;

static SEEN: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Emit `message` at warn level the first time `event` is seen; subsequent
/// calls with the same event are no-ops. Returns whether the message was
/// emitted.
pub fn warn_once(event: &str, message: &str) -> bool {
    let seen = SEEN.get_or_init(|| Mutex::new(HashSet::new()));
    let mut seen = match seen.lock() {
        Ok(guard) => guard,
        // A poisoned lock only means another thread panicked mid-insert;
        // the set itself is still usable.
        Err(poisoned) => poisoned.into_inner(),
    };
    if seen.insert(event.to_string()) {
        warn!(event, "{}", message);
        true
    } else {
        false
    }
}
