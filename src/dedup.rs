//! Suppression of repeated notifications within a cool-down window.
//!
//! A re-read or repeated bot announcement must not re-fire a push. Events
//! are fingerprinted by pattern identifier plus speaker; a key admitted
//! within the cool-down window is suppressed until the window elapses.
//! State lives in memory only — nothing persists across restarts.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::matcher::TriggerEvent;

/// Fingerprint of a logical trigger event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    pattern: &'static str,
    speaker: Option<String>,
}

impl DedupKey {
    fn from_event(event: &TriggerEvent) -> Self {
        Self {
            pattern: event.pattern.id,
            speaker: event.speaker.as_ref().map(|s| s.to_ascii_lowercase()),
        }
    }
}

/// Admits each logical trigger at most once per cool-down window.
///
/// Single-writer: owned by the monitor loop, no locking needed.
#[derive(Debug)]
pub struct DedupGate {
    window: Duration,
    seen: HashMap<DedupKey, Instant>,
}

impl DedupGate {
    /// Create a gate with the given cool-down window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: HashMap::new(),
        }
    }

    /// Decide whether `event` may be dispatched.
    ///
    /// Returns `false` (suppressed) if the same key was admitted within the
    /// cool-down window. Expired entries are evicted lazily on each call.
    pub fn admit(&mut self, event: &TriggerEvent) -> bool {
        self.admit_at(event, Instant::now())
    }

    /// [`admit`](Self::admit) with an injected clock, for deterministic
    /// window tests.
    pub fn admit_at(&mut self, event: &TriggerEvent, now: Instant) -> bool {
        self.seen
            .retain(|_, admitted| now.saturating_duration_since(*admitted) < self.window);

        let key = DedupKey::from_event(event);
        if self.seen.contains_key(&key) {
            debug!(pattern = key.pattern, "duplicate trigger suppressed");
            return false;
        }
        self.seen.insert(key, now);
        true
    }
}
