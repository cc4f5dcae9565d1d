//! Busy-state bookkeeping per device.
//!
//! Settings only ever *mark* a device busy. How long the mark lasts is decided
//! here, by the policy the test session picked.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// When a busy mark is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyPolicy {
    /// The first `is_busy` query after a mark answers `true` and clears it.
    #[default]
    ClearOnQuery,
    /// Busy until the duration has elapsed since the most recent mark.
    Timed(Duration),
    /// Busy until the test calls `clear_busy`.
    Manual,
}

#[derive(Debug, Default)]
pub(crate) struct BusyTracker {
    marks: HashMap<String, Instant>,
}

impl BusyTracker {
    pub(crate) fn mark(&mut self, device: &str, now: Instant) {
        self.marks.insert(device.to_string(), now);
    }

    pub(crate) fn query(&mut self, policy: BusyPolicy, device: &str, now: Instant) -> bool {
        match policy {
            BusyPolicy::ClearOnQuery => self.marks.remove(device).is_some(),
            BusyPolicy::Timed(duration) => match self.marks.get(device) {
                Some(marked_at) if now.saturating_duration_since(*marked_at) < duration => true,
                Some(_) => {
                    self.marks.remove(device);
                    false
                }
                None => false,
            },
            BusyPolicy::Manual => self.marks.contains_key(device),
        }
    }

    pub(crate) fn clear(&mut self, device: &str) -> bool {
        self.marks.remove(device).is_some()
    }

    pub(crate) fn clear_all(&mut self) {
        self.marks.clear();
    }
}
