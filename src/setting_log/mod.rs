//! SettingLog - the shared, append-only record of everything settings do.
//!
//! Every setting of every mock device in a test session appends to one
//! `SettingLog`. Appends are serialised by a single mutex and stamped with a
//! strictly increasing sequence number while the lock is held, so the log is a
//! total order that agrees with real happens-before: if one append returns
//! before another starts, its `seq` is smaller, whichever threads and devices
//! were involved.
//!
//! The log also owns busy bookkeeping. Settings call [`SettingLog::mark_busy`]
//! after a mutation and forget about it; the [`BusyPolicy`] decides how long the
//! device then answers `true` to [`SettingLog::is_busy`].
//!
//! # Example
//!
//! ```rust,ignore
//! let log = SettingLog::shared();
//! log.append("Stage", Some("Position"), OperationKind::Set, Some(LoggedValue::Float(1.5)));
//! log.mark_busy("Stage");
//!
//! assert!(log.is_busy("Stage"));
//! assert_eq!(log.current_value("Stage", "Position"), Some(LoggedValue::Float(1.5)));
//! ```

mod busy;
mod entry;

pub use busy::BusyPolicy;
pub use entry::{EntryFilter, LogEntry, LoggedValue, OperationKind};

use busy::BusyTracker;
use chrono::Utc;
use parking_lot::Mutex;
use std::ops::RangeBounds;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;

use crate::config::LogConfig;

/// Default capacity of the live entry feed.
pub const DEFAULT_FEED_CAPACITY: usize = 1024;

struct LogState {
    entries: Vec<LogEntry>,
    next_seq: u64,
    policy: BusyPolicy,
    busy: BusyTracker,
}

/// Thread-safe, totally ordered event log shared by all settings in a session.
pub struct SettingLog {
    state: Mutex<LogState>,
    feed: broadcast::Sender<LogEntry>,
    trace_entries: bool,
}

impl std::fmt::Debug for SettingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SettingLog")
            .field("entries", &state.entries.len())
            .field("next_seq", &state.next_seq)
            .field("policy", &state.policy)
            .finish_non_exhaustive()
    }
}

impl Default for SettingLog {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingLog {
    /// Log with the default [`BusyPolicy::ClearOnQuery`] policy.
    pub fn new() -> Self {
        Self::with_policy(BusyPolicy::default())
    }

    /// Log with an explicit busy policy.
    pub fn with_policy(policy: BusyPolicy) -> Self {
        Self::build(policy, true, DEFAULT_FEED_CAPACITY)
    }

    /// Log configured from the `[log]` section.
    pub fn from_config(config: &LogConfig) -> Self {
        Self::build(
            config.busy_policy(),
            config.trace_entries,
            config.broadcast_capacity,
        )
    }

    /// `Arc`-wrapped default log, ready to hand to devices.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn build(policy: BusyPolicy, trace_entries: bool, capacity: usize) -> Self {
        // broadcast::channel panics on zero capacity
        let (feed, _) = broadcast::channel(capacity.max(1));
        Self {
            state: Mutex::new(LogState {
                entries: Vec::new(),
                next_seq: 0,
                policy,
                busy: BusyTracker::default(),
            }),
            feed,
            trace_entries,
        }
    }

    // -------------------------------------------------------------------------
    // Appending
    // -------------------------------------------------------------------------

    /// Append one entry and return its sequence number.
    pub fn append(
        &self,
        device: &str,
        setting: Option<&str>,
        kind: OperationKind,
        value: Option<LoggedValue>,
    ) -> u64 {
        let mut state = self.state.lock();
        self.push(&mut state, device, setting, kind, value)
    }

    fn push(
        &self,
        state: &mut LogState,
        device: &str,
        setting: Option<&str>,
        kind: OperationKind,
        value: Option<LoggedValue>,
    ) -> u64 {
        let seq = state.next_seq;
        state.next_seq += 1;

        let entry = LogEntry {
            seq,
            timestamp: Utc::now(),
            device: device.to_string(),
            setting: setting.map(str::to_string),
            kind,
            value,
        };

        if self.trace_entries {
            tracing::trace!(
                seq,
                device,
                setting = setting.unwrap_or("-"),
                kind = %kind,
                value = ?value,
                "setting log entry"
            );
        }

        // Sent under the lock so subscribers observe log order. No receivers is fine.
        let _ = self.feed.send(entry.clone());
        state.entries.push(entry);
        seq
    }

    /// Record that `device` should be considered busy. Never fails or blocks.
    pub fn mark_busy(&self, device: &str) {
        let mut state = self.state.lock();
        state.busy.mark(device, Instant::now());
        self.push(&mut state, device, None, OperationKind::Busy, None);
    }

    /// Ask whether `device` is busy. The query and its answer are logged.
    pub fn is_busy(&self, device: &str) -> bool {
        let mut state = self.state.lock();
        let policy = state.policy;
        let busy = state.busy.query(policy, device, Instant::now());
        self.push(
            &mut state,
            device,
            None,
            OperationKind::BusyQuery,
            Some(LoggedValue::Bool(busy)),
        );
        busy
    }

    /// Clear a busy mark regardless of policy. Returns whether one was set.
    pub fn clear_busy(&self, device: &str) -> bool {
        self.state.lock().busy.clear(device)
    }

    /// Current busy policy.
    pub fn busy_policy(&self) -> BusyPolicy {
        self.state.lock().policy
    }

    /// Switch busy policy. Existing marks are kept.
    pub fn set_busy_policy(&self, policy: BusyPolicy) {
        self.state.lock().policy = policy;
    }

    /// Drop all entries and busy marks. Sequence numbers keep increasing.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.busy.clear_all();
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Snapshot of all entries in log order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.state.lock().entries.clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Sequence number the next entry will receive.
    pub fn next_seq(&self) -> u64 {
        self.state.lock().next_seq
    }

    /// Entries matching `filter`, in log order.
    pub fn filter(&self, filter: &EntryFilter) -> Vec<LogEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    /// Entries recorded for one setting (device-level entries excluded).
    pub fn entries_for_setting(&self, device: &str, setting: &str) -> Vec<LogEntry> {
        self.filter(&EntryFilter::for_setting(device, setting))
    }

    /// Sequence number of the first entry matching `filter`.
    pub fn position(&self, filter: &EntryFilter) -> Option<u64> {
        self.state
            .lock()
            .entries
            .iter()
            .find(|entry| filter.matches(entry))
            .map(|entry| entry.seq)
    }

    /// Whether the first match of `first` precedes the first match of `second`.
    ///
    /// `None` when either filter matches nothing.
    pub fn happened_before(&self, first: &EntryFilter, second: &EntryFilter) -> Option<bool> {
        let state = self.state.lock();
        let find = |filter: &EntryFilter| {
            state
                .entries
                .iter()
                .find(|entry| filter.matches(entry))
                .map(|entry| entry.seq)
        };
        Some(find(first)? < find(second)?)
    }

    /// Entries whose sequence number falls in `range`.
    pub fn range<R: RangeBounds<u64>>(&self, range: R) -> Vec<LogEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|entry| range.contains(&entry.seq))
            .cloned()
            .collect()
    }

    /// Value of the most recent committed `Set` of a setting.
    pub fn current_value(&self, device: &str, setting: &str) -> Option<LoggedValue> {
        self.state
            .lock()
            .entries
            .iter()
            .rev()
            .find(|entry| entry.kind == OperationKind::Set && entry.is_for(device, setting))
            .and_then(|entry| entry.value)
    }

    /// Pretty JSON dump of all entries, for failure diagnostics.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.state.lock().entries)
    }

    /// Live feed of entries appended from now on, in log order.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.feed.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn sequence_numbers_increase() {
        let log = SettingLog::new();
        let a = log.append("Stage", Some("Position"), OperationKind::Set, None);
        let b = log.append("Camera", Some("Exposure"), OperationKind::Get, None);
        assert!(a < b);
        assert_eq!(log.len(), 2);
        assert_eq!(log.next_seq(), b + 1);
    }

    #[test]
    fn busy_marks_are_device_level_entries() {
        let log = SettingLog::new();
        log.mark_busy("Shutter");
        assert!(log.is_busy("Shutter"));
        assert!(!log.is_busy("Shutter"));

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, OperationKind::Busy);
        assert!(entries[0].setting.is_none());
        assert_eq!(entries[1].kind, OperationKind::BusyQuery);
        assert_eq!(entries[1].value, Some(LoggedValue::Bool(true)));
        assert_eq!(entries[2].value, Some(LoggedValue::Bool(false)));
    }

    #[test]
    fn manual_policy_and_switching() {
        let log = SettingLog::with_policy(BusyPolicy::Manual);
        log.mark_busy("Hub");
        assert!(log.is_busy("Hub"));
        assert!(log.is_busy("Hub"));
        assert!(log.clear_busy("Hub"));
        assert!(!log.is_busy("Hub"));

        log.set_busy_policy(BusyPolicy::Timed(Duration::from_secs(60)));
        assert_eq!(log.busy_policy(), BusyPolicy::Timed(Duration::from_secs(60)));
        log.mark_busy("Hub");
        assert!(log.is_busy("Hub"));
    }

    #[test]
    fn queries_select_entries() {
        let log = SettingLog::new();
        log.append(
            "Camera",
            Some("Exposure"),
            OperationKind::Set,
            Some(LoggedValue::Float(10.0)),
        );
        log.append(
            "Shutter",
            Some("State"),
            OperationKind::Set,
            Some(LoggedValue::Bool(true)),
        );
        log.append(
            "Camera",
            Some("Exposure"),
            OperationKind::Set,
            Some(LoggedValue::Float(20.0)),
        );

        let exposure = EntryFilter::for_setting("Camera", "Exposure");
        let shutter = EntryFilter::for_setting("Shutter", "State");
        assert_eq!(log.filter(&exposure).len(), 2);
        assert_eq!(log.position(&shutter), Some(1));
        assert_eq!(log.happened_before(&exposure, &shutter), Some(true));
        assert_eq!(log.happened_before(&shutter, &exposure), Some(false));
        assert_eq!(
            log.happened_before(&exposure, &EntryFilter::new().device("Stage")),
            None
        );
        assert_eq!(log.range(1..).len(), 2);
        assert_eq!(
            log.current_value("Camera", "Exposure"),
            Some(LoggedValue::Float(20.0))
        );
        assert_eq!(log.current_value("Camera", "Gain"), None);
    }

    #[test]
    fn clear_keeps_sequence_monotonic() {
        let log = SettingLog::new();
        log.append("A", Some("x"), OperationKind::Get, None);
        log.mark_busy("A");
        log.clear();
        assert!(log.is_empty());
        let seq = log.append("A", Some("x"), OperationKind::Get, None);
        assert_eq!(seq, 2);
        // Busy marks were cleared too; only the query itself is logged.
        assert!(!log.is_busy("A"));
    }

    #[test]
    fn json_dump_contains_entries() {
        let log = SettingLog::new();
        log.append(
            "Stage",
            Some("Position"),
            OperationKind::Set,
            Some(LoggedValue::Integer(5)),
        );
        let json = log.to_json().unwrap();
        let parsed: Vec<LogEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, log.entries());
    }

    #[tokio::test]
    async fn subscribers_see_entries_in_order() {
        let log = SettingLog::new();
        let mut rx = log.subscribe();
        log.append("Stage", Some("Position"), OperationKind::Set, None);
        log.mark_busy("Stage");

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, OperationKind::Set);
        assert_eq!(second.kind, OperationKind::Busy);
        assert!(first.seq < second.seq);
    }
}
