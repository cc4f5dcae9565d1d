//! Log entry types and query filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// A committed value change, or a one-shot event (no value).
    Set,
    /// A value read.
    Get,
    /// The device was marked busy after a mutation.
    Busy,
    /// Someone asked whether the device is busy; the value is the answer.
    BusyQuery,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::Set => "set",
            OperationKind::Get => "get",
            OperationKind::Busy => "busy",
            OperationKind::BusyQuery => "busy_query",
        };
        write!(f, "{}", label)
    }
}

/// Canonical value recorded with an entry.
///
/// Always the native value; display modes of the property bridge never leak
/// into the log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggedValue {
    /// Boolean setting value or busy-query answer.
    Bool(bool),
    /// Integer setting value.
    Integer(i64),
    /// Float setting value.
    Float(f64),
}

impl fmt::Display for LoggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggedValue::Bool(v) => write!(f, "{}", v),
            LoggedValue::Integer(v) => write!(f, "{}", v),
            LoggedValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// One immutable record in the [`SettingLog`](super::SettingLog).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the process-wide total order. Strictly increasing.
    pub seq: u64,
    /// Wall-clock time the entry was appended. Informational; order by `seq`.
    pub timestamp: DateTime<Utc>,
    /// Owning device name.
    pub device: String,
    /// Setting name; `None` for device-level entries (busy markers and queries).
    pub setting: Option<String>,
    /// Operation kind.
    pub kind: OperationKind,
    /// Value involved, if any.
    pub value: Option<LoggedValue>,
}

impl LogEntry {
    /// Whether this entry belongs to the given device and setting.
    pub fn is_for(&self, device: &str, setting: &str) -> bool {
        self.device == device && self.setting.as_deref() == Some(setting)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.seq, self.device)?;
        if let Some(setting) = &self.setting {
            write!(f, "/{}", setting)?;
        }
        write!(f, " {}", self.kind)?;
        if let Some(value) = &self.value {
            write!(f, " = {}", value)?;
        }
        Ok(())
    }
}

/// Matches entries by device, setting and kind. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    device: Option<String>,
    setting: Option<String>,
    kind: Option<OperationKind>,
}

impl EntryFilter {
    /// A filter matching every entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one device.
    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Restrict to one setting name.
    pub fn setting(mut self, setting: impl Into<String>) -> Self {
        self.setting = Some(setting.into());
        self
    }

    /// Restrict to one operation kind.
    pub fn kind(mut self, kind: OperationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Shorthand for `device(..).setting(..)`.
    pub fn for_setting(device: impl Into<String>, setting: impl Into<String>) -> Self {
        Self::new().device(device).setting(setting)
    }

    /// Test one entry.
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(device) = &self.device {
            if &entry.device != device {
                return false;
            }
        }
        if let Some(setting) = &self.setting {
            if entry.setting.as_ref() != Some(setting) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        true
    }
}
