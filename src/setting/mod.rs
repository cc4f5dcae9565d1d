//! Setting<T> - logged stand-ins for instrument parameters
//!
//! A *setting* is a named, typed value owned by a mock device: shutter state,
//! stage position, exposure time. Every read and every committed write goes to
//! the shared [`SettingLog`], and every successful mutation marks the owning
//! device busy so tests can emulate hardware latency.
//!
//! # Kinds
//!
//! | Alias | Value | Bounds | Property representation |
//! |-------|-------|--------|-------------------------|
//! | [`BoolSetting`] | `bool` | never | On/Off, Yes/No or 1/0 |
//! | [`IntegerSetting`] | `i64` | optional `[min, max]` | integer |
//! | [`FloatSetting`] | `f64` | optional `[min, max]` | float |
//! | [`OneShotSetting`] | none | - | write-only trigger |
//!
//! Settings do not inherit infrastructure; each holds a [`SettingContext`]
//! (log, device identity, name). Bounds can only be attached to [`Bounded`]
//! value types, so a bounded boolean does not type-check.
//!
//! # Example
//!
//! ```rust,ignore
//! let log = SettingLog::shared();
//! let ctx = SettingContext::new(log.clone(), "Stage", "Position");
//! let position = Arc::new(IntegerSetting::with_bounds(ctx, 50, 0, 100));
//!
//! assert!(position.set(150).is_err());   // rejected, nothing logged
//! assert_eq!(position.get(), 50);        // logged as a Get
//! position.set(75)?;                     // logged as a Set, Stage marked busy
//! ```

mod one_shot;
mod valued;

pub use one_shot::OneShotSetting;
pub use valued::Setting;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::property::{BoolDisplay, NumericCodec, PropertyAction, PropertyCodec};
use crate::setting_log::{LoggedValue, OperationKind, SettingLog};

/// Boolean setting.
pub type BoolSetting = Setting<bool>;

/// Integer setting with optional bounds.
pub type IntegerSetting = Setting<i64>;

/// Float setting with optional bounds.
pub type FloatSetting = Setting<f64>;

// =============================================================================
// Value domains
// =============================================================================

/// Which family a setting belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    /// [`BoolSetting`]
    Bool,
    /// [`IntegerSetting`]
    Integer,
    /// [`FloatSetting`]
    Float,
    /// [`OneShotSetting`]
    OneShot,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SettingKind::Bool => "bool",
            SettingKind::Integer => "integer",
            SettingKind::Float => "float",
            SettingKind::OneShot => "one_shot",
        };
        write!(f, "{}", label)
    }
}

/// A value type a [`Setting`] can hold.
pub trait SettingValue: Copy + PartialOrd + Debug + Send + Sync + 'static {
    /// Property codec used when no explicit one is given.
    type Codec: PropertyCodec<Self> + Default;

    /// Setting family for this value type.
    const KIND: SettingKind;

    /// Canonical form recorded in the log.
    fn logged(self) -> LoggedValue;

    /// Numeric view used for property limits; `None` for non-numeric types.
    fn as_f64(self) -> Option<f64>;
}

/// Value types that accept `[min, max]` bounds.
pub trait Bounded: SettingValue {}

impl SettingValue for bool {
    type Codec = BoolDisplay;
    const KIND: SettingKind = SettingKind::Bool;

    fn logged(self) -> LoggedValue {
        LoggedValue::Bool(self)
    }

    fn as_f64(self) -> Option<f64> {
        None
    }
}

impl SettingValue for i64 {
    type Codec = NumericCodec;
    const KIND: SettingKind = SettingKind::Integer;

    fn logged(self) -> LoggedValue {
        LoggedValue::Integer(self)
    }

    fn as_f64(self) -> Option<f64> {
        Some(self as f64)
    }
}

impl SettingValue for f64 {
    type Codec = NumericCodec;
    const KIND: SettingKind = SettingKind::Float;

    fn logged(self) -> LoggedValue {
        LoggedValue::Float(self)
    }

    fn as_f64(self) -> Option<f64> {
        Some(self)
    }
}

impl Bounded for i64 {}
impl Bounded for f64 {}

// =============================================================================
// SettingContext
// =============================================================================

/// Shared infrastructure every setting holds: log, device identity, name.
///
/// The log is shared by the whole session; the device name is the identity
/// used in every entry and busy marker. Neither is controlled by the setting.
#[derive(Clone, Debug)]
pub struct SettingContext {
    log: Arc<SettingLog>,
    device: Arc<str>,
    name: String,
}

impl SettingContext {
    /// Bind a setting name to a device and a log.
    pub fn new(log: Arc<SettingLog>, device: impl Into<Arc<str>>, name: impl Into<String>) -> Self {
        Self {
            log,
            device: device.into(),
            name: name.into(),
        }
    }

    /// Setting name, fixed at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning device name.
    pub fn device_name(&self) -> &str {
        &self.device
    }

    /// The shared log.
    pub fn log(&self) -> &Arc<SettingLog> {
        &self.log
    }

    pub(crate) fn append(&self, kind: OperationKind, value: Option<LoggedValue>) -> u64 {
        self.log.append(&self.device, Some(&self.name), kind, value)
    }

    /// Fire-and-forget busy signal for the owning device.
    pub fn mark_device_busy(&self) {
        self.log.mark_busy(&self.device);
    }
}

// =============================================================================
// SettingHandle
// =============================================================================

/// Uniform handle over every setting kind, as stored by a device.
#[derive(Debug, Clone)]
pub enum SettingHandle {
    /// Boolean setting.
    Bool(Arc<BoolSetting>),
    /// Integer setting.
    Integer(Arc<IntegerSetting>),
    /// Float setting.
    Float(Arc<FloatSetting>),
    /// One-shot trigger.
    OneShot(Arc<OneShotSetting>),
}

impl SettingHandle {
    /// Setting name.
    pub fn name(&self) -> &str {
        match self {
            SettingHandle::Bool(s) => s.name(),
            SettingHandle::Integer(s) => s.name(),
            SettingHandle::Float(s) => s.name(),
            SettingHandle::OneShot(s) => s.name(),
        }
    }

    /// Setting family.
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingHandle::Bool(_) => SettingKind::Bool,
            SettingHandle::Integer(_) => SettingKind::Integer,
            SettingHandle::Float(_) => SettingKind::Float,
            SettingHandle::OneShot(_) => SettingKind::OneShot,
        }
    }

    /// Property action using the kind's default codec.
    pub fn new_property_action(&self) -> Box<dyn PropertyAction> {
        match self {
            SettingHandle::Bool(s) => s.new_property_action(),
            SettingHandle::Integer(s) => s.new_property_action(),
            SettingHandle::Float(s) => s.new_property_action(),
            SettingHandle::OneShot(s) => s.new_property_action(),
        }
    }
}

impl From<Arc<BoolSetting>> for SettingHandle {
    fn from(setting: Arc<BoolSetting>) -> Self {
        SettingHandle::Bool(setting)
    }
}

impl From<Arc<IntegerSetting>> for SettingHandle {
    fn from(setting: Arc<IntegerSetting>) -> Self {
        SettingHandle::Integer(setting)
    }
}

impl From<Arc<FloatSetting>> for SettingHandle {
    fn from(setting: Arc<FloatSetting>) -> Self {
        SettingHandle::Float(setting)
    }
}

impl From<Arc<OneShotSetting>> for SettingHandle {
    fn from(setting: Arc<OneShotSetting>) -> Self {
        SettingHandle::OneShot(setting)
    }
}
