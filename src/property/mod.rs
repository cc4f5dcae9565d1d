//! Property bridge between the host dispatcher and typed settings
//!
//! The host property system speaks in untyped [`PropertyValue`]s and knows
//! nothing about `Setting<T>`. Each exposed setting gets one boxed
//! [`PropertyAction`]: a small function object that holds a weak reference to
//! its setting and translates `Read` / `Write` requests into typed `get` / `set`
//! calls, converting with a [`PropertyCodec`].
//!
//! Failures never cross the boundary as panics. Every [`ActionError`] maps to a
//! [`DispatchCode`](crate::error::DispatchCode) through [`ActionError::code`].
//!
//! # Example
//!
//! ```rust,ignore
//! let shutter = Arc::new(BoolSetting::new(ctx, false));
//! let action = shutter.new_property_action_with(BoolDisplay::OneZero);
//!
//! action.write(PropertyValue::Integer(1))?;               // shutter.set(true)
//! assert_eq!(action.read()?, PropertyValue::Integer(1));  // shutter.get()
//! ```

mod action;
mod codec;

pub use action::{OneShotAction, ValueAction};
pub use codec::{BoolDisplay, NumericCodec, PropertyCodec};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ActionError, ActionResult};

/// External, untyped property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Integer property value.
    Integer(i64),
    /// Floating-point property value.
    Float(f64),
    /// String property value.
    Text(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Integer(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

/// Declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// String property.
    Text,
    /// Integer property.
    Integer,
    /// Floating-point property.
    Float,
}

/// Request issued by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyOp {
    /// The host wants the current value.
    Read,
    /// The host wants to apply a new value.
    Write(PropertyValue),
}

/// Registration metadata a host uses to declare the property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    /// Property name (same as the setting name).
    pub name: String,
    /// Owning device name.
    pub device: String,
    /// Declared type.
    pub kind: PropertyKind,
    /// Whether a read handler may be registered.
    pub readable: bool,
    /// Lower limit, for bounded numeric settings.
    #[serde(default)]
    pub min_value: Option<f64>,
    /// Upper limit, for bounded numeric settings.
    #[serde(default)]
    pub max_value: Option<f64>,
    /// Allowed values, for settings with a fixed set of representations.
    #[serde(default)]
    pub allowed_values: Vec<String>,
}

/// Type-erased callback invoked by the dispatcher for one property.
pub trait PropertyAction: Send + Sync {
    /// Property name.
    fn name(&self) -> &str;

    /// Registration metadata.
    fn info(&self) -> PropertyInfo;

    /// Serve a read or write. A write returns the committed representation.
    fn invoke(&self, op: PropertyOp) -> ActionResult<PropertyValue>;

    /// Shorthand for `invoke(PropertyOp::Read)`.
    fn read(&self) -> ActionResult<PropertyValue> {
        self.invoke(PropertyOp::Read)
    }

    /// Shorthand for `invoke(PropertyOp::Write(value))`.
    fn write(&self, value: PropertyValue) -> ActionResult<PropertyValue> {
        self.invoke(PropertyOp::Write(value))
    }
}

impl fmt::Debug for dyn PropertyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAction")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

pub(crate) fn invalid_value(expected: impl Into<String>, got: &PropertyValue) -> ActionError {
    ActionError::InvalidValue {
        expected: expected.into(),
        got: got.to_string(),
    }
}
