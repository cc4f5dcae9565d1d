//! Error types for settings and the property bridge.
//!
//! Two layers of errors exist, mirroring the two sides of a setting:
//!
//! - **`SettingError`**: returned by typed `set`/`read` calls. `OutOfRange` is the
//!   recoverable range error of a bounded integer or float setting; the previous
//!   value is retained. `InvalidReadOnOneShot` flags an integration mistake (a
//!   read wired to a write-only trigger). `DuplicateSetting` is raised while a
//!   device is being composed.
//! - **`ActionError`**: what the property dispatcher sees. Every variant maps to a
//!   numeric [`DispatchCode`] so that failures cross the boundary as codes rather
//!   than panics.
//!
//! By using `#[from]`, a `SettingError` converts into an `ActionError` with `?`
//! inside property actions.

use thiserror::Error;

/// Convenience alias for results of typed setting operations.
pub type SettingResult<T> = std::result::Result<T, SettingError>;

/// Convenience alias for results of property actions.
pub type ActionResult<T> = std::result::Result<T, ActionError>;

/// Errors raised by typed setting operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingError {
    /// A bounded setting was asked to commit a value outside `[min, max]`.
    #[error("Value {value} for '{device}/{setting}' is out of range [{min}, {max}]")]
    OutOfRange {
        /// Owning device name.
        device: String,
        /// Setting name.
        setting: String,
        /// Rejected value, rendered with `Debug`.
        value: String,
        /// Lower bound, rendered with `Debug`.
        min: String,
        /// Upper bound, rendered with `Debug`.
        max: String,
    },

    /// A one-shot setting has no value to read.
    #[error("Setting '{device}/{setting}' is a one-shot trigger and cannot be read")]
    InvalidReadOnOneShot {
        /// Owning device name.
        device: String,
        /// Setting name.
        setting: String,
    },

    /// Setting names must be unique within their device.
    #[error("Device '{device}' already has a setting named '{setting}'")]
    DuplicateSetting {
        /// Owning device name.
        device: String,
        /// Setting name.
        setting: String,
    },

    /// A property action bound to another device's setting was offered.
    #[error("Property '{setting}' belongs to device '{owner}', not '{device}'")]
    ForeignAction {
        /// Device the action was offered to.
        device: String,
        /// Setting name.
        setting: String,
        /// Device that owns the setting.
        owner: String,
    },
}

/// Status codes understood by the property dispatcher.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchCode {
    /// Success.
    Ok = 0,
    /// Unclassified failure.
    Error = 1,
    /// No property with the requested name.
    UnknownProperty = 2,
    /// The external representation could not be converted.
    InvalidValue = 3,
    /// The value was rejected by the setting's bounds.
    OutOfRange = 4,
    /// A read was issued against a write-only property.
    WriteOnly = 5,
    /// The setting behind the action no longer exists.
    SettingReleased = 6,
}

impl DispatchCode {
    /// Numeric value handed to the host.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Errors surfaced to the property dispatcher.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    /// The typed setting rejected the operation.
    #[error(transparent)]
    Setting(#[from] SettingError),

    /// The external value does not parse as the property's type.
    #[error("Invalid property value {got:?}, expected {expected}")]
    InvalidValue {
        /// Human-readable description of the accepted representation.
        expected: String,
        /// The offending external value, rendered for diagnostics.
        got: String,
    },

    /// No property is registered under the name.
    #[error("Unknown property '{0}'")]
    UnknownProperty(String),

    /// The owning device dropped the setting this action was bound to.
    #[error("Setting behind property '{0}' has been released")]
    SettingReleased(String),
}

impl ActionError {
    /// Dispatcher-level code for this failure.
    pub fn code(&self) -> DispatchCode {
        match self {
            ActionError::Setting(SettingError::OutOfRange { .. }) => DispatchCode::OutOfRange,
            ActionError::Setting(SettingError::InvalidReadOnOneShot { .. }) => {
                DispatchCode::WriteOnly
            }
            ActionError::Setting(
                SettingError::DuplicateSetting { .. } | SettingError::ForeignAction { .. },
            ) => DispatchCode::Error,
            ActionError::InvalidValue { .. } => DispatchCode::InvalidValue,
            ActionError::UnknownProperty(_) => DispatchCode::UnknownProperty,
            ActionError::SettingReleased(_) => DispatchCode::SettingReleased,
        }
    }
}
