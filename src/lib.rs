//! # Sequence Tester
//!
//! Instrumented settings for mock hardware devices. A mock device built from
//! these settings records every read, every committed write and every busy
//! signal into one shared, totally ordered [`SettingLog`], so a test can assert
//! on *when* and *in what order* a device-control stack touched its hardware.
//!
//! ## Crate Structure
//!
//! - **`setting`**: `Setting<T>` for bool, integer and float values with optional
//!   `[min, max]` validation, plus the write-only [`OneShotSetting`].
//! - **`setting_log`**: the shared append-only log, entry queries, the live
//!   entry feed and busy bookkeeping ([`BusyPolicy`]).
//! - **`property`**: the bridge to an untyped host property dispatcher:
//!   [`PropertyAction`] callbacks and [`PropertyCodec`] conversions such as the
//!   boolean display modes.
//! - **`device`**: [`MockDevice`], which owns settings and serves property
//!   reads and writes by name.
//! - **`validation`**: the [`Bounds`] policy used by numeric settings.
//! - **`error`**: [`SettingError`], [`ActionError`] and dispatcher codes.
//! - **`config`**: figment-based configuration (TOML file + environment).
//! - **`telemetry`**: tracing subscriber setup.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sequence_tester::{Bounds, MockDevice, SettingLog};
//!
//! let log = SettingLog::shared();
//! let mut stage = MockDevice::new("Stage", log.clone());
//! let position = stage.add_integer("Position", 50, Bounds::inclusive(0, 100))?;
//!
//! assert!(position.set(150).is_err());
//! position.set(75)?;
//! assert!(stage.is_busy());
//! println!("{}", log.to_json()?);
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod property;
pub mod setting;
pub mod setting_log;
pub mod telemetry;
pub mod validation;

pub use config::SequenceTesterConfig;
pub use device::MockDevice;
pub use error::{ActionError, ActionResult, DispatchCode, SettingError, SettingResult};
pub use property::{
    BoolDisplay, PropertyAction, PropertyCodec, PropertyInfo, PropertyKind, PropertyOp,
    PropertyValue,
};
pub use setting::{
    BoolSetting, FloatSetting, IntegerSetting, OneShotSetting, Setting, SettingContext,
    SettingHandle, SettingKind, SettingValue,
};
pub use setting_log::{
    BusyPolicy, EntryFilter, LogEntry, LoggedValue, OperationKind, SettingLog,
};
pub use validation::Bounds;
