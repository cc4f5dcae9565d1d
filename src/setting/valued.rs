//! Valued settings: bool, integer and float.

use parking_lot::Mutex;
use std::sync::Arc;

use super::{Bounded, SettingContext, SettingValue};
use crate::error::{SettingError, SettingResult};
use crate::property::{PropertyAction, PropertyCodec, ValueAction};
use crate::setting_log::OperationKind;
use crate::validation::Bounds;

/// A logged setting holding a value of type `T`.
///
/// `set` and `get` each take the value lock and append to the shared log while
/// holding it, so a concurrent reader of the same setting never sees a value
/// whose log entry is missing, or the reverse. Lock order is always value
/// lock, then log lock.
#[derive(Debug)]
pub struct Setting<T: SettingValue> {
    ctx: SettingContext,
    bounds: Bounds<T>,
    value: Mutex<T>,
}

impl<T: SettingValue> Setting<T> {
    /// Unbounded setting. The initial value is trusted and not logged.
    pub fn new(ctx: SettingContext, initial: T) -> Self {
        Self {
            ctx,
            bounds: Bounds::Unbounded,
            value: Mutex::new(initial),
        }
    }

    /// Setting name.
    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    /// Owning device name.
    pub fn device_name(&self) -> &str {
        self.ctx.device_name()
    }

    /// Shared infrastructure of this setting.
    pub fn context(&self) -> &SettingContext {
        &self.ctx
    }

    /// Validation policy in force.
    pub fn bounds(&self) -> Bounds<T> {
        self.bounds
    }

    /// Validate and commit a new value.
    ///
    /// On success a `Set` entry carrying the new value is appended and the
    /// device is marked busy. On rejection nothing is logged and the stored
    /// value is unchanged.
    pub fn set(&self, new_value: T) -> SettingResult<()> {
        if let Err(rejected) = self.bounds.check(new_value) {
            tracing::warn!(
                device = self.device_name(),
                setting = self.name(),
                value = ?rejected.value,
                min = ?rejected.min,
                max = ?rejected.max,
                "rejected out-of-range value"
            );
            return Err(SettingError::OutOfRange {
                device: self.device_name().to_string(),
                setting: self.name().to_string(),
                value: format!("{:?}", rejected.value),
                min: format!("{:?}", rejected.min),
                max: format!("{:?}", rejected.max),
            });
        }

        {
            let mut value = self.value.lock();
            self.ctx.append(OperationKind::Set, Some(new_value.logged()));
            *value = new_value;
        }

        tracing::debug!(
            device = self.device_name(),
            setting = self.name(),
            value = ?new_value,
            "setting committed"
        );
        self.ctx.mark_device_busy();
        Ok(())
    }

    /// Current value. Appends a `Get` entry; never marks busy.
    pub fn get(&self) -> T {
        let value = self.value.lock();
        self.ctx.append(OperationKind::Get, Some(value.logged()));
        *value
    }

    /// Checked form of [`get`](Self::get), for callers that propagate errors.
    pub fn read(&self) -> SettingResult<T> {
        Ok(self.get())
    }

    /// Property action rendering values with the type's default codec.
    pub fn new_property_action(self: &Arc<Self>) -> Box<dyn PropertyAction> {
        self.new_property_action_with(T::Codec::default())
    }

    /// Property action rendering values with an explicit codec, e.g. a
    /// [`BoolDisplay`](crate::property::BoolDisplay) mode.
    pub fn new_property_action_with<C>(self: &Arc<Self>, codec: C) -> Box<dyn PropertyAction>
    where
        C: PropertyCodec<T>,
    {
        Box::new(ValueAction::new(self, codec))
    }
}

impl<T: Bounded> Setting<T> {
    /// Setting restricted to `[min, max]`. The initial value is trusted.
    pub fn with_bounds(ctx: SettingContext, initial: T, min: T, max: T) -> Self {
        Self::bounded(ctx, initial, Bounds::inclusive(min, max))
    }

    /// Setting with an explicit validation policy.
    pub fn bounded(ctx: SettingContext, initial: T, bounds: Bounds<T>) -> Self {
        Self {
            ctx,
            bounds,
            value: Mutex::new(initial),
        }
    }

    /// Whether min/max are enforced.
    pub fn has_min_max(&self) -> bool {
        self.bounds.has_min_max()
    }

    /// Lower bound; `None` when unbounded.
    pub fn min(&self) -> Option<T> {
        self.bounds.min()
    }

    /// Upper bound; `None` when unbounded.
    pub fn max(&self) -> Option<T> {
        self.bounds.max()
    }
}
