//! Property actions bound to settings.

use std::sync::{Arc, Weak};

use super::{PropertyAction, PropertyCodec, PropertyInfo, PropertyKind, PropertyOp, PropertyValue};
use crate::error::{ActionError, ActionResult, SettingError};
use crate::setting::{OneShotSetting, Setting, SettingValue};

/// Action for a valued setting.
///
/// Holds a weak reference: the device owns its settings, and an action that
/// outlives them reports [`ActionError::SettingReleased`].
pub struct ValueAction<T: SettingValue, C: PropertyCodec<T>> {
    setting: Weak<Setting<T>>,
    name: String,
    device: String,
    codec: C,
}

impl<T: SettingValue, C: PropertyCodec<T>> ValueAction<T, C> {
    /// Bind `codec` to `setting`.
    pub fn new(setting: &Arc<Setting<T>>, codec: C) -> Self {
        Self {
            setting: Arc::downgrade(setting),
            name: setting.name().to_string(),
            device: setting.device_name().to_string(),
            codec,
        }
    }

    fn upgrade(&self) -> ActionResult<Arc<Setting<T>>> {
        self.setting
            .upgrade()
            .ok_or_else(|| ActionError::SettingReleased(self.name.clone()))
    }
}

impl<T: SettingValue, C: PropertyCodec<T>> PropertyAction for ValueAction<T, C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> PropertyInfo {
        let bounds = self.setting.upgrade().map(|setting| setting.bounds());
        PropertyInfo {
            name: self.name.clone(),
            device: self.device.clone(),
            kind: self.codec.kind(),
            readable: true,
            min_value: bounds.and_then(|b| b.min()).and_then(SettingValue::as_f64),
            max_value: bounds.and_then(|b| b.max()).and_then(SettingValue::as_f64),
            allowed_values: self.codec.allowed_values(),
        }
    }

    fn invoke(&self, op: PropertyOp) -> ActionResult<PropertyValue> {
        let setting = self.upgrade()?;
        match op {
            PropertyOp::Read => Ok(self.codec.encode(setting.read()?)),
            PropertyOp::Write(raw) => {
                let value = self.codec.decode(&raw)?;
                setting.set(value)?;
                Ok(self.codec.encode(value))
            }
        }
    }
}

/// Write-only action for a [`OneShotSetting`].
///
/// Hosts must not register a read handler for it (`info().readable` is
/// false); a read that arrives anyway fails with
/// [`SettingError::InvalidReadOnOneShot`].
pub struct OneShotAction {
    setting: Weak<OneShotSetting>,
    name: String,
    device: String,
}

impl OneShotAction {
    /// Bind to `setting`.
    pub fn new(setting: &Arc<OneShotSetting>) -> Self {
        Self {
            setting: Arc::downgrade(setting),
            name: setting.name().to_string(),
            device: setting.device_name().to_string(),
        }
    }
}

impl PropertyAction for OneShotAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> PropertyInfo {
        PropertyInfo {
            name: self.name.clone(),
            device: self.device.clone(),
            kind: PropertyKind::Text,
            readable: false,
            min_value: None,
            max_value: None,
            allowed_values: Vec::new(),
        }
    }

    fn invoke(&self, op: PropertyOp) -> ActionResult<PropertyValue> {
        match op {
            PropertyOp::Read => Err(SettingError::InvalidReadOnOneShot {
                device: self.device.clone(),
                setting: self.name.clone(),
            }
            .into()),
            PropertyOp::Write(raw) => {
                let setting = self
                    .setting
                    .upgrade()
                    .ok_or_else(|| ActionError::SettingReleased(self.name.clone()))?;
                setting.set()?;
                Ok(raw)
            }
        }
    }
}
