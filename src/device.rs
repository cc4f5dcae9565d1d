//! MockDevice - composes settings and property actions into one device.
//!
//! A `MockDevice` is the single owner of its settings. Property actions hold
//! only weak back-references, so dropping the device releases every setting
//! even while a host still holds the actions.
//!
//! # Example
//!
//! ```rust,ignore
//! let log = SettingLog::shared();
//! let mut shutter = MockDevice::new("Shutter", log.clone());
//! shutter.create_bool_property("State", false, BoolDisplay::OneZero)?;
//!
//! shutter.set_property("State", 1_i64)?;
//! assert!(shutter.is_busy());
//! assert_eq!(shutter.get_property("State")?, PropertyValue::Integer(1));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ActionError, ActionResult, SettingError, SettingResult};
use crate::property::{BoolDisplay, PropertyAction, PropertyInfo, PropertyValue};
use crate::setting::{
    BoolSetting, FloatSetting, IntegerSetting, OneShotSetting, SettingContext, SettingHandle,
};
use crate::setting_log::SettingLog;
use crate::validation::Bounds;

/// A mock device: named settings plus the property actions exposed for them.
#[derive(Debug)]
pub struct MockDevice {
    name: Arc<str>,
    log: Arc<SettingLog>,
    settings: BTreeMap<String, SettingHandle>,
    properties: BTreeMap<String, Box<dyn PropertyAction>>,
}

impl MockDevice {
    /// Empty device appending to `log`.
    pub fn new(name: impl Into<Arc<str>>, log: Arc<SettingLog>) -> Self {
        Self {
            name: name.into(),
            log,
            settings: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Device name, used in every log entry of its settings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared log.
    pub fn log(&self) -> &Arc<SettingLog> {
        &self.log
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    fn duplicate(&self, name: &str) -> SettingError {
        SettingError::DuplicateSetting {
            device: self.name.to_string(),
            setting: name.to_string(),
        }
    }

    fn context(&self, name: &str) -> SettingResult<SettingContext> {
        if self.settings.contains_key(name) {
            return Err(self.duplicate(name));
        }
        Ok(SettingContext::new(self.log.clone(), self.name.clone(), name))
    }

    /// Both the setting and the property name must be free before a
    /// `create_*_property` call touches either map.
    fn check_property_free(&self, name: &str) -> SettingResult<()> {
        if self.properties.contains_key(name) {
            return Err(self.duplicate(name));
        }
        Ok(())
    }

    fn insert<S>(&mut self, setting: Arc<S>) -> Arc<S>
    where
        Arc<S>: Into<SettingHandle>,
    {
        let handle: SettingHandle = setting.clone().into();
        tracing::debug!(
            device = %self.name,
            setting = handle.name(),
            kind = %handle.kind(),
            "setting added"
        );
        self.settings.insert(handle.name().to_string(), handle);
        setting
    }

    /// Add a boolean setting.
    pub fn add_bool(&mut self, name: &str, initial: bool) -> SettingResult<Arc<BoolSetting>> {
        let ctx = self.context(name)?;
        Ok(self.insert(Arc::new(BoolSetting::new(ctx, initial))))
    }

    /// Add an integer setting with the given validation policy.
    pub fn add_integer(
        &mut self,
        name: &str,
        initial: i64,
        bounds: Bounds<i64>,
    ) -> SettingResult<Arc<IntegerSetting>> {
        let ctx = self.context(name)?;
        Ok(self.insert(Arc::new(IntegerSetting::bounded(ctx, initial, bounds))))
    }

    /// Add a float setting with the given validation policy.
    pub fn add_float(
        &mut self,
        name: &str,
        initial: f64,
        bounds: Bounds<f64>,
    ) -> SettingResult<Arc<FloatSetting>> {
        let ctx = self.context(name)?;
        Ok(self.insert(Arc::new(FloatSetting::bounded(ctx, initial, bounds))))
    }

    /// Add a one-shot trigger.
    pub fn add_one_shot(&mut self, name: &str) -> SettingResult<Arc<OneShotSetting>> {
        let ctx = self.context(name)?;
        Ok(self.insert(Arc::new(OneShotSetting::new(ctx))))
    }

    /// Look up a setting by name.
    pub fn setting(&self, name: &str) -> Option<SettingHandle> {
        self.settings.get(name).cloned()
    }

    /// Names of all settings, sorted.
    pub fn setting_names(&self) -> Vec<String> {
        self.settings.keys().cloned().collect()
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    /// Add a boolean setting and expose it with `display`.
    pub fn create_bool_property(
        &mut self,
        name: &str,
        initial: bool,
        display: BoolDisplay,
    ) -> SettingResult<Arc<BoolSetting>> {
        self.check_property_free(name)?;
        let setting = self.add_bool(name, initial)?;
        self.register_action(setting.new_property_action_with(display))?;
        Ok(setting)
    }

    /// Add an integer setting and expose it.
    pub fn create_integer_property(
        &mut self,
        name: &str,
        initial: i64,
        bounds: Bounds<i64>,
    ) -> SettingResult<Arc<IntegerSetting>> {
        self.check_property_free(name)?;
        let setting = self.add_integer(name, initial, bounds)?;
        self.register_action(setting.new_property_action())?;
        Ok(setting)
    }

    /// Add a float setting and expose it.
    pub fn create_float_property(
        &mut self,
        name: &str,
        initial: f64,
        bounds: Bounds<f64>,
    ) -> SettingResult<Arc<FloatSetting>> {
        self.check_property_free(name)?;
        let setting = self.add_float(name, initial, bounds)?;
        self.register_action(setting.new_property_action())?;
        Ok(setting)
    }

    /// Add a one-shot trigger and expose it as a write-only property.
    pub fn create_trigger_property(&mut self, name: &str) -> SettingResult<Arc<OneShotSetting>> {
        self.check_property_free(name)?;
        let setting = self.add_one_shot(name)?;
        self.register_action(setting.new_property_action())?;
        Ok(setting)
    }

    /// Expose an already built action under its own name.
    ///
    /// The action must be bound to a setting of this device.
    pub fn register_action(&mut self, action: Box<dyn PropertyAction>) -> SettingResult<()> {
        let name = action.name().to_string();
        let owner = action.info().device;
        if owner != *self.name {
            return Err(SettingError::ForeignAction {
                device: self.name.to_string(),
                setting: name,
                owner,
            });
        }
        self.check_property_free(&name)?;
        self.properties.insert(name, action);
        Ok(())
    }

    fn action(&self, name: &str) -> ActionResult<&dyn PropertyAction> {
        self.properties
            .get(name)
            .map(|action| action.as_ref())
            .ok_or_else(|| ActionError::UnknownProperty(name.to_string()))
    }

    /// Serve a host read.
    pub fn get_property(&self, name: &str) -> ActionResult<PropertyValue> {
        self.action(name)?.read()
    }

    /// Serve a host write; returns the committed representation.
    pub fn set_property(
        &self,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> ActionResult<PropertyValue> {
        let action = self.action(name)?;
        action.write(value.into()).map_err(|err| {
            tracing::debug!(
                device = %self.name,
                property = name,
                code = err.code().as_i32(),
                error = %err,
                "property write failed"
            );
            err
        })
    }

    /// Registration metadata of one property.
    pub fn property_info(&self, name: &str) -> ActionResult<PropertyInfo> {
        Ok(self.action(name)?.info())
    }

    /// Names of all exposed properties, sorted.
    pub fn property_names(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    /// Ask the log whether this device is busy.
    pub fn is_busy(&self) -> bool {
        self.log.is_busy(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchCode;
    use crate::property::PropertyKind;
    use crate::setting::SettingKind;
    use crate::setting_log::{EntryFilter, OperationKind};

    fn stage() -> MockDevice {
        MockDevice::new("Stage", SettingLog::shared())
    }

    #[test]
    fn names_are_unique_per_device() {
        let mut device = stage();
        device.add_bool("Enabled", true).unwrap();
        let err = device.add_integer("Enabled", 0, Bounds::Unbounded).unwrap_err();
        assert_eq!(
            err,
            SettingError::DuplicateSetting {
                device: "Stage".into(),
                setting: "Enabled".into()
            }
        );
        assert_eq!(device.setting_names(), vec!["Enabled"]);

        // Another device may reuse the name.
        let mut other = MockDevice::new("Camera", device.log().clone());
        assert!(other.add_bool("Enabled", false).is_ok());
    }

    #[test]
    fn settings_are_looked_up_by_name() {
        let mut device = stage();
        device.add_float("Position", 0.0, Bounds::inclusive(-5.0, 5.0)).unwrap();
        device.add_one_shot("Home").unwrap();

        let handle = device.setting("Position").unwrap();
        assert_eq!(handle.kind(), SettingKind::Float);
        assert_eq!(device.setting("Home").unwrap().kind(), SettingKind::OneShot);
        assert!(device.setting("Velocity").is_none());
        // Plain settings are not exposed as properties.
        assert!(device.property_names().is_empty());
    }

    #[test]
    fn dispatch_reaches_the_setting() {
        let mut device = stage();
        let position = device
            .create_integer_property("Position", 50, Bounds::inclusive(0, 100))
            .unwrap();

        assert_eq!(device.set_property("Position", 75_i64).unwrap(), PropertyValue::Integer(75));
        assert_eq!(position.get(), 75);
        assert!(device.is_busy());
        assert!(!device.is_busy());

        let err = device.set_property("Position", 150_i64).unwrap_err();
        assert_eq!(err.code(), DispatchCode::OutOfRange);
        assert_eq!(device.get_property("Position").unwrap(), PropertyValue::Integer(75));
    }

    #[test]
    fn unknown_property_is_an_error_code() {
        let device = stage();
        let err = device.get_property("Focus").unwrap_err();
        assert_eq!(err, ActionError::UnknownProperty("Focus".into()));
        assert_eq!(err.code().as_i32(), 2);
        assert!(device.property_info("Focus").is_err());
    }

    #[test]
    fn property_metadata() {
        let mut device = MockDevice::new("Shutter", SettingLog::shared());
        device
            .create_bool_property("State", false, BoolDisplay::OneZero)
            .unwrap();
        device.create_trigger_property("Fire").unwrap();
        device
            .create_float_property("Delay", 0.0, Bounds::inclusive(0.0, 1.5))
            .unwrap();

        assert_eq!(device.property_names(), vec!["Delay", "Fire", "State"]);

        let state = device.property_info("State").unwrap();
        assert_eq!(state.kind, PropertyKind::Integer);
        assert_eq!(state.device, "Shutter");
        assert!(state.readable);

        let fire = device.property_info("Fire").unwrap();
        assert!(!fire.readable);
        assert_eq!(
            device.get_property("Fire").unwrap_err().code(),
            DispatchCode::WriteOnly
        );

        let delay = device.property_info("Delay").unwrap();
        assert_eq!(delay.max_value, Some(1.5));
    }

    #[test]
    fn duplicate_action_registration_is_rejected() {
        let mut device = stage();
        let speed = device.add_integer("Speed", 1, Bounds::Unbounded).unwrap();
        device.register_action(speed.new_property_action()).unwrap();
        assert!(device.register_action(speed.new_property_action()).is_err());
    }

    #[test]
    fn failed_create_leaves_no_setting_behind() {
        // An action registered directly holds the "Speed" property name
        // while its setting lives elsewhere.
        let log = SettingLog::shared();
        let mut builder = MockDevice::new("Stage", log.clone());
        let speed = builder.add_integer("Speed", 9, Bounds::Unbounded).unwrap();
        let mut device = MockDevice::new("Stage", log);
        device.register_action(speed.new_property_action()).unwrap();

        let err = device
            .create_integer_property("Speed", 0, Bounds::inclusive(0, 10))
            .unwrap_err();
        assert!(matches!(err, SettingError::DuplicateSetting { .. }));
        assert!(device.setting_names().is_empty());

        // Nothing half-built: the setting name is still free.
        assert!(device.add_integer("Speed", 0, Bounds::Unbounded).is_ok());
    }

    #[test]
    fn actions_from_other_devices_are_refused() {
        let log = SettingLog::shared();
        let mut camera = MockDevice::new("Camera", log.clone());
        let gain = camera.add_integer("Gain", 1, Bounds::Unbounded).unwrap();

        let mut device = MockDevice::new("Stage", log.clone());
        let err = device.register_action(gain.new_property_action()).unwrap_err();
        assert_eq!(
            err,
            SettingError::ForeignAction {
                device: "Stage".into(),
                setting: "Gain".into(),
                owner: "Camera".into()
            }
        );
        assert!(device.property_names().is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn dropping_the_device_releases_settings() {
        let log = SettingLog::shared();
        let mut device = MockDevice::new("Lamp", log.clone());
        device.add_integer("Power", 3, Bounds::Unbounded).unwrap();
        let action = device.setting("Power").unwrap().new_property_action();
        drop(device);

        assert_eq!(
            action.read().unwrap_err().code(),
            DispatchCode::SettingReleased
        );
        assert!(log
            .filter(&EntryFilter::new().kind(OperationKind::Get))
            .is_empty());
    }
}
