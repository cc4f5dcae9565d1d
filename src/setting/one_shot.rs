//! One-shot trigger settings.

use std::sync::Arc;

use super::SettingContext;
use crate::error::SettingResult;
use crate::property::{OneShotAction, PropertyAction};
use crate::setting_log::OperationKind;

/// A write-only setting with no state, standing in for a trigger pulse.
///
/// Each [`set`](Self::set) is an independent event: one value-less `Set` entry,
/// then a busy mark. There is deliberately no way to read it.
#[derive(Debug)]
pub struct OneShotSetting {
    ctx: SettingContext,
}

impl OneShotSetting {
    /// Create the trigger.
    pub fn new(ctx: SettingContext) -> Self {
        Self { ctx }
    }

    /// Setting name.
    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    /// Owning device name.
    pub fn device_name(&self) -> &str {
        self.ctx.device_name()
    }

    /// Fire the trigger.
    pub fn set(&self) -> SettingResult<()> {
        let seq = self.ctx.append(OperationKind::Set, None);
        tracing::debug!(
            device = self.device_name(),
            setting = self.name(),
            seq,
            "one-shot fired"
        );
        self.ctx.mark_device_busy();
        Ok(())
    }

    /// Write-only property action; any written value fires the trigger.
    pub fn new_property_action(self: &Arc<Self>) -> Box<dyn PropertyAction> {
        Box::new(OneShotAction::new(self))
    }
}
