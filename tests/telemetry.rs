//! Integration tests for tracing initialization
//!
//! Kept in its own test binary: installing the global subscriber would clash
//! with `#[traced_test]` in the unit tests.

use sequence_tester::config::SequenceTesterConfig;
use sequence_tester::telemetry::{self, OutputFormat, TracingConfig};
use sequence_tester::{Bounds, MockDevice, SettingLog};
use tracing::Level;

#[test]
fn test_init_is_idempotent_and_settings_still_log() {
    let mut config = SequenceTesterConfig::default();
    config.application.log_level = "trace".to_string();
    config.application.log_format = "compact".to_string();

    telemetry::init_from_config(&config).unwrap();
    telemetry::init(TracingConfig::new(Level::DEBUG).with_format(OutputFormat::Json)).unwrap();

    // Events now go through the installed subscriber.
    let log = SettingLog::shared();
    let mut stage = MockDevice::new("Stage", log.clone());
    let position = stage
        .add_integer("Position", 0, Bounds::inclusive(0, 10))
        .unwrap();
    assert!(position.set(11).is_err());
    position.set(5).unwrap();
    assert_eq!(log.len(), 2);
}

#[test]
fn test_invalid_level_is_reported() {
    let mut config = SequenceTesterConfig::default();
    config.application.log_level = "loud".to_string();
    assert!(telemetry::init_from_config(&config).is_err());
}
