//! Fuzz target: runtime configuration parsing
//!
//! Feeds arbitrary bytes to `SystemConfig::from_json` and verifies:
//! - No panics on malformed or hostile JSON
//! - Anything accepted passes validation and yields a usable service
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use plantcare::app::service::AppService;
use plantcare::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = SystemConfig::from_json(data) else {
        return;
    };
    assert_eq!(config.validate(), Ok(()));
    assert!(config.watering_dose_ms <= config.pump_max_duration_ms);
    assert!(AppService::new(config).is_ok());
});
