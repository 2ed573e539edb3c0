//! System configuration parameters
//!
//! All tunable parameters for the PlantCare controller.  Defaults are the
//! field-calibrated values of the second installation site; a JSON document
//! may override any subset of them.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::plant::PlantId;

/// Absolute upper bound on a single pump run.  No configuration may
/// raise `pump_max_duration_ms` above it.
pub const WATER_PUMP_MAX_DURATION_MS: u32 = 30_000;

/// Two-point calibration of one capacitive moisture probe.
///
/// No polarity is assumed: on some boards the dry reading is numerically
/// higher than the wet one, on others it is lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeCalibration {
    /// Raw ADC reading in dry air.
    pub dry_raw: u16,
    /// Raw ADC reading submerged in water.
    pub wet_raw: u16,
}

/// Which side of `rain_analog_threshold` means "wet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RainPolarity {
    /// Reading drops when water bridges the traces (common resistive boards).
    WetBelow,
    /// Reading rises when wet (inverted comparator boards).
    WetAbove,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Moisture probes ---
    /// Per-plant calibration, indexed by [`PlantId::index`].
    pub calibration: [ProbeCalibration; 2],
    /// Raw readings below this are physically implausible (shorted probe).
    pub probe_plausible_min_raw: u16,
    /// Raw readings above this are physically implausible (open circuit).
    pub probe_plausible_max_raw: u16,
    /// A sensor bad for more than this many consecutive ticks is faulted.
    pub sensor_fault_tick_limit: u8,

    // --- Irrigation thresholds (percent) ---
    /// Below this = dry, needs watering.
    pub soil_moisture_threshold_dry: f32,
    /// A watering run stops early once the probe reaches this level.
    pub soil_moisture_threshold_target: f32,
    /// Never skip watering below this level.
    pub critical_dry_threshold: f32,
    /// May skip when rain is imminent (3 h bucket) below this level.
    pub safe_skip_threshold: f32,
    /// May skip when rain is expected (6 h horizon) below this level.
    pub preventive_skip_threshold: f32,
    /// Below this level a critical-moisture alert is raised.
    pub critical_moisture_level: f32,
    /// Critical ticks after watering beyond which a hardware fault latches.
    pub hardware_fault_tick_limit: u8,

    // --- Forecast ---
    /// Minimum rain (mm) in the next 3 h to skip watering.
    pub rain_threshold_3h_mm: f32,
    /// Minimum rain (mm) in the next 6 h to skip watering.
    pub rain_threshold_6h_mm: f32,
    /// Forecast refresh cadence; older snapshots are treated as unknown.
    pub forecast_refresh_interval_ms: u32,

    // --- Rain probe ---
    /// Analog level separating wet from dry.
    pub rain_analog_threshold: u16,
    pub rain_polarity: RainPolarity,
    /// Raw signal must be stable this long before the state flips.
    pub rain_debounce_ms: u32,

    // --- Pump & valves ---
    /// Hard ceiling on a single pump run.  Safety invariant, not a default.
    pub pump_max_duration_ms: u32,
    /// Nominal length of one watering run.
    pub watering_dose_ms: u32,
    /// Minimum time between watering cycles per plant.
    pub min_time_between_watering_ms: u32,
    /// Relay boards that energise on LOW.
    pub valve_active_low: bool,

    // --- Shade ---
    /// Above this = intense light, shade needed.
    pub lux_threshold_high: f32,
    /// Shade retracts only below `lux_threshold_high - lux_hysteresis_band`.
    pub lux_hysteresis_band: f32,
    /// Servo angle with the shade away (plants exposed).
    pub shade_position_off: u8,
    /// Servo angle with the shade covering both plants.
    pub shade_position_on: u8,
    /// Delay between 1° servo steps.
    pub servo_step_delay_ms: u32,

    // --- Timing ---
    /// Fast actuator loop: rain sampling, servo steps, pump guard.
    pub actuator_poll_interval_ms: u32,
    /// Main decision loop.
    pub control_loop_interval_ms: u32,
    /// Periodic status report.
    pub status_update_interval_ms: u32,

    // --- Notifications ---
    pub notification_retry_count: u8,
    pub notification_retry_delay_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let probe = ProbeCalibration {
            dry_raw: 492,
            wet_raw: 202,
        };
        Self {
            // Moisture probes
            calibration: [probe, probe],
            probe_plausible_min_raw: 10,
            probe_plausible_max_raw: 1013,
            sensor_fault_tick_limit: 3,

            // Irrigation thresholds
            soil_moisture_threshold_dry: 30.0,
            soil_moisture_threshold_target: 40.0,
            critical_dry_threshold: 20.0,
            safe_skip_threshold: 30.0,
            preventive_skip_threshold: 40.0,
            critical_moisture_level: 15.0,
            hardware_fault_tick_limit: 3,

            // Forecast
            rain_threshold_3h_mm: 3.0,
            rain_threshold_6h_mm: 2.0,
            forecast_refresh_interval_ms: 3_600_000, // 1 h

            // Rain probe
            rain_analog_threshold: 800,
            rain_polarity: RainPolarity::WetBelow,
            rain_debounce_ms: 50,

            // Pump
            pump_max_duration_ms: 30_000,
            watering_dose_ms: 20_000,
            min_time_between_watering_ms: 1_800_000, // 30 min
            valve_active_low: false,

            // Shade
            lux_threshold_high: 15_000.0,
            lux_hysteresis_band: 1_500.0,
            shade_position_off: 180,
            shade_position_on: 90,
            servo_step_delay_ms: 15,

            // Timing
            actuator_poll_interval_ms: 15,
            control_loop_interval_ms: 10_000,
            status_update_interval_ms: 1_800_000,

            // Notifications
            notification_retry_count: 3,
            notification_retry_delay_ms: 2_000,
        }
    }
}

impl SystemConfig {
    /// Parse a (possibly partial) JSON document over the defaults and
    /// validate the result.
    pub fn from_json(json: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Startup configuration: the optional build-time JSON document over
    /// the defaults.  A document that does not parse or validate is an
    /// error; it never falls back to the defaults.
    pub fn from_build_override(json: Option<&str>) -> Result<Self, ConfigError> {
        match json {
            Some(json) => Self::from_json(json.as_bytes()),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Calibration for one plant's probe.
    pub fn calibration_for(&self, plant: PlantId) -> ProbeCalibration {
        self.calibration[plant.index()]
    }

    /// Reject inconsistent parameters.  Called once at startup and on every
    /// runtime update; invalid values are never silently clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        use ConfigError::ValidationFailed as Invalid;

        for cal in &self.calibration {
            if cal.dry_raw == cal.wet_raw {
                return Err(Invalid("calibration: dry_raw must differ from wet_raw"));
            }
        }
        if self.probe_plausible_min_raw >= self.probe_plausible_max_raw {
            return Err(Invalid("probe_plausible_min_raw must be below probe_plausible_max_raw"));
        }
        if self.sensor_fault_tick_limit == 0 {
            return Err(Invalid("sensor_fault_tick_limit must be nonzero"));
        }

        let percents = [
            self.soil_moisture_threshold_dry,
            self.soil_moisture_threshold_target,
            self.critical_dry_threshold,
            self.safe_skip_threshold,
            self.preventive_skip_threshold,
            self.critical_moisture_level,
        ];
        if percents.iter().any(|p| !(0.0..=100.0).contains(p)) {
            return Err(Invalid("moisture thresholds must lie within 0-100"));
        }
        if self.critical_dry_threshold >= self.safe_skip_threshold {
            return Err(Invalid("critical_dry_threshold must be below safe_skip_threshold"));
        }
        if self.safe_skip_threshold > self.preventive_skip_threshold {
            return Err(Invalid("safe_skip_threshold must not exceed preventive_skip_threshold"));
        }
        if self.soil_moisture_threshold_target < self.soil_moisture_threshold_dry {
            return Err(Invalid("soil_moisture_threshold_target must not be below the dry threshold"));
        }
        if self.hardware_fault_tick_limit == 0 {
            return Err(Invalid("hardware_fault_tick_limit must be nonzero"));
        }

        if !(self.rain_threshold_3h_mm >= 0.0 && self.rain_threshold_6h_mm >= 0.0) {
            return Err(Invalid("rain thresholds must be non-negative"));
        }
        if self.forecast_refresh_interval_ms == 0 {
            return Err(Invalid("forecast_refresh_interval_ms must be nonzero"));
        }

        if self.pump_max_duration_ms == 0 || self.pump_max_duration_ms > WATER_PUMP_MAX_DURATION_MS {
            return Err(Invalid("pump_max_duration_ms must be within 1..=30000 ms"));
        }
        if self.watering_dose_ms == 0 || self.watering_dose_ms > self.pump_max_duration_ms {
            return Err(Invalid("watering_dose_ms must be within 1..=pump_max_duration_ms"));
        }

        if !(self.lux_hysteresis_band > 0.0 && self.lux_hysteresis_band < self.lux_threshold_high) {
            return Err(Invalid("lux_hysteresis_band must be nonzero and below lux_threshold_high"));
        }
        if self.shade_position_off > 180 || self.shade_position_on > 180 {
            return Err(Invalid("shade positions must lie within 0-180 degrees"));
        }
        if self.shade_position_off == self.shade_position_on {
            return Err(Invalid("shade_position_on must differ from shade_position_off"));
        }

        if self.actuator_poll_interval_ms == 0 || self.control_loop_interval_ms == 0 {
            return Err(Invalid("loop intervals must be nonzero"));
        }
        if self.actuator_poll_interval_ms > self.control_loop_interval_ms {
            return Err(Invalid("actuator loop must not be slower than the control loop"));
        }
        if self.actuator_poll_interval_ms >= self.pump_max_duration_ms {
            return Err(Invalid("actuator loop must be faster than pump_max_duration_ms"));
        }
        if self.status_update_interval_ms < self.control_loop_interval_ms {
            return Err(Invalid("status interval must not be shorter than the control loop"));
        }

        Ok(())
    }
}
