//! Sensor-health supervisor.
//!
//! The supervisor runs **every control tick before the decision rules**
//! and maintains a fault bitmask of [`SensorFault`]s.  The service checks
//! that mask to decide which readings it may trust.
//!
//! ## Fault lifecycle
//!
//! 1. A probe returns an implausible reading (shorted or open circuit) or
//!    the light sensor stops answering.
//! 2. The supervisor counts consecutive bad ticks for that sensor.  A
//!    bad reading is never trusted, but a fault is only raised once the
//!    streak exceeds `sensor_fault_tick_limit`.
//! 3. While raised, the affected plant falls back to critical-floor-only
//!    watering (see [`crate::control::irrigation`]).
//! 4. The first good reading clears the streak and the fault bit.
//!
//! Several faults can be active at once and clear independently.

use log::{error, info};

use crate::config::SystemConfig;
use crate::error::SensorFault;
use crate::plant::PlantId;

/// A fault bit flipped on this evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    Raised(SensorFault),
    Cleared(SensorFault),
}

/// Sensor-health supervisor.
pub struct SensorHealth {
    plausible_min_raw: u16,
    plausible_max_raw: u16,
    tick_limit: u8,
    /// Latched fault bitmask.
    faults: u8,
    /// Consecutive bad ticks, indexed like [`SensorFault::ALL`].
    streaks: [u8; 3],
}

impl SensorHealth {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            plausible_min_raw: config.probe_plausible_min_raw,
            plausible_max_raw: config.probe_plausible_max_raw,
            tick_limit: config.sensor_fault_tick_limit,
            faults: 0,
            streaks: [0; 3],
        }
    }

    pub fn apply_config(&mut self, config: &SystemConfig) {
        self.plausible_min_raw = config.probe_plausible_min_raw;
        self.plausible_max_raw = config.probe_plausible_max_raw;
        self.tick_limit = config.sensor_fault_tick_limit;
    }

    /// Whether a raw moisture reading is physically possible.
    pub fn is_plausible(&self, raw: u16) -> bool {
        (self.plausible_min_raw..=self.plausible_max_raw).contains(&raw)
    }

    /// Evaluate one moisture reading.  Returns whether the reading may be
    /// trusted, plus any fault transition.
    pub fn check_moisture(&mut self, plant: PlantId, raw: u16) -> (bool, Option<HealthChange>) {
        let plausible = self.is_plausible(raw);
        (plausible, self.observe(SensorFault::moisture(plant), plausible))
    }

    /// Record whether the light sensor answered this tick.
    pub fn check_light(&mut self, ok: bool) -> Option<HealthChange> {
        self.observe(SensorFault::LightSensor, ok)
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is active.
    pub fn has_fault(&self, fault: SensorFault) -> bool {
        self.faults & fault.mask() != 0
    }

    // ── Internal ──────────────────────────────────────────────────

    fn observe(&mut self, fault: SensorFault, healthy: bool) -> Option<HealthChange> {
        let slot = Self::slot(fault);
        if healthy {
            self.streaks[slot] = 0;
            if self.has_fault(fault) {
                self.faults &= !fault.mask();
                info!("SENSOR FAULT CLEARED: {fault}");
                return Some(HealthChange::Cleared(fault));
            }
            return None;
        }

        self.streaks[slot] = self.streaks[slot].saturating_add(1);
        if !self.has_fault(fault) && self.streaks[slot] > self.tick_limit {
            self.faults |= fault.mask();
            error!("SENSOR FAULT SET: {fault}");
            return Some(HealthChange::Raised(fault));
        }
        None
    }

    fn slot(fault: SensorFault) -> usize {
        match fault {
            SensorFault::Moisture1 => 0,
            SensorFault::Moisture2 => 1,
            SensorFault::LightSensor => 2,
        }
    }
}
