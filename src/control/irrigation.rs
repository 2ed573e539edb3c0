//! Irrigation decision rules.
//!
//! Watering is decided per plant, per control tick, by walking an ordered
//! table of predicate/outcome rows top-down.  The first row whose predicate
//! holds wins:
//!
//! ```text
//! ┌───┬──────────────────┬─────────────────────────────────────────────┬─────────────────────────┐
//! │ # │ name             │ predicate                                   │ outcome                 │
//! ├───┼──────────────────┼─────────────────────────────────────────────┼─────────────────────────┤
//! │ 1 │ lease-held       │ this plant holds the pump lease             │ AlreadyWatering         │
//! │ 2 │ cooldown         │ now - last_watered < min time between runs  │ Skip(Cooldown)          │
//! │ 3 │ critical-floor   │ moisture < critical dry                     │ Water                   │
//! │ 4 │ rain-imminent-3h │ moisture < safe skip  ∧ rain_3h ≥ threshold │ Skip(RainImminent3h)    │
//! │ 5 │ rain-expected-6h │ moisture < preventive ∧ rain_6h ≥ threshold │ Skip(RainExpected6h)    │
//! │ 6 │ raining-now      │ debounced rain probe is wet                 │ Skip(RainDetectedNow)   │
//! │ 7 │ dry              │ moisture < dry threshold                    │ Water                   │
//! │ 8 │ sufficient       │ always                                      │ Skip(Sufficient)        │
//! └───┴──────────────────┴─────────────────────────────────────────────┴─────────────────────────┘
//! ```
//!
//! Rows 4 and 5 only match while the forecast is known.  Two degraded
//! modes narrow the table: a latched hardware fault stops all watering,
//! and a faulted moisture probe leaves only the critical floor, so the
//! plant never skips for rain on a reading it cannot trust.

use crate::config::SystemConfig;
use crate::plant::PlantState;
use crate::weather::ForecastView;

/// Why a watering cycle was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Cooldown,
    RainImminent3h,
    RainExpected6h,
    RainDetectedNow,
    Sufficient,
    /// Probe faulted and last trusted reading is above the critical floor.
    SensorFault,
    /// Watering did not raise the moisture; latched until it recovers.
    HardwareFault,
}

/// Per-plant outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WateringDecision {
    Water,
    Skip(SkipReason),
    AlreadyWatering,
}

/// Everything one rule evaluation looks at.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInputs {
    /// Last trusted calibrated reading (0–100).
    pub moisture_percent: f32,
    /// This plant currently holds the pump lease.
    pub lease_held: bool,
    pub last_watered_at_ms: Option<u64>,
    pub now_ms: u64,
    pub forecast: ForecastView,
    /// Debounced rain probe.
    pub is_raining: bool,
    pub sensor_faulted: bool,
    pub hardware_fault_latched: bool,
}

/// Predicate half of a rule row.
pub type RulePredicate = fn(&DecisionInputs, &SystemConfig) -> bool;

/// One row of the decision table.
pub struct Rule {
    pub name: &'static str,
    pub applies: RulePredicate,
    pub outcome: WateringDecision,
}

/// The decision table, in precedence order.
pub static RULES: [Rule; 8] = [
    Rule {
        name: "lease-held",
        applies: lease_held,
        outcome: WateringDecision::AlreadyWatering,
    },
    Rule {
        name: "cooldown",
        applies: in_cooldown,
        outcome: WateringDecision::Skip(SkipReason::Cooldown),
    },
    Rule {
        name: "critical-floor",
        applies: below_critical_floor,
        outcome: WateringDecision::Water,
    },
    Rule {
        name: "rain-imminent-3h",
        applies: rain_imminent_3h,
        outcome: WateringDecision::Skip(SkipReason::RainImminent3h),
    },
    Rule {
        name: "rain-expected-6h",
        applies: rain_expected_6h,
        outcome: WateringDecision::Skip(SkipReason::RainExpected6h),
    },
    Rule {
        name: "raining-now",
        applies: raining_now,
        outcome: WateringDecision::Skip(SkipReason::RainDetectedNow),
    },
    Rule {
        name: "dry",
        applies: below_dry_threshold,
        outcome: WateringDecision::Water,
    },
    Rule {
        name: "sufficient",
        applies: always,
        outcome: WateringDecision::Skip(SkipReason::Sufficient),
    },
];

/// Index of the last row still consulted for a faulted probe.
const CRITICAL_FLOOR_ROW: usize = 2;

/// Evaluate the table.  Returns the outcome and the name of the winning row.
pub fn decide(inputs: &DecisionInputs, config: &SystemConfig) -> (WateringDecision, &'static str) {
    if inputs.lease_held {
        return (WateringDecision::AlreadyWatering, RULES[0].name);
    }
    if inputs.hardware_fault_latched {
        return (WateringDecision::Skip(SkipReason::HardwareFault), "hardware-fault");
    }

    let rows: &[Rule] = if inputs.sensor_faulted {
        &RULES[..=CRITICAL_FLOOR_ROW]
    } else {
        &RULES
    };

    rows.iter()
        .find(|rule| (rule.applies)(inputs, config))
        .map_or(
            (WateringDecision::Skip(SkipReason::SensorFault), "sensor-fault"),
            |rule| (rule.outcome, rule.name),
        )
}

// ── Predicates ────────────────────────────────────────────────

fn lease_held(i: &DecisionInputs, _c: &SystemConfig) -> bool {
    i.lease_held
}

fn in_cooldown(i: &DecisionInputs, c: &SystemConfig) -> bool {
    i.last_watered_at_ms
        .is_some_and(|t| i.now_ms.saturating_sub(t) < u64::from(c.min_time_between_watering_ms))
}

fn below_critical_floor(i: &DecisionInputs, c: &SystemConfig) -> bool {
    i.moisture_percent < c.critical_dry_threshold
}

fn rain_imminent_3h(i: &DecisionInputs, c: &SystemConfig) -> bool {
    match i.forecast {
        ForecastView::Known { rain_3h_mm, .. } => {
            i.moisture_percent < c.safe_skip_threshold && rain_3h_mm >= c.rain_threshold_3h_mm
        }
        ForecastView::Unknown => false,
    }
}

fn rain_expected_6h(i: &DecisionInputs, c: &SystemConfig) -> bool {
    match i.forecast {
        ForecastView::Known { rain_6h_mm, .. } => {
            i.moisture_percent < c.preventive_skip_threshold && rain_6h_mm >= c.rain_threshold_6h_mm
        }
        ForecastView::Unknown => false,
    }
}

fn raining_now(i: &DecisionInputs, _c: &SystemConfig) -> bool {
    i.is_raining
}

fn below_dry_threshold(i: &DecisionInputs, c: &SystemConfig) -> bool {
    i.moisture_percent < c.soil_moisture_threshold_dry
}

fn always(_i: &DecisionInputs, _c: &SystemConfig) -> bool {
    true
}

// ── Critical-moisture watch ───────────────────────────────────

/// What the critical watch wants raised after a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticalSignal {
    None,
    /// Moisture just dropped below the critical alert level.
    EnteredCritical,
    /// Watering did not help; the plant's hardware fault is now latched.
    HardwareFault,
    /// Moisture recovered above the critical level; latch released.
    Recovered,
}

/// Tracks consecutive critical readings after a watering was issued.
///
/// Counting only starts once a `Water` decision has been acted on and
/// only runs while no watering is in progress, so the run gets a chance
/// to raise the reading before it counts against the hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CriticalWatch {
    in_critical: bool,
    armed: bool,
    latched: bool,
}

impl CriticalWatch {
    /// Record that a watering run was started for this plant.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Clear the hardware-fault latch by operator request.
    pub fn clear(&mut self, state: &mut PlantState) {
        self.latched = false;
        self.armed = false;
        state.consecutive_critical_readings = 0;
    }

    /// Fold one trusted reading into the watch.
    pub fn observe(&mut self, state: &mut PlantState, config: &SystemConfig) -> CriticalSignal {
        let critical = state.last_moisture_percent < config.critical_moisture_level;

        if !critical {
            let was_latched = self.latched;
            *self = Self::default();
            state.consecutive_critical_readings = 0;
            return if was_latched {
                CriticalSignal::Recovered
            } else {
                CriticalSignal::None
            };
        }

        let entered = !self.in_critical;
        self.in_critical = true;

        if self.armed && !state.is_watering_active {
            state.consecutive_critical_readings = state.consecutive_critical_readings.saturating_add(1);
            if !self.latched && state.consecutive_critical_readings > config.hardware_fault_tick_limit {
                self.latched = true;
                return CriticalSignal::HardwareFault;
            }
        }

        if entered {
            CriticalSignal::EnteredCritical
        } else {
            CriticalSignal::None
        }
    }
}
