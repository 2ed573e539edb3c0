//! Per-plant identity and bookkeeping.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One of the two plants sharing the pump and the shade.
///
/// Ordering matters: within a control tick plant `One` is always
/// evaluated before plant `Two`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlantId {
    One,
    Two,
}

impl PlantId {
    /// Both plants, in evaluation order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Zero-based array index.
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// Human-facing plant number (1 or 2).
    pub const fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plant {}", self.number())
    }
}

/// Engine-owned state for a single plant.
///
/// Timestamps are milliseconds on the controller's monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlantState {
    pub plant_id: PlantId,
    /// Last trusted calibrated reading (0–100).
    pub last_moisture_percent: f32,
    /// End of the most recent watering run; `None` = never (since boot).
    pub last_watered_at_ms: Option<u64>,
    pub is_watering_active: bool,
    /// Consecutive ticks below the critical alert level after a watering
    /// was issued.
    pub consecutive_critical_readings: u8,
}

impl PlantState {
    pub fn new(plant_id: PlantId) -> Self {
        Self {
            plant_id,
            last_moisture_percent: 0.0,
            last_watered_at_ms: None,
            is_watering_active: false,
            consecutive_critical_readings: 0,
        }
    }
}
