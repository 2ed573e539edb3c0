//! Shading controller: lux hysteresis and a non-blocking servo sweep.
//!
//! ```text
//!            lux ≥ high
//!   Exposed ───────────▶ Shaded
//!      ▲                    │
//!      └────────────────────┘
//!        lux < high - band
//! ```
//!
//! A mode change retargets the servo; [`ShadingController::step`] then
//! moves it one degree per call, no faster than the configured step delay.
//! While the servo is travelling, lux readings are ignored so a sweep is
//! never reversed half-way.

use log::{debug, info};
use serde::Serialize;

use crate::config::SystemConfig;

/// Logical shade position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShadeMode {
    Exposed,
    Shaded,
}

/// Servo bookkeeping, reported in status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShadeState {
    pub current_angle: u8,
    pub target_angle: u8,
    pub is_covering_plants: bool,
}

pub struct ShadingController {
    mode: ShadeMode,
    state: ShadeState,
    last_step_at_ms: Option<u64>,
    lux_high: f32,
    band: f32,
    position_off: u8,
    position_on: u8,
    step_delay_ms: u32,
}

impl ShadingController {
    /// Start exposed, with the servo assumed parked at the off position.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            mode: ShadeMode::Exposed,
            state: ShadeState {
                current_angle: config.shade_position_off,
                target_angle: config.shade_position_off,
                is_covering_plants: false,
            },
            last_step_at_ms: None,
            lux_high: config.lux_threshold_high,
            band: config.lux_hysteresis_band,
            position_off: config.shade_position_off,
            position_on: config.shade_position_on,
            step_delay_ms: config.servo_step_delay_ms,
        }
    }

    /// Pick up new thresholds and positions.  A changed position for the
    /// current mode retargets the servo once it is at rest; a sweep in
    /// progress finishes first.
    pub fn apply_config(&mut self, config: &SystemConfig) {
        self.lux_high = config.lux_threshold_high;
        self.band = config.lux_hysteresis_band;
        self.position_off = config.shade_position_off;
        self.position_on = config.shade_position_on;
        self.step_delay_ms = config.servo_step_delay_ms;
        if !self.is_moving() {
            self.state.target_angle = self.position_for(self.mode);
        }
    }

    pub fn mode(&self) -> ShadeMode {
        self.mode
    }

    pub fn state(&self) -> ShadeState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        self.state.current_angle != self.state.target_angle
    }

    /// Feed a lux reading.  Returns the new mode on a transition.
    pub fn evaluate(&mut self, lux: f32) -> Option<ShadeMode> {
        if self.is_moving() {
            debug!("Shade: sweep in progress, lux {lux:.0} ignored");
            return None;
        }

        let next = match self.mode {
            ShadeMode::Exposed if lux >= self.lux_high => ShadeMode::Shaded,
            ShadeMode::Shaded if lux < self.lux_high - self.band => ShadeMode::Exposed,
            _ => return None,
        };

        self.mode = next;
        self.state.target_angle = self.position_for(next);
        self.state.is_covering_plants = next == ShadeMode::Shaded;
        info!(
            "Shade: {:?} at {lux:.0} lx, sweeping {}° -> {}°",
            next, self.state.current_angle, self.state.target_angle
        );
        Some(next)
    }

    /// Advance the sweep by at most one degree.  Returns the new angle
    /// when the servo should move.
    pub fn step(&mut self, now_ms: u64) -> Option<u8> {
        if !self.is_moving() {
            return None;
        }
        if let Some(last) = self.last_step_at_ms {
            if now_ms.saturating_sub(last) < u64::from(self.step_delay_ms) {
                return None;
            }
        }

        let current = self.state.current_angle;
        self.state.current_angle = if current < self.state.target_angle {
            current + 1
        } else {
            current - 1
        };
        self.last_step_at_ms = Some(now_ms);
        if !self.is_moving() {
            // Arrived: pick up a position changed mid-sweep.
            self.state.target_angle = self.position_for(self.mode);
        }
        Some(self.state.current_angle)
    }

    fn position_for(&self, mode: ShadeMode) -> u8 {
        match mode {
            ShadeMode::Exposed => self.position_off,
            ShadeMode::Shaded => self.position_on,
        }
    }
}
