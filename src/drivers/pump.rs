//! Water pump relay driver.
//!
//! A single relay switches the shared pump.  Which plant receives the
//! water is decided by the solenoid valves (see [`super::valve`]).
//!
//! ## Safety contract
//!
//! The pump must never run with every valve closed.  Enforced by the
//! pump arbiter; this driver is a dumb actuator.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the relay GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Stopped,
    Running,
}

pub struct PumpDriver {
    state: PumpState,
    relay_gpio: i32,
}

impl Default for PumpDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PumpDriver {
    pub fn new() -> Self {
        Self::with_gpio(pins::PUMP_RELAY_GPIO)
    }

    pub fn with_gpio(relay_gpio: i32) -> Self {
        Self {
            state: PumpState::Stopped,
            relay_gpio,
        }
    }

    pub fn start(&mut self) {
        hw_init::gpio_write(self.relay_gpio, true);
        self.state = PumpState::Running;
    }

    pub fn stop(&mut self) {
        hw_init::gpio_write(self.relay_gpio, false);
        self.state = PumpState::Stopped;
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PumpState::Running
    }
}
