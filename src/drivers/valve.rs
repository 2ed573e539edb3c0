//! Solenoid valve driver, one per plant.
//!
//! Relay boards differ in polarity, so each valve knows whether its
//! GPIO is active-low.  The logical state is what callers see.

use crate::drivers::hw_init;
use crate::pins;
use crate::plant::PlantId;

pub struct ValveDriver {
    gpio: i32,
    active_low: bool,
    open: bool,
}

impl ValveDriver {
    /// Valve for `plant`, driven closed immediately.
    pub fn for_plant(plant: PlantId, active_low: bool) -> Self {
        let gpio = match plant {
            PlantId::One => pins::VALVE_1_GPIO,
            PlantId::Two => pins::VALVE_2_GPIO,
        };
        let mut v = Self {
            gpio,
            active_low,
            open: true,
        };
        v.close();
        v
    }

    pub fn open(&mut self) {
        self.drive(true);
    }

    pub fn close(&mut self) {
        self.drive(false);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// GPIO level for a logical state.
    pub fn level_for(open: bool, active_low: bool) -> bool {
        open != active_low
    }

    fn drive(&mut self, open: bool) {
        hw_init::gpio_write(self.gpio, Self::level_for(open, self.active_low));
        self.open = open;
    }
}
