//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod pump;
pub mod servo;
pub mod task_pin;
pub mod valve;
pub mod watchdog;
