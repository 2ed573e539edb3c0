//! Control algorithms: watering rules, pump arbitration, shading.

pub mod irrigation;
pub mod pump_arbiter;
pub mod shading;
