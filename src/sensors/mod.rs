//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver.  The control loop reads it through
//! the [`SensorPort`](crate::app::ports::SensorPort) implemented by the
//! hardware adapter; [`SensorHub::snapshot`] gives a one-shot view for
//! bring-up logging.

pub mod lux;
pub mod moisture;
pub mod rain;

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::i2c::I2c;
use log::warn;

use crate::error::SensorFault;
use crate::plant::PlantId;
use lux::Tsl2561;
use moisture::MoistureProbe;
use rain::RainProbe;

/// Atomic cache of the emergency-stop switch, written from the GPIO ISR
/// or from `set_estop_from_isr()` at boot.  `true` = stop engaged.
static ESTOP_ENGAGED_ATOMIC: AtomicBool = AtomicBool::new(false);

/// Update the e-stop state from an ISR or boot-time GPIO read.
/// Lock-free: safe to call from interrupt context.
pub fn set_estop_from_isr(engaged: bool) {
    ESTOP_ENGAGED_ATOMIC.store(engaged, Ordering::Release);
}

/// Latest e-stop level seen by the ISR.
pub fn estop_engaged() -> bool {
    ESTOP_ENGAGED_ATOMIC.load(Ordering::Acquire)
}

/// Raw readings of every sensor at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    pub moisture_raw: [u16; 2],
    pub rain_raw: u16,
    pub lux: Result<f32, SensorFault>,
}

/// Aggregates all sensor drivers.
pub struct SensorHub<I2C> {
    pub moisture: [MoistureProbe; 2],
    pub rain: RainProbe,
    pub light: Tsl2561<I2C>,
}

impl<I2C: I2c> SensorHub<I2C> {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(rain: RainProbe, light: Tsl2561<I2C>) -> Self {
        Self {
            moisture: [MoistureProbe::new(PlantId::One), MoistureProbe::new(PlantId::Two)],
            rain,
            light,
        }
    }

    pub fn read_moisture_raw(&mut self, plant: PlantId) -> u16 {
        self.moisture[plant.index()].read_raw()
    }

    pub fn read_rain_raw(&mut self) -> u16 {
        self.rain.read_raw()
    }

    /// Light level, with bus errors folded into [`SensorFault::LightSensor`].
    pub fn read_lux(&mut self) -> Result<f32, SensorFault> {
        self.light.read_lux().map_err(|e| {
            warn!("TSL2561 read failed: {e:?}");
            SensorFault::LightSensor
        })
    }

    /// Read every sensor once.
    pub fn snapshot(&mut self) -> SensorSnapshot {
        SensorSnapshot {
            moisture_raw: [
                self.read_moisture_raw(PlantId::One),
                self.read_moisture_raw(PlantId::Two),
            ],
            rain_raw: self.read_rain_raw(),
            lux: self.read_lux(),
        }
    }
}
