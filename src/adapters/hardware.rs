//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only
//! module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::i2c::I2c;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::pump::PumpDriver;
use crate::drivers::servo::ServoDriver;
use crate::drivers::valve::ValveDriver;
use crate::error::SensorFault;
use crate::plant::PlantId;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C> {
    sensor_hub: SensorHub<I2C>,
    pump: PumpDriver,
    valves: [ValveDriver; 2],
    servo: ServoDriver,
}

impl<I2C: I2c> HardwareAdapter<I2C> {
    pub fn new(sensor_hub: SensorHub<I2C>, valve_active_low: bool) -> Self {
        Self {
            sensor_hub,
            pump: PumpDriver::new(),
            valves: PlantId::ALL.map(|p| ValveDriver::for_plant(p, valve_active_low)),
            servo: ServoDriver::new(),
        }
    }

    pub fn sensor_hub(&mut self) -> &mut SensorHub<I2C> {
        &mut self.sensor_hub
    }

    pub fn is_pump_running(&self) -> bool {
        self.pump.is_running()
    }

    pub fn is_valve_open(&self, plant: PlantId) -> bool {
        self.valves[plant.index()].is_open()
    }

    pub fn servo_angle(&self) -> Option<u8> {
        self.servo.angle()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C: I2c> SensorPort for HardwareAdapter<I2C> {
    fn read_moisture_raw(&mut self, plant: PlantId) -> u16 {
        self.sensor_hub.read_moisture_raw(plant)
    }

    fn read_rain_raw(&mut self) -> u16 {
        self.sensor_hub.read_rain_raw()
    }

    fn read_lux(&mut self) -> Result<f32, SensorFault> {
        self.sensor_hub.read_lux()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I2C: I2c> ActuatorPort for HardwareAdapter<I2C> {
    fn start_pump(&mut self) {
        self.pump.start();
    }

    fn stop_pump(&mut self) {
        self.pump.stop();
    }

    fn open_valve(&mut self, plant: PlantId) {
        self.valves[plant.index()].open();
    }

    fn close_valve(&mut self, plant: PlantId) {
        self.valves[plant.index()].close();
    }

    fn set_servo_angle(&mut self, degrees: u8) {
        self.servo.set_angle(degrees);
    }

    fn all_off(&mut self) {
        self.pump.stop();
        for v in &mut self.valves {
            v.close();
        }
    }
}
