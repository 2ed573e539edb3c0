//! Capacitive soil-moisture probes and their two-point calibration.
//!
//! Each plant has its own probe on an ADC1 channel.  The raw reading is
//! mapped to 0–100 % with [`calibrate`], which works for either probe
//! polarity (dry reading above or below the wet one).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from static atomics for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::config::ProbeCalibration;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::plant::PlantId;

#[cfg(not(target_os = "espidf"))]
static SIM_MOISTURE_ADC: [AtomicU16; 2] = [AtomicU16::new(300), AtomicU16::new(300)];

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_moisture_adc(plant: PlantId, raw: u16) {
    SIM_MOISTURE_ADC[plant.index()].store(raw, Ordering::Relaxed);
}

/// Map a raw reading onto 0–100 %, where 0 is the dry calibration point
/// and 100 the wet one.
///
/// The reading is first clamped into the interval spanned by the two
/// points, so the result never leaves `[0, 100]`.  `dry == wet` is rejected
/// by config validation; here it degrades to 0 %.
pub fn calibrate(raw: u16, dry: u16, wet: u16) -> f32 {
    if dry == wet {
        return 0.0;
    }
    let clamped = raw.clamp(dry.min(wet), dry.max(wet));
    let span = f32::from(wet) - f32::from(dry);
    let percent = (f32::from(clamped) - f32::from(dry)) / span * 100.0;
    percent.clamp(0.0, 100.0)
}

impl ProbeCalibration {
    pub fn percent(&self, raw: u16) -> f32 {
        calibrate(raw, self.dry_raw, self.wet_raw)
    }
}

/// Driver for one moisture probe.
pub struct MoistureProbe {
    plant: PlantId,
    #[cfg(target_os = "espidf")]
    adc_channel: u32,
    last_raw: u16,
}

impl MoistureProbe {
    pub fn new(plant: PlantId) -> Self {
        Self {
            plant,
            #[cfg(target_os = "espidf")]
            adc_channel: match plant {
                PlantId::One => hw_init::ADC1_CH_MOISTURE_1,
                PlantId::Two => hw_init::ADC1_CH_MOISTURE_2,
            },
            last_raw: 0,
        }
    }

    pub fn plant(&self) -> PlantId {
        self.plant
    }

    pub fn read_raw(&mut self) -> u16 {
        self.last_raw = self.read_adc();
        self.last_raw
    }

    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_MOISTURE_ADC[self.plant.index()].load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_to_zero_and_hundred() {
        assert_eq!(calibrate(492, 492, 202), 0.0);
        assert_eq!(calibrate(202, 492, 202), 100.0);
    }

    #[test]
    fn midpoint_is_fifty_percent_for_either_polarity() {
        assert!((calibrate(347, 492, 202) - 50.0).abs() < 0.01);
        assert!((calibrate(347, 202, 492) - 50.0).abs() < 0.01);
    }

    #[test]
    fn out_of_range_readings_clamp() {
        // High-dry probe: anything drier than dry is 0, wetter than wet is 100.
        assert_eq!(calibrate(1023, 492, 202), 0.0);
        assert_eq!(calibrate(0, 492, 202), 100.0);
        // Low-dry probe.
        assert_eq!(calibrate(0, 300, 1023), 0.0);
        assert_eq!(calibrate(u16::MAX, 300, 1023), 100.0);
    }

    #[test]
    fn equal_points_degrade_to_zero() {
        assert_eq!(calibrate(500, 400, 400), 0.0);
    }

    #[test]
    fn probe_calibration_delegates() {
        let cal = ProbeCalibration {
            dry_raw: 1023,
            wet_raw: 300,
        };
        assert_eq!(cal.percent(300), 100.0);
    }

    #[test]
    fn sim_probe_reads_injected_value() {
        sim_set_moisture_adc(PlantId::Two, 412);
        let mut p = MoistureProbe::new(PlantId::Two);
        assert_eq!(p.read_raw(), 412);
        assert_eq!(p.last_raw(), 412);
    }
}
