//! Rain probe and the debouncer that turns its chatter into a stable flag.
//!
//! The resistive rain board is read as an analog level and classified
//! wet/dry against a threshold whose polarity is configurable.  Near the
//! boundary the classification flickers sample to sample, so the decision
//! engine only ever sees the debounced [`RainSensorState`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::config::RainPolarity;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
static SIM_RAIN_ADC: AtomicU16 = AtomicU16::new(1023);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_rain_adc(raw: u16) {
    SIM_RAIN_ADC.store(raw, Ordering::Relaxed);
}

/// Classify one raw analog sample.
pub fn is_wet(raw: u16, threshold: u16, polarity: RainPolarity) -> bool {
    match polarity {
        RainPolarity::WetBelow => raw < threshold,
        RainPolarity::WetAbove => raw > threshold,
    }
}

/// Debounced rain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RainSensorState {
    pub is_raining: bool,
    /// When the committed state last flipped; `None` = never.
    pub last_change_at_ms: Option<u64>,
}

/// Commits a raw level change only after it has held for `window_ms`.
#[derive(Debug, Clone)]
pub struct RainDebouncer {
    window_ms: u64,
    state: RainSensorState,
    /// Raw level that differs from the committed state, and since when.
    pending: Option<(bool, u64)>,
}

impl RainDebouncer {
    pub fn new(window_ms: u32) -> Self {
        Self {
            window_ms: u64::from(window_ms),
            state: RainSensorState::default(),
            pending: None,
        }
    }

    pub fn set_window(&mut self, window_ms: u32) {
        self.window_ms = u64::from(window_ms);
    }

    /// Feed one raw sample.  Returns the new committed value when the
    /// state flips on this sample.
    pub fn sample(&mut self, raw_wet: bool, now_ms: u64) -> Option<bool> {
        if raw_wet == self.state.is_raining {
            self.pending = None;
            return None;
        }

        let since = match self.pending {
            Some((level, since)) if level == raw_wet => since,
            _ => {
                self.pending = Some((raw_wet, now_ms));
                now_ms
            }
        };

        if now_ms.saturating_sub(since) >= self.window_ms {
            self.state = RainSensorState {
                is_raining: raw_wet,
                last_change_at_ms: Some(now_ms),
            };
            self.pending = None;
            return Some(raw_wet);
        }
        None
    }

    pub fn state(&self) -> RainSensorState {
        self.state
    }

    pub fn is_raining(&self) -> bool {
        self.state.is_raining
    }
}

/// Driver for the analog rain board on ADC1 channel 2
/// ([`pins::RAIN_ADC_GPIO`](crate::pins::RAIN_ADC_GPIO)).
#[derive(Debug, Default)]
pub struct RainProbe;

impl RainProbe {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "espidf")]
    pub fn read_raw(&mut self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_RAIN)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read_raw(&mut self) -> u16 {
        SIM_RAIN_ADC.load(Ordering::Relaxed)
    }
}
