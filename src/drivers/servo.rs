//! Hobby servo on an LEDC channel.
//!
//! Angles map linearly onto the pulse range in [`crate::pins`]; the pulse
//! is converted to a duty count for the 50 Hz, 14-bit timer.  Sweep
//! smoothing is done upstream by the shading controller, one degree per
//! call.

use crate::drivers::hw_init;
use crate::pins;

const PERIOD_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
const DUTY_MAX: u32 = (1 << pins::SERVO_PWM_RESOLUTION_BITS) - 1;

/// Pulse width for an angle, clamped to 0–180°.
pub fn pulse_us(degrees: u8) -> u32 {
    let deg = u32::from(degrees.min(180));
    let span = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
    pins::SERVO_MIN_PULSE_US + span * deg / 180
}

/// LEDC duty count for a pulse width.
pub fn duty_for_pulse(pulse_us: u32) -> u32 {
    (pulse_us.min(PERIOD_US) * DUTY_MAX) / PERIOD_US
}

pub struct ServoDriver {
    channel: u32,
    angle: Option<u8>,
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver {
    pub fn new() -> Self {
        Self {
            channel: hw_init::LEDC_CH_SERVO,
            angle: None,
        }
    }

    pub fn set_angle(&mut self, degrees: u8) {
        let degrees = degrees.min(180);
        hw_init::ledc_set(self.channel, duty_for_pulse(pulse_us(degrees)));
        self.angle = Some(degrees);
    }

    /// Last commanded angle, `None` before the first command.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}
