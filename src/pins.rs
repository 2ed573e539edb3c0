//! GPIO / peripheral pin assignments for the PlantCare controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Soil moisture probes (capacitive, analog): ADC1
// ---------------------------------------------------------------------------

/// Plant 1 moisture probe.  ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const MOISTURE_1_ADC_GPIO: i32 = 1;
/// Plant 2 moisture probe.  ADC1 channel 1 (GPIO 2 on ESP32-S3).
pub const MOISTURE_2_ADC_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Rain probe (resistive board, analog): ADC1
// ---------------------------------------------------------------------------

/// ADC1 channel 2 (GPIO 3 on ESP32-S3).
pub const RAIN_ADC_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// Water path: one pump relay, one solenoid valve per plant
// ---------------------------------------------------------------------------

/// Pump relay coil.
pub const PUMP_RELAY_GPIO: i32 = 4;
/// Plant 1 solenoid valve relay.
pub const VALVE_1_GPIO: i32 = 5;
/// Plant 2 solenoid valve relay.
pub const VALVE_2_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Shade servo (LEDC PWM, 50 Hz)
// ---------------------------------------------------------------------------

pub const SERVO_PWM_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// I²C bus: TSL2561 light sensor
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Emergency stop (latching switch, active-low with pull-up)
// ---------------------------------------------------------------------------

/// LOW = stop engaged, HIGH = normal operation.
pub const ESTOP_GPIO: i32 = 10;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// 14-bit duty gives ~1.2 µs resolution at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Pulse width at 0°.
pub const SERVO_MIN_PULSE_US: u32 = 500;
/// Pulse width at 180°.
pub const SERVO_MAX_PULSE_US: u32 = 2500;
