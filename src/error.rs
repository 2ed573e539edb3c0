//! Unified error types for the PlantCare firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level error handling uniform.  All variants are `Copy` so they can be
//! passed through the control loop without allocation.

use core::fmt;

use crate::plant::PlantId;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid (fatal at startup, rejected at runtime).
    Config(ConfigError),
    /// The shared pump path could not be acquired.
    Pump(PumpError),
    /// A sensor is reporting implausible data.
    Sensor(SensorFault),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Pump(e) => write!(f, "pump: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range or consistency validation.
    /// The `&'static str` names the field and the rule.
    ValidationFailed(&'static str),
    /// The serialized config could not be parsed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Malformed => write!(f, "malformed config"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Pump arbitration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpError {
    /// Another plant holds the lease.  Transient; retried next tick.
    Busy { holder: PlantId },
    /// The emergency stop is engaged; no lease is granted until it clears.
    EmergencyStopped,
}

impl fmt::Display for PumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy { holder } => write!(f, "busy (held by {holder})"),
            Self::EmergencyStopped => write!(f, "emergency stop engaged"),
        }
    }
}

impl From<PumpError> for Error {
    fn from(e: PumpError) -> Self {
        Self::Pump(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// Sensor faults are accumulated in a bitfield by the sensor-health
/// supervisor so several can be active and cleared independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorFault {
    /// Plant 1 moisture probe out of plausible range.
    Moisture1 = 0b0000_0001,
    /// Plant 2 moisture probe out of plausible range.
    Moisture2 = 0b0000_0010,
    /// Light sensor not answering on the I²C bus.
    LightSensor = 0b0000_0100,
}

impl SensorFault {
    pub const ALL: [Self; 3] = [Self::Moisture1, Self::Moisture2, Self::LightSensor];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// The moisture-probe fault belonging to `plant`.
    pub const fn moisture(plant: PlantId) -> Self {
        match plant {
            PlantId::One => Self::Moisture1,
            PlantId::Two => Self::Moisture2,
        }
    }
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moisture1 => write!(f, "plant 1 moisture probe implausible"),
            Self::Moisture2 => write!(f, "plant 2 moisture probe implausible"),
            Self::LightSensor => write!(f, "light sensor unresponsive"),
        }
    }
}

impl From<SensorFault> for Error {
    fn from(e: SensorFault) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
