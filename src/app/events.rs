//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, queue a webhook
//! notification, etc.

use serde::Serialize;

use crate::control::pump_arbiter::RunOutcome;
use crate::control::shading::ShadeState;
use crate::error::{ConfigError, SensorFault};
use crate::plant::{PlantId, PlantState};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started.
    Started,

    /// Moisture dropped below the critical alert level.
    CriticalMoisture { plant: PlantId, percent: f32 },

    /// Watering repeatedly failed to lift a critical reading.
    HardwareFault { plant: PlantId },

    /// The hardware-fault latch was released.
    HardwareFaultCleared { plant: PlantId },

    /// A plant acquired the pump lease.
    WateringStarted { plant: PlantId, max_duration_ms: u64 },

    /// A pump run ended.
    WateringEnded {
        plant: PlantId,
        duration_ms: u64,
        outcome: RunOutcome,
    },

    /// The shade changed logical position.
    ShadeChanged { covering: bool, target_angle: u8 },

    SensorFaultRaised(SensorFault),

    SensorFaultCleared(SensorFault),

    /// The debounced rain probe flipped.
    RainChanged { raining: bool },

    ConnectivityChanged { online: bool },

    EmergencyStop { engaged: bool },

    /// A runtime configuration update was applied.
    ConfigUpdated,

    /// A runtime configuration update was rejected; the old config stays.
    ConfigRejected(ConfigError),

    /// Periodic status report.
    Status(StatusReport),
}

impl AppEvent {
    /// Whether this event goes out as a remote notification.
    pub fn is_notifiable(&self) -> bool {
        matches!(
            self,
            Self::CriticalMoisture { .. }
                | Self::HardwareFault { .. }
                | Self::WateringStarted { .. }
                | Self::WateringEnded { .. }
                | Self::Status(_)
        )
    }
}

/// Per-plant slice of a status report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlantStatus {
    pub state: PlantState,
    pub hardware_fault: bool,
    pub sensor_fault: bool,
}

/// A point-in-time status snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    pub uptime_ms: u64,
    pub plants: [PlantStatus; 2],
    pub shade: ShadeState,
    pub raining: bool,
    pub online: bool,
    pub forecast_known: bool,
    pub pump_holder: Option<PlantId>,
    pub emergency_stopped: bool,
    pub sensor_faults: u8,
}
