//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (e-stop ISR,
//! operator console, provisioning) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::SystemConfig;
use crate::plant::PlantId;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Validate and hot-reload configuration.  Rejected updates leave the
    /// live config untouched.
    UpdateConfig(SystemConfig),

    /// Force the water path off and refuse new leases.
    EmergencyStop,

    /// Allow watering again after an emergency stop.
    ClearEmergencyStop,

    /// Release a plant's hardware-fault latch by operator request.
    ClearHardwareFault(PlantId),

    /// Emit a status report now instead of waiting for the cadence.
    RequestStatus,
}
