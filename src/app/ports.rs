//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, event sinks, network feeds)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::error::SensorFault;
use crate::plant::PlantId;
use crate::weather::ForecastSnapshot;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain raw sensor data.
pub trait SensorPort {
    /// Raw moisture reading for one plant's probe.
    fn read_moisture_raw(&mut self, plant: PlantId) -> u16;

    /// Raw analog level of the shared rain probe.
    fn read_rain_raw(&mut self) -> u16;

    /// Ambient light in lux.  An unresponsive sensor reports
    /// [`SensorFault::LightSensor`].
    fn read_lux(&mut self) -> Result<f32, SensorFault>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
///
/// Only the pump arbiter drives the pump and valves, and only the
/// shading controller drives the servo.
pub trait ActuatorPort {
    fn start_pump(&mut self);

    fn stop_pump(&mut self);

    fn open_valve(&mut self, plant: PlantId);

    fn close_valve(&mut self, plant: PlantId);

    /// Move the shade servo to an absolute angle (0–180°).
    fn set_servo_angle(&mut self, degrees: u8);

    /// Pump off and both valves closed.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / alerts)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log,
/// webhook queue, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Network feeds (driven adapter: network context → domain)
// ───────────────────────────────────────────────────────────────

/// Read-only access to the last forecast published by the weather
/// collaborator.  Never blocks.
pub trait ForecastPort {
    fn latest_forecast(&self) -> Option<ForecastSnapshot>;
}

/// Whether the controller currently has network connectivity.
pub trait ConnectivityPort {
    fn is_online(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from event system)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a cadence comes due.
///
/// This decouples the [`Scheduler`](crate::scheduler::Scheduler) from the
/// ISR event queue.  The main loop implements this by forwarding to
/// [`push_event`](crate::events::push_event), but the scheduler itself
/// knows nothing about events, queues, or ISRs.
pub trait SchedulerDelegate {
    /// Called when a cadence fires.
    ///
    /// * `label`: the human-readable label of the cadence.
    /// * `kind` : which loop the cadence drives.
    fn on_schedule_fired(&mut self, label: &str, kind: ScheduleFiredKind);
}

/// Discriminant passed to [`SchedulerDelegate::on_schedule_fired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleFiredKind {
    /// Fast actuator loop: rain sampling, servo steps, pump guard.
    Actuator,
    /// Main decision loop.
    Control,
    /// Periodic status report.
    Status,
}
