//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(s) => {
                let [p1, p2] = &s.plants;
                info!(
                    "STATUS | up={}s | p1={:.1}% water={} hw={} sens={} | \
                     p2={:.1}% water={} hw={} sens={} | shade={}\u{00b0}->{}\u{00b0} | \
                     rain={} online={} forecast={} | pump={:?} estop={} | faults=0b{:03b}",
                    s.uptime_ms / 1_000,
                    p1.state.last_moisture_percent,
                    p1.state.is_watering_active,
                    p1.hardware_fault,
                    p1.sensor_fault,
                    p2.state.last_moisture_percent,
                    p2.state.is_watering_active,
                    p2.hardware_fault,
                    p2.sensor_fault,
                    s.shade.current_angle,
                    s.shade.target_angle,
                    s.raining,
                    s.online,
                    s.forecast_known,
                    s.pump_holder,
                    s.emergency_stopped,
                    s.sensor_faults,
                );
            }
            AppEvent::Started => info!("START | actuators parked"),
            AppEvent::CriticalMoisture { plant, percent } => {
                warn!("ALERT | {plant} critical moisture {percent:.1}%");
            }
            AppEvent::HardwareFault { plant } => {
                error!("ALERT | {plant} hardware fault, watering suspended");
            }
            AppEvent::HardwareFaultCleared { plant } => info!("FAULT | {plant} hardware fault cleared"),
            AppEvent::WateringStarted {
                plant,
                max_duration_ms,
            } => info!("WATER | {plant} started (max {max_duration_ms} ms)"),
            AppEvent::WateringEnded {
                plant,
                duration_ms,
                outcome,
            } => info!("WATER | {plant} ended after {duration_ms} ms ({outcome:?})"),
            AppEvent::ShadeChanged {
                covering,
                target_angle,
            } => info!(
                "SHADE | {} -> {target_angle}\u{00b0}",
                if *covering { "covering" } else { "exposing" }
            ),
            AppEvent::SensorFaultRaised(f) => error!("FAULT | {f}"),
            AppEvent::SensorFaultCleared(f) => info!("FAULT | cleared: {f}"),
            AppEvent::RainChanged { raining } => info!("RAIN | raining={raining}"),
            AppEvent::ConnectivityChanged { online } => info!("NET | online={online}"),
            AppEvent::EmergencyStop { engaged } => warn!("ESTOP | engaged={engaged}"),
            AppEvent::ConfigUpdated => info!("CONFIG | updated"),
            AppEvent::ConfigRejected(e) => warn!("CONFIG | rejected: {e}"),
        }
    }
}
