//! PlantCare Firmware: Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   NotifySink<LogEventSink>   SharedFeeds      │
//! │  (Sensor+Actuator) (EventSink)                (Forecast+Net)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Rules · Pump arbiter · Shade · Sensor health          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) · Notifier thread (Core 0)        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use log::{info, warn};

use plantcare::adapters::hardware::HardwareAdapter;
use plantcare::adapters::log_sink::LogEventSink;
use plantcare::adapters::notify_sink::NotifySink;
use plantcare::adapters::shared_feeds::SharedFeeds;
use plantcare::adapters::time::MonotonicClock;
use plantcare::app::commands::AppCommand;
use plantcare::app::ports::{ScheduleFiredKind, SchedulerDelegate};
use plantcare::app::service::AppService;
use plantcare::config::SystemConfig;
use plantcare::error::ConfigError;
use plantcare::drivers;
use plantcare::events::{self, Event, push_event};
use plantcare::notifier::{self, LogOnlyTransport, RetryPolicy};
use plantcare::scheduler::Scheduler;
use plantcare::sensors::{self, SensorHub};
use plantcare::sensors::lux::{TSL2561_ADDR, Tsl2561};
use plantcare::sensors::rain::RainProbe;

// ── Scheduler delegate ────────────────────────────────────────
//
// Bridges the scheduler (which knows nothing about the event system)
// to the ISR event queue.

struct EventQueueDelegate;

impl SchedulerDelegate for EventQueueDelegate {
    fn on_schedule_fired(&mut self, label: &str, kind: ScheduleFiredKind) {
        let event = match kind {
            ScheduleFiredKind::Actuator => Event::ActuatorTick,
            ScheduleFiredKind::Control => Event::ControlTick,
            ScheduleFiredKind::Status => Event::StatusTick,
        };
        if !push_event(event) {
            warn!("Event queue full, '{}' tick dropped", label);
        }
    }
}

/// Build-time JSON overrides, if any; defaults otherwise.  A rejected
/// override stops the boot.
fn load_config() -> Result<SystemConfig, ConfigError> {
    let json = option_env!("PLANTCARE_CONFIG_JSON");
    match SystemConfig::from_build_override(json) {
        Ok(cfg) => {
            if json.is_some() {
                info!("Config loaded from build-time JSON");
            }
            Ok(cfg)
        }
        Err(e) => {
            log::error!("Build-time config rejected: {}", e);
            Err(e)
        }
    }
}

fn estop_command() -> AppCommand {
    if sensors::estop_engaged() {
        AppCommand::EmergencyStop
    } else {
        AppCommand::ClearEmergencyStop
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PlantCare v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Hardware peripherals ───────────────────────────────
    drivers::hw_init::init_peripherals()?;
    if let Err(e) = drivers::hw_init::init_isr_service() {
        log::error!("ISR service init failed: {}; e-stop polled at boot only", e);
    }
    let watchdog = drivers::watchdog::Watchdog::default();

    let peripherals = Peripherals::take()?;
    // SDA/SCL as in pins::I2C_SDA_GPIO / I2C_SCL_GPIO.
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &I2cConfig::new().baudrate(100.kHz().into()),
    )?;

    // ── 3. Configuration ──────────────────────────────────────
    // An invalid configuration is fatal here.
    let config = load_config()?;

    // ── 4. Adapters ───────────────────────────────────────────
    let sensor_hub = SensorHub::new(
        RainProbe::new(),
        Tsl2561::new(i2c, TSL2561_ADDR),
    );
    let mut hw = HardwareAdapter::new(sensor_hub, config.valve_active_low);
    info!("Sensors at boot: {:?}", hw.sensor_hub().snapshot());
    let feeds = SharedFeeds;
    let mut sink = NotifySink::new(LogEventSink::new());
    let clock = MonotonicClock::new();

    // No forecast client is wired in; the rules run on local sensing.
    warn!("No forecast source configured; forecast stays unknown");
    notifier::spawn(LogOnlyTransport, RetryPolicy::from_config(&config))?;

    // ── 5. App service ────────────────────────────────────────
    let mut sched = Scheduler::from_config(&config);
    let mut sched_delegate = EventQueueDelegate;
    let mut app = AppService::new(config)?;
    app.start(&mut hw, &mut sink);
    if sensors::estop_engaged() {
        app.handle_command(AppCommand::EmergencyStop, clock.uptime_ms(), &mut hw, &mut sink);
    }

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        let now = clock.uptime_ms();
        sched.poll(now, &mut sched_delegate);

        events::drain_events(|event| match event {
            Event::ActuatorTick => app.poll(now, &mut hw, &mut sink),
            Event::ControlTick => app.tick(now, &mut hw, &feeds, &mut sink),
            Event::StatusTick => app.publish_status(now, &mut sink),
            Event::EmergencyStopChanged => {
                app.handle_command(estop_command(), now, &mut hw, &mut sink);
            }
        });

        // Feed watchdog on every iteration.
        watchdog.feed();

        let idle_ms = sched.ms_until_next(clock.uptime_ms()).unwrap_or(1).max(1);
        std::thread::sleep(std::time::Duration::from_millis(idle_ms));
    }
}
