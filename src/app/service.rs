//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the per-plant state, the pump arbiter, the shading
//! controller, the rain debouncer and the sensor-health supervisor.  It
//! exposes a clean, hardware-agnostic API driven by explicit `now_ms`
//! ticks.  All I/O flows through port traits injected at call sites,
//! making the entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService          │
//! ActuatorPort ◀──│  Rules · Arbiter · Shade     │
//!                 │  Debouncer · Sensor health   │
//!  ForecastPort ─▶└──────────────────────────────┘
//! ```
//!
//! Two entry points run on different cadences:
//!
//! - [`AppService::poll`]: fast actuator loop: rain sampling, dose
//!   deadline, pump ceiling guard, one servo step.
//! - [`AppService::tick`]: control loop: connectivity, lux, then plant 1
//!   and plant 2 through the decision rules.

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::irrigation::{CriticalSignal, CriticalWatch, DecisionInputs, WateringDecision, decide};
use crate::control::pump_arbiter::{LeaseTick, PumpArbiter, PumpLease, PumpRun, RunOutcome};
use crate::control::shading::{ShadeState, ShadingController};
use crate::error::{ConfigError, PumpError, SensorFault};
use crate::plant::{PlantId, PlantState};
use crate::safety::{HealthChange, SensorHealth};
use crate::sensors::rain::{RainDebouncer, is_wet};
use crate::weather::ForecastView;

use super::commands::AppCommand;
use super::events::{AppEvent, PlantStatus, StatusReport};
use super::ports::{ActuatorPort, ConnectivityPort, EventSink, ForecastPort, SensorPort};

/// A run in progress: the lease plus the normal end of the dose.
struct Watering {
    lease: PumpLease,
    dose_until_ms: u64,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    plants: [PlantState; 2],
    watches: [CriticalWatch; 2],
    health: SensorHealth,
    rain: RainDebouncer,
    shade: ShadingController,
    arbiter: PumpArbiter,
    watering: Option<Watering>,
    /// Whether each probe has produced at least one trusted reading.
    has_reading: [bool; 2],
    online: bool,
    forecast_known: bool,
    tick_count: u64,
}

impl AppService {
    /// Construct the service.  An invalid configuration is fatal here.
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            plants: PlantId::ALL.map(PlantState::new),
            watches: [CriticalWatch::default(); 2],
            health: SensorHealth::new(&config),
            rain: RainDebouncer::new(config.rain_debounce_ms),
            shade: ShadingController::new(&config),
            arbiter: PumpArbiter::new(config.pump_max_duration_ms, config.actuator_poll_interval_ms),
            watering: None,
            has_reading: [false; 2],
            online: false,
            forecast_known: false,
            tick_count: 0,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every actuator to a known state.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        hw.set_servo_angle(self.shade.state().current_angle);
        sink.emit(&AppEvent::Started);
        info!("AppService started");
    }

    // ── Fast actuator loop ────────────────────────────────────

    /// Rain sampling, pump guards and one servo step.
    pub fn poll(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        let raw = hw.read_rain_raw();
        let wet = is_wet(raw, self.config.rain_analog_threshold, self.config.rain_polarity);
        if let Some(raining) = self.rain.sample(wet, now_ms) {
            info!("Rain probe: {}", if raining { "wet" } else { "dry" });
            sink.emit(&AppEvent::RainChanged { raining });
        }

        // The ceiling guard runs first: a dose equal to the ceiling is a
        // timeout, not a completion.
        if let Some(run) = self.arbiter.enforce(now_ms, hw) {
            self.watering = None;
            self.finish_run(run, sink);
        }

        self.complete_dose_if_due(now_ms, hw, sink);

        if let Some(angle) = self.shade.step(now_ms) {
            hw.set_servo_angle(angle);
        }
    }

    // ── Control loop ──────────────────────────────────────────

    /// Run one full decision cycle.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        feeds: &(impl ForecastPort + ConnectivityPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Connectivity and forecast
        let online = feeds.is_online();
        if online != self.online {
            self.online = online;
            if online {
                info!("Connectivity restored");
            } else {
                warn!("Offline: forecast unavailable, using local sensing only");
            }
            sink.emit(&AppEvent::ConnectivityChanged { online });
        }
        let forecast = ForecastView::resolve(
            feeds.latest_forecast(),
            online,
            now_ms,
            self.config.forecast_refresh_interval_ms,
        );
        if forecast.is_known() != self.forecast_known {
            self.forecast_known = forecast.is_known();
            info!("Forecast {}", if self.forecast_known { "available" } else { "unknown" });
        }

        // 2. Shading
        match hw.read_lux() {
            Ok(lux) => {
                let change = self.health.check_light(true);
                self.emit_health(change, sink);
                if self.shade.evaluate(lux).is_some() {
                    let s = self.shade.state();
                    sink.emit(&AppEvent::ShadeChanged {
                        covering: s.is_covering_plants,
                        target_angle: s.target_angle,
                    });
                }
            }
            Err(fault) => {
                debug!("Lux unavailable ({fault}); holding shade state");
                let change = self.health.check_light(false);
                self.emit_health(change, sink);
            }
        }

        // 3. Plants, always in order
        for plant in PlantId::ALL {
            self.evaluate_plant(plant, now_ms, forecast, hw, sink);
        }
    }

    fn evaluate_plant(
        &mut self,
        plant: PlantId,
        now_ms: u64,
        forecast: ForecastView,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        let i = plant.index();

        let raw = hw.read_moisture_raw(plant);
        let (trusted, change) = self.health.check_moisture(plant, raw);
        self.emit_health(change, sink);
        if trusted {
            self.plants[i].last_moisture_percent = self.config.calibration_for(plant).percent(raw);
            self.has_reading[i] = true;
        } else {
            debug!("{plant}: implausible raw reading {raw} ignored");
        }

        self.advance_watering(plant, trusted, now_ms, hw, sink);

        if trusted {
            match self.watches[i].observe(&mut self.plants[i], &self.config) {
                CriticalSignal::None => {}
                CriticalSignal::EnteredCritical => {
                    let percent = self.plants[i].last_moisture_percent;
                    warn!("{plant}: critical moisture {percent:.1}%");
                    sink.emit(&AppEvent::CriticalMoisture { plant, percent });
                }
                CriticalSignal::HardwareFault => {
                    log::error!("{plant}: watering is not raising moisture, suspending");
                    sink.emit(&AppEvent::HardwareFault { plant });
                }
                CriticalSignal::Recovered => {
                    info!("{plant}: moisture recovered, hardware fault cleared");
                    sink.emit(&AppEvent::HardwareFaultCleared { plant });
                }
            }
        }

        // Nothing to decide on until the probe has been believed once.
        if !self.has_reading[i] {
            debug!("{plant}: no trusted reading yet");
            return;
        }

        let inputs = DecisionInputs {
            moisture_percent: self.plants[i].last_moisture_percent,
            lease_held: self.holds_lease(plant),
            last_watered_at_ms: self.plants[i].last_watered_at_ms,
            now_ms,
            forecast,
            is_raining: self.rain.is_raining(),
            sensor_faulted: self.health.has_fault(SensorFault::moisture(plant)),
            hardware_fault_latched: self.watches[i].is_latched(),
        };
        let (decision, rule) = decide(&inputs, &self.config);
        debug!(
            "{plant}: {:.1}% -> {decision:?} ({rule})",
            inputs.moisture_percent
        );

        if decision == WateringDecision::Water {
            self.start_watering(plant, now_ms, hw, sink);
        }
    }

    // ── Watering lifecycle ────────────────────────────────────

    fn holds_lease(&self, plant: PlantId) -> bool {
        self.watering
            .as_ref()
            .is_some_and(|w| w.lease.plant() == plant)
    }

    fn start_watering(
        &mut self,
        plant: PlantId,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        // The lease runs to the hard ceiling; the dose normally ends first.
        match self
            .arbiter
            .request(plant, self.config.pump_max_duration_ms, now_ms, hw)
        {
            Ok(lease) => {
                let i = plant.index();
                let max_duration_ms = lease.expires_at_ms().saturating_sub(now_ms);
                self.plants[i].is_watering_active = true;
                self.watches[i].arm();
                self.watering = Some(Watering {
                    lease,
                    dose_until_ms: now_ms.saturating_add(u64::from(self.config.watering_dose_ms)),
                });
                sink.emit(&AppEvent::WateringStarted {
                    plant,
                    max_duration_ms,
                });
            }
            Err(PumpError::Busy { holder }) => {
                debug!("{plant}: pump busy ({holder}), retrying next tick");
            }
            Err(e @ PumpError::EmergencyStopped) => {
                warn!("{plant}: watering refused, {e}");
            }
        }
    }

    /// Move a held lease forward on a control tick: stop at target
    /// moisture, let the arbiter check expiry, then stop at end of dose.
    fn advance_watering(
        &mut self,
        plant: PlantId,
        trusted: bool,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let Some(w) = self.watering.take_if(|w| w.lease.plant() == plant) else {
            return;
        };

        let reached_target = trusted
            && self.plants[plant.index()].last_moisture_percent
                >= self.config.soil_moisture_threshold_target;
        if reached_target {
            if let Some(run) = self.arbiter.release(w.lease, RunOutcome::Completed, now_ms, hw) {
                self.finish_run(run, sink);
            }
            return;
        }

        match self.arbiter.tick(w.lease, now_ms, hw) {
            LeaseTick::Held(lease) if now_ms >= w.dose_until_ms => {
                if let Some(run) = self.arbiter.release(lease, RunOutcome::Completed, now_ms, hw) {
                    self.finish_run(run, sink);
                }
            }
            LeaseTick::Held(lease) => {
                self.watering = Some(Watering {
                    lease,
                    dose_until_ms: w.dose_until_ms,
                });
            }
            LeaseTick::TimedOut(run) => self.finish_run(run, sink),
            LeaseTick::Revoked(p) => debug!("{p}: lease already revoked"),
        }
    }

    fn complete_dose_if_due(&mut self, now_ms: u64, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let Some(w) = self.watering.take_if(|w| now_ms >= w.dose_until_ms) else {
            return;
        };
        if let Some(run) = self.arbiter.release(w.lease, RunOutcome::Completed, now_ms, hw) {
            self.finish_run(run, sink);
        }
    }

    fn finish_run(&mut self, run: PumpRun, sink: &mut impl EventSink) {
        let state = &mut self.plants[run.plant.index()];
        state.is_watering_active = false;
        state.last_watered_at_ms = Some(run.ended_at_ms);
        match run.outcome {
            RunOutcome::Completed => info!("{}: watered for {} ms", run.plant, run.duration_ms()),
            RunOutcome::TimedOut => warn!("{}: watering hit the pump ceiling", run.plant),
            RunOutcome::Aborted => warn!("{}: watering aborted", run.plant),
        }
        sink.emit(&AppEvent::WateringEnded {
            plant: run.plant,
            duration_ms: run.duration_ms(),
            outcome: run.outcome,
        });
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (e-stop ISR, console, provisioning).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::UpdateConfig(new_config) => match self.check_update(&new_config) {
                Ok(()) => {
                    self.health.apply_config(&new_config);
                    self.rain.set_window(new_config.rain_debounce_ms);
                    self.shade.apply_config(&new_config);
                    self.arbiter
                        .set_limits(new_config.pump_max_duration_ms, new_config.actuator_poll_interval_ms);
                    self.config = new_config;
                    info!("Configuration updated at runtime");
                    sink.emit(&AppEvent::ConfigUpdated);
                }
                Err(e) => {
                    warn!("Configuration update rejected: {e}");
                    sink.emit(&AppEvent::ConfigRejected(e));
                }
            },
            AppCommand::EmergencyStop => {
                if self.arbiter.is_emergency_stopped() {
                    return;
                }
                // Drop the token first; the arbiter revokes it below.
                self.watering = None;
                if let Some(run) = self.arbiter.emergency_stop(now_ms, hw) {
                    self.finish_run(run, sink);
                }
                sink.emit(&AppEvent::EmergencyStop { engaged: true });
            }
            AppCommand::ClearEmergencyStop => {
                if self.arbiter.is_emergency_stopped() {
                    self.arbiter.clear_emergency_stop();
                    sink.emit(&AppEvent::EmergencyStop { engaged: false });
                }
            }
            AppCommand::ClearHardwareFault(plant) => {
                let i = plant.index();
                if self.watches[i].is_latched() {
                    self.watches[i].clear(&mut self.plants[i]);
                    info!("{plant}: hardware fault cleared by operator");
                    sink.emit(&AppEvent::HardwareFaultCleared { plant });
                }
            }
            AppCommand::RequestStatus => self.publish_status(now_ms, sink),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a status snapshot from the current state.
    pub fn status(&self, now_ms: u64) -> StatusReport {
        let plant_status = |plant: PlantId| PlantStatus {
            state: self.plants[plant.index()],
            hardware_fault: self.watches[plant.index()].is_latched(),
            sensor_fault: self.health.has_fault(SensorFault::moisture(plant)),
        };
        StatusReport {
            uptime_ms: now_ms,
            plants: PlantId::ALL.map(plant_status),
            shade: self.shade.state(),
            raining: self.rain.is_raining(),
            online: self.online,
            forecast_known: self.forecast_known,
            pump_holder: self.arbiter.holder(),
            emergency_stopped: self.arbiter.is_emergency_stopped(),
            sensor_faults: self.health.faults(),
        }
    }

    /// Emit the periodic status report.
    pub fn publish_status(&self, now_ms: u64, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Status(self.status(now_ms)));
    }

    pub fn plant(&self, plant: PlantId) -> &PlantState {
        &self.plants[plant.index()]
    }

    pub fn shade_state(&self) -> ShadeState {
        self.shade.state()
    }

    pub fn pump_holder(&self) -> Option<PlantId> {
        self.arbiter.holder()
    }

    pub fn is_raining(&self) -> bool {
        self.rain.is_raining()
    }

    pub fn is_emergency_stopped(&self) -> bool {
        self.arbiter.is_emergency_stopped()
    }

    pub fn is_hardware_fault_latched(&self, plant: PlantId) -> bool {
        self.watches[plant.index()].is_latched()
    }

    /// Current sensor fault bitmask (0 = no faults).
    pub fn sensor_faults(&self) -> u8 {
        self.health.faults()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// A runtime update must validate and must not touch settings that are
    /// fixed at boot.
    fn check_update(&self, new_config: &SystemConfig) -> Result<(), ConfigError> {
        new_config.validate()?;
        if new_config.valve_active_low != self.config.valve_active_low {
            return Err(ConfigError::ValidationFailed(
                "valve_active_low is fixed by the relay wiring and cannot change at runtime",
            ));
        }
        Ok(())
    }

    fn emit_health(&self, change: Option<HealthChange>, sink: &mut impl EventSink) {
        match change {
            Some(HealthChange::Raised(f)) => sink.emit(&AppEvent::SensorFaultRaised(f)),
            Some(HealthChange::Cleared(f)) => sink.emit(&AppEvent::SensorFaultCleared(f)),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::ForecastSnapshot;

    /// Minimal in-module rig; the full mock lives in tests/integration.
    struct Rig {
        moisture_raw: [u16; 2],
        rain_raw: u16,
        lux: Result<f32, SensorFault>,
        pump_on: bool,
        valves: [bool; 2],
        servo: Option<u8>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                moisture_raw: [300, 300],
                rain_raw: 1023,
                lux: Ok(1_000.0),
                pump_on: false,
                valves: [false; 2],
                servo: None,
            }
        }
    }

    impl SensorPort for Rig {
        fn read_moisture_raw(&mut self, plant: PlantId) -> u16 {
            self.moisture_raw[plant.index()]
        }
        fn read_rain_raw(&mut self) -> u16 {
            self.rain_raw
        }
        fn read_lux(&mut self) -> Result<f32, SensorFault> {
            self.lux
        }
    }

    impl ActuatorPort for Rig {
        fn start_pump(&mut self) {
            self.pump_on = true;
        }
        fn stop_pump(&mut self) {
            self.pump_on = false;
        }
        fn open_valve(&mut self, plant: PlantId) {
            self.valves[plant.index()] = true;
        }
        fn close_valve(&mut self, plant: PlantId) {
            self.valves[plant.index()] = false;
        }
        fn set_servo_angle(&mut self, degrees: u8) {
            self.servo = Some(degrees);
        }
        fn all_off(&mut self) {
            self.pump_on = false;
            self.valves = [false; 2];
        }
    }

    struct Feeds(Option<ForecastSnapshot>, bool);

    impl ForecastPort for Feeds {
        fn latest_forecast(&self) -> Option<ForecastSnapshot> {
            self.0
        }
    }

    impl ConnectivityPort for Feeds {
        fn is_online(&self) -> bool {
            self.1
        }
    }

    #[derive(Default)]
    struct Events(Vec<AppEvent>);

    impl EventSink for Events {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    fn service() -> AppService {
        AppService::new(SystemConfig::default()).unwrap()
    }

    #[test]
    fn invalid_config_is_fatal_at_construction() {
        let c = SystemConfig {
            lux_hysteresis_band: 0.0,
            ..Default::default()
        };
        assert!(AppService::new(c).is_err());
    }

    #[test]
    fn start_parks_actuators() {
        let mut app = service();
        let mut hw = Rig::new();
        hw.pump_on = true;
        let mut ev = Events::default();
        app.start(&mut hw, &mut ev);
        assert!(!hw.pump_on);
        assert_eq!(hw.servo, Some(180));
        assert_eq!(ev.0, vec![AppEvent::Started]);
    }

    #[test]
    fn dry_plant_waters_and_stops_at_dose() {
        let mut app = service();
        let mut hw = Rig::new();
        hw.moisture_raw = [440, 300]; // ~18 % and ~66 %
        let mut ev = Events::default();
        let feeds = Feeds(None, false);

        app.tick(0, &mut hw, &feeds, &mut ev);
        assert_eq!(app.pump_holder(), Some(PlantId::One));
        assert!(hw.pump_on && hw.valves[0]);

        app.poll(19_999, &mut hw, &mut ev);
        assert!(hw.pump_on);
        app.poll(20_000, &mut hw, &mut ev);
        assert!(!hw.pump_on && !hw.valves[0]);
        assert_eq!(app.plant(PlantId::One).last_watered_at_ms, Some(20_000));
        assert!(ev.0.contains(&AppEvent::WateringEnded {
            plant: PlantId::One,
            duration_ms: 20_000,
            outcome: RunOutcome::Completed,
        }));
    }

    #[test]
    fn target_moisture_ends_run_early() {
        let mut app = service();
        let mut hw = Rig::new();
        hw.moisture_raw = [440, 300];
        let mut ev = Events::default();
        let feeds = Feeds(None, false);

        app.tick(0, &mut hw, &feeds, &mut ev);
        hw.moisture_raw[0] = 300; // wet
        app.tick(10_000, &mut hw, &feeds, &mut ev);
        assert_eq!(app.pump_holder(), None);
        assert!(!app.plant(PlantId::One).is_watering_active);
    }

    #[test]
    fn emergency_stop_closes_path_and_blocks() {
        let mut app = service();
        let mut hw = Rig::new();
        hw.moisture_raw = [440, 300];
        let mut ev = Events::default();
        let feeds = Feeds(None, false);

        app.tick(0, &mut hw, &feeds, &mut ev);
        app.handle_command(AppCommand::EmergencyStop, 1_000, &mut hw, &mut ev);
        assert!(!hw.pump_on && hw.valves == [false; 2]);
        assert!(app.is_emergency_stopped());

        // Even a bone-dry plant cannot start a run now.
        hw.moisture_raw = [492, 492];
        app.tick(2_000_000, &mut hw, &feeds, &mut ev);
        assert_eq!(app.pump_holder(), None);

        app.handle_command(AppCommand::ClearEmergencyStop, 2_000_500, &mut hw, &mut ev);
        app.tick(2_010_000, &mut hw, &feeds, &mut ev);
        assert_eq!(app.pump_holder(), Some(PlantId::One));
    }

    #[test]
    fn rejected_config_keeps_previous() {
        let mut app = service();
        let mut hw = Rig::new();
        let mut ev = Events::default();
        let bad = SystemConfig {
            critical_dry_threshold: 50.0,
            ..Default::default()
        };
        app.handle_command(AppCommand::UpdateConfig(bad), 0, &mut hw, &mut ev);
        assert!(matches!(ev.0.last(), Some(AppEvent::ConfigRejected(_))));
        assert_eq!(app.config(), &SystemConfig::default());
    }

    #[test]
    fn runtime_update_cannot_lift_pump_ceiling() {
        let mut app = service();
        let mut hw = Rig::new();
        hw.moisture_raw = [460, 300];
        let mut ev = Events::default();
        let feeds = Feeds(None, false);

        let unbounded = SystemConfig {
            pump_max_duration_ms: u32::MAX,
            watering_dose_ms: u32::MAX,
            ..Default::default()
        };
        app.handle_command(AppCommand::UpdateConfig(unbounded), 0, &mut hw, &mut ev);
        assert!(matches!(ev.0.last(), Some(AppEvent::ConfigRejected(_))));

        app.tick(0, &mut hw, &feeds, &mut ev);
        assert_eq!(app.pump_holder(), Some(PlantId::One));
        let mut now = 0;
        while now <= 3_600_000 && hw.pump_on {
            app.poll(now, &mut hw, &mut ev);
            now += 15;
        }
        assert!(!hw.pump_on);
        assert!(now <= 30_015);
    }

    #[test]
    fn relay_polarity_is_fixed_at_runtime() {
        let mut app = service();
        let mut hw = Rig::new();
        let mut ev = Events::default();
        let flipped = SystemConfig {
            valve_active_low: true,
            ..Default::default()
        };
        app.handle_command(AppCommand::UpdateConfig(flipped), 0, &mut hw, &mut ev);
        assert!(matches!(
            ev.0.last(),
            Some(AppEvent::ConfigRejected(ConfigError::ValidationFailed(_)))
        ));
        assert!(!app.config().valve_active_low);
    }

    #[test]
    fn lux_failure_holds_shade() {
        let mut app = service();
        let mut hw = Rig::new();
        let mut ev = Events::default();
        let feeds = Feeds(None, false);

        hw.lux = Ok(20_000.0);
        app.tick(0, &mut hw, &feeds, &mut ev);
        assert!(app.shade_state().is_covering_plants);

        hw.lux = Err(SensorFault::LightSensor);
        for n in 1..=4 {
            app.tick(n * 10_000, &mut hw, &feeds, &mut ev);
        }
        assert!(app.shade_state().is_covering_plants);
        assert!(ev.0.contains(&AppEvent::SensorFaultRaised(SensorFault::LightSensor)));
    }

    #[test]
    fn status_reflects_state() {
        let mut app = service();
        let mut hw = Rig::new();
        hw.moisture_raw = [440, 300];
        let mut ev = Events::default();
        app.tick(0, &mut hw, &Feeds(None, true), &mut ev);

        let s = app.status(5_000);
        assert_eq!(s.uptime_ms, 5_000);
        assert_eq!(s.pump_holder, Some(PlantId::One));
        assert!(s.plants[0].state.is_watering_active);
        assert!(!s.plants[1].state.is_watering_active);
        assert!(s.online);
        assert!(!s.forecast_known);
    }
}
