//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/PWM registers.  The water-path
//! invariants are checked on every call.

use plantcare::app::events::AppEvent;
use plantcare::app::ports::{ActuatorPort, ConnectivityPort, EventSink, ForecastPort, SensorPort};
use plantcare::error::SensorFault;
use plantcare::plant::PlantId;
use plantcare::weather::ForecastSnapshot;

/// Raw reading that maps to roughly `percent` with the default
/// calibration (dry 492, wet 202).
pub fn raw_for_percent(percent: f32) -> u16 {
    (492.0 - percent / 100.0 * 290.0).round() as u16
}

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    StartPump,
    StopPump,
    OpenValve(PlantId),
    CloseValve(PlantId),
    Servo(u8),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub moisture_raw: [u16; 2],
    pub rain_raw: u16,
    pub lux: Result<f32, SensorFault>,
    pub pump_on: bool,
    pub valves: [bool; 2],
    pub servo: Option<u8>,
    /// Water-path invariant breaches, one entry per offending call.
    pub violations: Vec<String>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            moisture_raw: [raw_for_percent(60.0); 2],
            rain_raw: 1023,
            lux: Ok(1_000.0),
            pump_on: false,
            valves: [false; 2],
            servo: None,
            violations: Vec::new(),
        }
    }

    pub fn set_moisture(&mut self, plant: PlantId, percent: f32) {
        self.moisture_raw[plant.index()] = raw_for_percent(percent);
    }

    pub fn count(&self, call: ActuatorCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn assert_invariants(&self) {
        assert!(self.violations.is_empty(), "invariant violations: {:?}", self.violations);
    }

    fn record(&mut self, call: ActuatorCall) {
        self.calls.push(call);
        let open = self.valves.iter().filter(|v| **v).count();
        if open > 1 {
            self.violations.push(format!("{call:?}: two valves open"));
        }
        if self.pump_on && open == 0 {
            self.violations.push(format!("{call:?}: pump on with every valve closed"));
        }
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
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

impl ActuatorPort for MockHardware {
    fn start_pump(&mut self) {
        self.pump_on = true;
        self.record(ActuatorCall::StartPump);
    }

    fn stop_pump(&mut self) {
        self.pump_on = false;
        self.record(ActuatorCall::StopPump);
    }

    fn open_valve(&mut self, plant: PlantId) {
        self.valves[plant.index()] = true;
        self.record(ActuatorCall::OpenValve(plant));
    }

    fn close_valve(&mut self, plant: PlantId) {
        self.valves[plant.index()] = false;
        self.record(ActuatorCall::CloseValve(plant));
    }

    fn set_servo_angle(&mut self, degrees: u8) {
        self.servo = Some(degrees);
        self.record(ActuatorCall::Servo(degrees));
    }

    fn all_off(&mut self) {
        self.pump_on = false;
        self.valves = [false; 2];
        self.record(ActuatorCall::AllOff);
    }
}

// ── Feeds ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockFeeds {
    pub online: bool,
    pub forecast: Option<ForecastSnapshot>,
}

#[allow(dead_code)]
impl MockFeeds {
    pub fn offline() -> Self {
        Self::default()
    }

    /// Online with a snapshot fetched at `fetched_at_ms`.
    pub fn forecast(rain_3h_mm: f32, rain_6h_mm: f32, fetched_at_ms: u64) -> Self {
        Self {
            online: true,
            forecast: Some(ForecastSnapshot {
                rain_3h_mm,
                rain_6h_mm,
                fetched_at_ms,
            }),
        }
    }
}

impl ForecastPort for MockFeeds {
    fn latest_forecast(&self) -> Option<ForecastSnapshot> {
        self.forecast
    }
}

impl ConnectivityPort for MockFeeds {
    fn is_online(&self) -> bool {
        self.online
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Sim ───────────────────────────────────────────────────────

use plantcare::app::service::AppService;
use plantcare::config::SystemConfig;

/// Service plus mocks, driven on the configured poll/control cadence.
///
/// Polls land on exact multiples of the poll interval and control ticks
/// on exact multiples of the control interval; when both are due at the
/// same instant the tick runs first.
pub struct Sim {
    pub app: AppService,
    pub hw: MockHardware,
    pub feeds: MockFeeds,
    pub sink: RecordingSink,
    pub now_ms: u64,
    next_tick_ms: u64,
    next_poll_ms: u64,
}

#[allow(dead_code)]
impl Sim {
    pub fn new(config: SystemConfig) -> Self {
        let mut app = AppService::new(config).expect("valid config");
        let mut hw = MockHardware::new();
        let mut sink = RecordingSink::new();
        app.start(&mut hw, &mut sink);
        Self {
            app,
            hw,
            feeds: MockFeeds::offline(),
            sink,
            now_ms: 0,
            next_tick_ms: 0,
            next_poll_ms: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SystemConfig::default())
    }

    /// Run one control tick right now, outside the cadence.
    pub fn tick(&mut self) {
        self.app.tick(self.now_ms, &mut self.hw, &self.feeds, &mut self.sink);
    }

    /// Run every poll and tick due before `until_ms`.  Time then rests on
    /// the next due instant, which may be `until_ms` itself or just past it.
    pub fn run_until(&mut self, until_ms: u64) {
        while self.now_ms < until_ms {
            if self.now_ms >= self.next_tick_ms {
                self.tick();
                self.next_tick_ms += u64::from(self.app.config().control_loop_interval_ms);
            }
            if self.now_ms >= self.next_poll_ms {
                self.app.poll(self.now_ms, &mut self.hw, &mut self.sink);
                self.next_poll_ms += u64::from(self.app.config().actuator_poll_interval_ms);
            }
            self.now_ms = self.next_tick_ms.min(self.next_poll_ms);
        }
        self.hw.assert_invariants();
    }

    pub fn run_for(&mut self, ms: u64) {
        self.run_until(self.now_ms + ms);
    }
}
