//! End-to-end watering scenarios on simulated time.

use crate::mock_hw::{ActuatorCall, MockFeeds, Sim};

use plantcare::app::events::AppEvent;
use plantcare::config::SystemConfig;
use plantcare::control::pump_arbiter::RunOutcome;
use plantcare::plant::PlantId;

fn started(plant: PlantId) -> impl Fn(&AppEvent) -> bool {
    move |e| matches!(e, AppEvent::WateringStarted { plant: p, .. } if *p == plant)
}

#[test]
fn critical_plant_waters_while_raining() {
    let mut sim = Sim::with_defaults();
    sim.hw.rain_raw = 100; // wet with the default polarity
    sim.run_until(1_000);
    assert!(sim.app.is_raining());
    assert!(sim.sink.contains(&AppEvent::RainChanged { raining: true }));
    assert_eq!(sim.app.pump_holder(), None);

    sim.hw.set_moisture(PlantId::One, 10.0);
    sim.tick();
    assert_eq!(sim.app.pump_holder(), Some(PlantId::One));
    assert!(sim.hw.pump_on);
    assert!(sim.hw.valves[PlantId::One.index()]);
}

#[test]
fn rain_within_three_hours_defers_dry_plant() {
    let mut sim = Sim::with_defaults();
    sim.feeds = MockFeeds::forecast(5.0, 0.0, 0);
    sim.hw.set_moisture(PlantId::One, 25.0);

    sim.run_until(3_590_000);
    assert_eq!(sim.sink.count(started(PlantId::One)), 0);

    // Once the snapshot is older than the refresh interval it no longer
    // counts, and the dry rule takes over.
    sim.run_until(3_700_000);
    assert_eq!(sim.sink.count(started(PlantId::One)), 1);
}

#[test]
fn offline_ignores_cached_forecast() {
    let mut sim = Sim::with_defaults();
    sim.feeds = MockFeeds::forecast(5.0, 5.0, 0);
    sim.feeds.online = false;
    sim.hw.set_moisture(PlantId::One, 25.0);
    sim.run_until(100);
    assert_eq!(sim.sink.count(started(PlantId::One)), 1);
}

#[test]
fn contending_plants_take_turns() {
    let mut sim = Sim::with_defaults();
    sim.hw.set_moisture(PlantId::One, 10.0);
    sim.hw.set_moisture(PlantId::Two, 10.0);

    sim.run_until(19_000);
    assert_eq!(sim.app.pump_holder(), Some(PlantId::One));
    assert_eq!(sim.sink.count(started(PlantId::Two)), 0);

    sim.run_until(20_100);
    assert_eq!(sim.app.pump_holder(), Some(PlantId::Two));

    let order: Vec<_> = sim
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::WateringStarted { plant, .. } => Some(("start", *plant)),
            AppEvent::WateringEnded { plant, .. } => Some(("end", *plant)),
            _ => None,
        })
        .collect();
    assert_eq!(
        order,
        vec![("start", PlantId::One), ("end", PlantId::One), ("start", PlantId::Two)]
    );
}

#[test]
fn run_at_ceiling_times_out_with_valve_closed() {
    let config = SystemConfig {
        watering_dose_ms: 30_000,
        ..Default::default()
    };
    let mut sim = Sim::new(config);
    sim.hw.set_moisture(PlantId::One, 10.0);

    sim.run_until(30_100);
    assert!(sim.sink.contains(&AppEvent::WateringEnded {
        plant: PlantId::One,
        duration_ms: 30_000,
        outcome: RunOutcome::TimedOut,
    }));
    assert!(!sim.hw.pump_on);
    assert_eq!(sim.hw.valves, [false; 2]);
    // Pump off before the valve closes.
    let tail: Vec<_> = sim
        .hw
        .calls
        .iter()
        .filter(|c| !matches!(c, ActuatorCall::Servo(_)))
        .rev()
        .take(2)
        .collect();
    assert_eq!(tail, vec![&ActuatorCall::CloseValve(PlantId::One), &ActuatorCall::StopPump]);
}

#[test]
fn cooldown_blocks_repeat_watering() {
    let mut sim = Sim::with_defaults();
    sim.hw.set_moisture(PlantId::One, 25.0);

    sim.run_until(30_000);
    assert_eq!(sim.sink.count(started(PlantId::One)), 1);
    let ended_at = sim
        .app
        .plant(PlantId::One)
        .last_watered_at_ms
        .expect("run ended");

    // Below the critical floor right after, still inside the cooldown.
    sim.hw.set_moisture(PlantId::One, 16.0);
    sim.run_until(ended_at + 1_790_000);
    assert_eq!(sim.sink.count(started(PlantId::One)), 1);

    sim.run_until(ended_at + 1_830_000);
    assert_eq!(sim.sink.count(started(PlantId::One)), 2);
}

#[test]
fn target_moisture_completes_before_dose() {
    let mut sim = Sim::with_defaults();
    sim.hw.set_moisture(PlantId::Two, 25.0);
    sim.run_until(5_000);
    assert_eq!(sim.app.pump_holder(), Some(PlantId::Two));

    sim.hw.set_moisture(PlantId::Two, 45.0);
    sim.run_until(10_100);
    assert_eq!(sim.app.pump_holder(), None);
    let ended = sim.sink.events.iter().find_map(|e| match e {
        AppEvent::WateringEnded {
            plant: PlantId::Two,
            duration_ms,
            outcome,
        } => Some((*duration_ms, *outcome)),
        _ => None,
    });
    let (duration_ms, outcome) = ended.expect("run ended");
    assert_eq!(outcome, RunOutcome::Completed);
    assert!(duration_ms < 20_000);
}
