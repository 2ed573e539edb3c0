//! Integration tests for the AppService → arbiter / shade → actuators
//! pipeline, driven through commands and the two loop entry points.

use crate::mock_hw::{ActuatorCall, MockFeeds, Sim};

use plantcare::app::commands::AppCommand;
use plantcare::app::events::AppEvent;
use plantcare::config::SystemConfig;
use plantcare::control::pump_arbiter::RunOutcome;
use plantcare::error::ConfigError;
use plantcare::plant::PlantId;

#[test]
fn start_parks_everything() {
    let sim = Sim::with_defaults();
    assert_eq!(sim.hw.calls, vec![ActuatorCall::AllOff, ActuatorCall::Servo(180)]);
    assert_eq!(sim.sink.events, vec![AppEvent::Started]);
}

#[test]
fn bright_light_sweeps_shade_one_degree_at_a_time() {
    let mut sim = Sim::with_defaults();
    sim.hw.lux = Ok(20_000.0);
    sim.run_until(100);
    assert!(sim.sink.contains(&AppEvent::ShadeChanged {
        covering: true,
        target_angle: 90,
    }));

    sim.run_until(2_000);
    assert_eq!(sim.hw.servo, Some(90));
    let angles: Vec<u8> = sim
        .hw
        .calls
        .iter()
        .filter_map(|c| match c {
            ActuatorCall::Servo(a) => Some(*a),
            _ => None,
        })
        .collect();
    assert!(angles.windows(2).all(|w| w[0].abs_diff(w[1]) <= 1));
    assert_eq!(angles.len(), 1 + 90);
}

#[test]
fn shade_holds_inside_hysteresis_band() {
    let mut sim = Sim::with_defaults();
    sim.hw.lux = Ok(15_000.0);
    sim.run_until(5_000);
    assert!(sim.app.shade_state().is_covering_plants);

    sim.hw.lux = Ok(14_000.0);
    sim.run_until(30_000);
    assert!(sim.app.shade_state().is_covering_plants);

    sim.hw.lux = Ok(13_000.0);
    sim.run_until(45_000);
    assert!(!sim.app.shade_state().is_covering_plants);
    assert_eq!(sim.app.shade_state().current_angle, 180);
    assert_eq!(
        sim.sink.count(|e| matches!(e, AppEvent::ShadeChanged { .. })),
        2
    );
}

#[test]
fn emergency_stop_aborts_run_and_blocks_new_ones() {
    let mut sim = Sim::with_defaults();
    sim.hw.set_moisture(PlantId::One, 10.0);
    sim.run_until(5_000);
    assert!(sim.hw.pump_on);

    sim.app
        .handle_command(AppCommand::EmergencyStop, sim.now_ms, &mut sim.hw, &mut sim.sink);
    assert!(!sim.hw.pump_on);
    assert_eq!(sim.hw.valves, [false; 2]);
    assert!(sim.sink.contains(&AppEvent::EmergencyStop { engaged: true }));
    assert!(sim.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::WateringEnded {
            plant: PlantId::One,
            outcome: RunOutcome::Aborted,
            ..
        }
    )));

    // Plant 2 goes critical; still nothing runs.
    sim.hw.set_moisture(PlantId::Two, 5.0);
    sim.run_for(60_000);
    assert_eq!(sim.app.pump_holder(), None);
    assert!(!sim.hw.pump_on);

    sim.app
        .handle_command(AppCommand::ClearEmergencyStop, sim.now_ms, &mut sim.hw, &mut sim.sink);
    sim.run_for(10_100);
    assert_eq!(sim.app.pump_holder(), Some(PlantId::Two));
}

#[test]
fn repeated_emergency_stop_is_idempotent() {
    let mut sim = Sim::with_defaults();
    for _ in 0..3 {
        sim.app
            .handle_command(AppCommand::EmergencyStop, 0, &mut sim.hw, &mut sim.sink);
    }
    assert_eq!(
        sim.sink.count(|e| matches!(e, AppEvent::EmergencyStop { .. })),
        1
    );
}

#[test]
fn config_update_applies_and_rejects() {
    let mut sim = Sim::with_defaults();

    let tighter = SystemConfig {
        shade_position_on: 60,
        ..Default::default()
    };
    sim.app
        .handle_command(AppCommand::UpdateConfig(tighter), 0, &mut sim.hw, &mut sim.sink);
    assert_eq!(sim.sink.events.last(), Some(&AppEvent::ConfigUpdated));
    assert_eq!(sim.app.config().shade_position_on, 60);

    let broken = SystemConfig {
        watering_dose_ms: 60_000,
        ..Default::default()
    };
    sim.app
        .handle_command(AppCommand::UpdateConfig(broken), 0, &mut sim.hw, &mut sim.sink);
    assert!(matches!(
        sim.sink.events.last(),
        Some(AppEvent::ConfigRejected(ConfigError::ValidationFailed(_)))
    ));
    assert_eq!(sim.app.config().shade_position_on, 60);
    assert_eq!(sim.app.config().watering_dose_ms, 20_000);

    // The live config drives the next sweep.
    sim.hw.lux = Ok(50_000.0);
    sim.run_until(5_000);
    assert_eq!(sim.hw.servo, Some(60));
}

#[test]
fn connectivity_transitions_are_reported_once() {
    let mut sim = Sim::with_defaults();
    sim.feeds = MockFeeds::forecast(0.0, 0.0, 0);
    sim.run_until(30_000);
    sim.feeds.online = false;
    sim.run_until(60_000);
    sim.feeds.online = true;
    sim.run_until(90_000);

    let seen: Vec<bool> = sim
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ConnectivityChanged { online } => Some(*online),
            _ => None,
        })
        .collect();
    assert_eq!(seen, vec![true, false, true]);
}

#[test]
fn status_report_snapshot() {
    let mut sim = Sim::with_defaults();
    sim.hw.set_moisture(PlantId::Two, 10.0);
    sim.run_until(5_000);

    sim.app
        .handle_command(AppCommand::RequestStatus, sim.now_ms, &mut sim.hw, &mut sim.sink);
    let Some(AppEvent::Status(report)) = sim.sink.events.last() else {
        panic!("no status report");
    };
    assert_eq!(report.uptime_ms, sim.now_ms);
    assert_eq!(report.pump_holder, Some(PlantId::Two));
    assert!(report.plants[1].state.is_watering_active);
    assert!(!report.plants[0].state.is_watering_active);
    assert!(!report.emergency_stopped);
    assert_eq!(report.sensor_faults, 0);
    assert_eq!(sim.app.tick_count(), 1);
}

#[test]
fn periodic_status_serializes() {
    let sim = Sim::with_defaults();
    let report = sim.app.status(42);
    let json = serde_json::to_string(&report).expect("serializable");
    assert!(json.contains(r#""uptime_ms":42"#));
    assert!(json.contains(r#""pump_holder":null"#));
}
