//! Degraded-mode behaviour: faulted probes, the light sensor and the
//! hardware-fault latch.

use crate::mock_hw::Sim;

use plantcare::app::commands::AppCommand;
use plantcare::app::events::AppEvent;
use plantcare::error::SensorFault;
use plantcare::plant::PlantId;

fn started(plant: PlantId) -> impl Fn(&AppEvent) -> bool {
    move |e| matches!(e, AppEvent::WateringStarted { plant: p, .. } if *p == plant)
}

#[test]
fn shorted_probe_faults_after_streak_and_clears_on_good_reading() {
    let mut sim = Sim::with_defaults();
    sim.hw.moisture_raw[PlantId::One.index()] = 0;

    sim.run_until(20_001);
    assert!(!sim.sink.contains(&AppEvent::SensorFaultRaised(SensorFault::Moisture1)));

    sim.run_until(30_001);
    assert!(sim.sink.contains(&AppEvent::SensorFaultRaised(SensorFault::Moisture1)));
    assert_eq!(sim.app.sensor_faults(), SensorFault::Moisture1.mask());
    assert!(sim.app.status(sim.now_ms).plants[0].sensor_fault);

    sim.hw.set_moisture(PlantId::One, 60.0);
    sim.run_until(40_001);
    assert!(sim.sink.contains(&AppEvent::SensorFaultCleared(SensorFault::Moisture1)));
    assert_eq!(sim.app.sensor_faults(), 0);
}

#[test]
fn no_decision_before_first_trusted_reading() {
    let mut sim = Sim::with_defaults();
    sim.hw.moisture_raw[PlantId::Two.index()] = 1023; // open circuit
    sim.run_until(100_000);
    assert_eq!(sim.sink.count(started(PlantId::Two)), 0);
    assert!(!sim.hw.pump_on);

    // The first believable reading is acted on straight away.
    sim.hw.set_moisture(PlantId::Two, 10.0);
    sim.run_for(100);
    assert_eq!(sim.sink.count(started(PlantId::Two)), 1);
}

#[test]
fn faulted_probe_skips_dry_rule() {
    let mut sim = Sim::with_defaults();
    sim.hw.rain_raw = 100;
    sim.run_until(10_000);
    assert!(sim.app.is_raining());

    // Dry, but it is raining: skipped.
    sim.hw.set_moisture(PlantId::One, 25.0);
    sim.run_until(20_000);
    assert_eq!(sim.sink.count(started(PlantId::One)), 0);

    sim.hw.moisture_raw[PlantId::One.index()] = 0;
    sim.run_until(60_000);
    assert!(sim.sink.contains(&AppEvent::SensorFaultRaised(SensorFault::Moisture1)));

    // Rain stops.  The last trusted 25% would be watered by the dry rule,
    // but only the critical floor applies to a faulted probe.
    sim.hw.rain_raw = 1023;
    sim.run_until(80_000);
    assert!(!sim.app.is_raining());
    assert_eq!(sim.sink.count(started(PlantId::One)), 0);

    sim.hw.set_moisture(PlantId::One, 25.0);
    sim.run_for(100);
    assert!(sim.sink.contains(&AppEvent::SensorFaultCleared(SensorFault::Moisture1)));
    assert_eq!(sim.sink.count(started(PlantId::One)), 1);
}

#[test]
fn faulted_probe_still_waters_below_critical_floor() {
    let mut sim = Sim::with_defaults();
    sim.app
        .handle_command(AppCommand::EmergencyStop, 0, &mut sim.hw, &mut sim.sink);
    sim.hw.set_moisture(PlantId::One, 18.0);
    sim.run_until(10_000);
    assert_eq!(sim.app.pump_holder(), None);

    sim.hw.moisture_raw[PlantId::One.index()] = 0;
    sim.run_until(50_000);
    assert!(sim.sink.contains(&AppEvent::SensorFaultRaised(SensorFault::Moisture1)));

    sim.app
        .handle_command(AppCommand::ClearEmergencyStop, sim.now_ms, &mut sim.hw, &mut sim.sink);
    sim.run_for(100);
    assert_eq!(sim.app.pump_holder(), Some(PlantId::One));
}

#[test]
fn watering_that_never_helps_latches_hardware_fault() {
    let mut sim = Sim::with_defaults();
    sim.hw.set_moisture(PlantId::One, 10.0);

    // One run, then critical ticks at 20 s, 30 s, 40 s: at the limit.
    sim.run_until(40_001);
    assert!(!sim.app.is_hardware_fault_latched(PlantId::One));

    sim.run_until(50_001);
    assert!(sim.app.is_hardware_fault_latched(PlantId::One));
    assert!(sim.sink.contains(&AppEvent::HardwareFault { plant: PlantId::One }));
    assert_eq!(
        sim.sink
            .count(|e| matches!(e, AppEvent::CriticalMoisture { plant: PlantId::One, .. })),
        1
    );

    // Latched well past the cooldown.
    sim.run_until(1_900_000);
    assert_eq!(sim.sink.count(started(PlantId::One)), 1);
    assert!(sim.app.status(sim.now_ms).plants[0].hardware_fault);

    sim.app.handle_command(
        AppCommand::ClearHardwareFault(PlantId::One),
        sim.now_ms,
        &mut sim.hw,
        &mut sim.sink,
    );
    assert!(sim.sink.contains(&AppEvent::HardwareFaultCleared { plant: PlantId::One }));
    sim.run_for(10_100);
    assert_eq!(sim.sink.count(started(PlantId::One)), 2);
}

#[test]
fn recovered_moisture_releases_latch() {
    let mut sim = Sim::with_defaults();
    sim.hw.set_moisture(PlantId::Two, 10.0);
    sim.run_until(60_000);
    assert!(sim.app.is_hardware_fault_latched(PlantId::Two));

    sim.hw.set_moisture(PlantId::Two, 50.0);
    sim.run_for(10_000);
    assert!(!sim.app.is_hardware_fault_latched(PlantId::Two));
    assert!(sim.sink.contains(&AppEvent::HardwareFaultCleared { plant: PlantId::Two }));
}

#[test]
fn light_sensor_fault_holds_shade() {
    let mut sim = Sim::with_defaults();
    sim.hw.lux = Ok(20_000.0);
    sim.run_until(10_000);
    assert!(sim.app.shade_state().is_covering_plants);

    sim.hw.lux = Err(SensorFault::LightSensor);
    sim.run_until(50_000);
    assert!(sim.sink.contains(&AppEvent::SensorFaultRaised(SensorFault::LightSensor)));
    assert!(sim.app.shade_state().is_covering_plants);
    assert_eq!(sim.hw.servo, Some(90));

    sim.hw.lux = Ok(0.0);
    sim.run_until(60_001);
    assert!(sim.sink.contains(&AppEvent::SensorFaultCleared(SensorFault::LightSensor)));
    assert!(!sim.app.shade_state().is_covering_plants);
}
