//! Fuzz target: pump lease arbitration
//!
//! Decodes the input into a sequence of lease requests, owner ticks,
//! releases, stalls and emergency stops, and verifies after every step:
//! - At most one lease is outstanding
//! - The pump never runs with every valve closed, and never two valves open
//! - No run outlives the ceiling
//! - A revoked lease never touches the hardware again
//!
//! cargo fuzz run fuzz_pump_lease

#![no_main]

use libfuzzer_sys::fuzz_target;
use plantcare::app::ports::ActuatorPort;
use plantcare::control::pump_arbiter::{LeaseTick, PumpArbiter, PumpLease, RunOutcome};
use plantcare::plant::PlantId;

const CEILING_MS: u32 = 30_000;
const GUARD_MS: u32 = 15;

#[derive(Default)]
struct Path {
    now_ms: u64,
    pump_on_since: Option<u64>,
    valves: [bool; 2],
    calls: u32,
}

impl Path {
    fn check(&self) {
        let open = self.valves.iter().filter(|v| **v).count();
        assert!(open <= 1, "two valves open");
        assert!(self.pump_on_since.is_none() || open == 1, "pump against closed valves");
    }
}

impl ActuatorPort for Path {
    fn start_pump(&mut self) {
        self.calls += 1;
        self.pump_on_since = Some(self.now_ms);
        self.check();
    }
    fn stop_pump(&mut self) {
        self.calls += 1;
        if let Some(since) = self.pump_on_since.take() {
            assert!(self.now_ms - since <= u64::from(CEILING_MS), "run past ceiling");
        }
        self.check();
    }
    fn open_valve(&mut self, plant: PlantId) {
        self.calls += 1;
        self.valves[plant.index()] = true;
        self.check();
    }
    fn close_valve(&mut self, plant: PlantId) {
        self.calls += 1;
        self.valves[plant.index()] = false;
        self.check();
    }
    fn set_servo_angle(&mut self, _degrees: u8) {}
    fn all_off(&mut self) {
        self.stop_pump();
        self.valves = [false; 2];
    }
}

fuzz_target!(|data: &[u8]| {
    let mut arbiter = PumpArbiter::new(CEILING_MS, GUARD_MS);
    let mut path = Path::default();
    let mut held: Option<PumpLease> = None;
    let mut stale: Option<PumpLease> = None;

    for pair in data.chunks_exact(2) {
        let (op, arg) = (pair[0], pair[1]);
        let now = path.now_ms;
        match op % 8 {
            0 | 1 => {
                let plant = if arg & 1 == 0 { PlantId::One } else { PlantId::Two };
                let duration = u32::from(arg) * 500;
                if let Ok(lease) = arbiter.request(plant, duration, now, &mut path) {
                    assert!(held.is_none(), "second lease granted");
                    held = Some(lease);
                }
            }
            2 => {
                if let Some(lease) = held.take() {
                    if let LeaseTick::Held(lease) = arbiter.tick(lease, now, &mut path) {
                        held = Some(lease);
                    }
                }
            }
            3 => {
                if let Some(lease) = held.take() {
                    let _ = arbiter.release(lease, RunOutcome::Completed, now, &mut path);
                }
            }
            4 | 5 => {
                // Stall: the owner is silent, only the ceiling guard runs.
                let end = now + u64::from(arg) * 200;
                while path.now_ms < end {
                    path.now_ms = (path.now_ms + u64::from(GUARD_MS)).min(end);
                    let _ = arbiter.enforce(path.now_ms, &mut path);
                }
            }
            6 => {
                let _ = arbiter.emergency_stop(now, &mut path);
                assert!(path.pump_on_since.is_none());
                assert_eq!(path.valves, [false; 2]);
            }
            _ => arbiter.clear_emergency_stop(),
        }

        // Hand a revoked token back once; it must be inert.
        if let Some(lease) = stale.take() {
            let before = path.calls;
            let _ = arbiter.release(lease, RunOutcome::Aborted, path.now_ms, &mut path);
            assert_eq!(path.calls, before, "revoked lease touched hardware");
        }
        if arbiter.holder().is_none() {
            stale = held.take();
        }
        assert_eq!(held.is_some(), arbiter.holder().is_some());
    }
});
