//! Pump arbitration: single-owner leases over the shared water path.
//!
//! Both plants share one pump; each has its own solenoid valve.  A plant
//! may only water while it holds the one outstanding [`PumpLease`].
//!
//! ## Lease lifecycle
//!
//! 1. [`PumpArbiter::request`] opens the plant's valve, starts the pump and
//!    hands out a lease that expires after the requested duration, clamped
//!    to the hard ceiling.
//! 2. The owner passes the lease back through [`PumpArbiter::tick`] every
//!    control cycle.  Once expired, the arbiter shuts the path down and
//!    reports a timeout.
//! 3. The owner ends the run early with [`PumpArbiter::release`].
//! 4. Independently of the owner, [`PumpArbiter::enforce`] runs on every
//!    actuator poll and revokes a lease on the last poll before its expiry,
//!    so a stalled owner cannot keep the pump on past the ceiling.
//!    [`PumpArbiter::emergency_stop`] revokes unconditionally.
//!
//! A revoked lease is dead: handing it back later touches no hardware.
//!
//! ## Shutdown ordering
//!
//! Every exit path stops the pump **first** and closes the valve
//! **second**, so the pump never runs against a closed valve.  Startup is
//! the mirror image: valve open, then pump on.

use log::{info, warn};

use crate::app::ports::ActuatorPort;
use crate::config::WATER_PUMP_MAX_DURATION_MS;
use crate::error::PumpError;
use crate::plant::PlantId;

/// Exclusive, time-bounded ownership of the pump + valve path.
///
/// Deliberately neither `Clone` nor `Copy`: the only way to give it up is
/// to pass it back to the arbiter by value.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pump lease must be ticked and released"]
pub struct PumpLease {
    id: u32,
    plant: PlantId,
    granted_at_ms: u64,
    expires_at_ms: u64,
}

impl PumpLease {
    pub fn plant(&self) -> PlantId {
        self.plant
    }

    pub fn granted_at_ms(&self) -> u64 {
        self.granted_at_ms
    }

    pub fn expires_at_ms(&self) -> u64 {
        self.expires_at_ms
    }
}

/// How a pump run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The owner released the lease (target reached or dose delivered).
    Completed,
    /// The lease hit its expiry and was shut down by the arbiter.
    TimedOut,
    /// Emergency stop or owner abort.
    Aborted,
}

/// Summary of a finished pump run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpRun {
    pub plant: PlantId,
    pub started_at_ms: u64,
    pub ended_at_ms: u64,
    pub outcome: RunOutcome,
}

impl PumpRun {
    pub fn duration_ms(&self) -> u64 {
        self.ended_at_ms.saturating_sub(self.started_at_ms)
    }
}

/// Result of handing a lease back on a control tick.
#[derive(Debug, PartialEq, Eq)]
pub enum LeaseTick {
    /// Still valid; keep holding it.
    Held(PumpLease),
    /// Expired on this tick; the path is now shut down.
    TimedOut(PumpRun),
    /// The arbiter had already revoked it (ceiling guard or e-stop).
    Revoked(PlantId),
}

/// Arbiter-side record of the outstanding lease.
#[derive(Debug, Clone, Copy)]
struct ActiveLease {
    id: u32,
    plant: PlantId,
    granted_at_ms: u64,
    expires_at_ms: u64,
}

/// Guards the shared pump and the two valves.
pub struct PumpArbiter {
    ceiling_ms: u32,
    /// Interval between [`PumpArbiter::enforce`] calls.
    guard_interval_ms: u32,
    active: Option<ActiveLease>,
    next_id: u32,
    emergency_stopped: bool,
}

impl PumpArbiter {
    /// `ceiling_ms` is capped at [`WATER_PUMP_MAX_DURATION_MS`];
    /// `guard_interval_ms` is the actuator poll period driving `enforce`.
    pub fn new(ceiling_ms: u32, guard_interval_ms: u32) -> Self {
        Self {
            ceiling_ms: ceiling_ms.min(WATER_PUMP_MAX_DURATION_MS),
            guard_interval_ms,
            active: None,
            next_id: 1,
            emergency_stopped: false,
        }
    }

    /// Change the ceiling and guard interval.  The ceiling applies to
    /// leases granted afterwards.
    pub fn set_limits(&mut self, ceiling_ms: u32, guard_interval_ms: u32) {
        self.ceiling_ms = ceiling_ms.min(WATER_PUMP_MAX_DURATION_MS);
        self.guard_interval_ms = guard_interval_ms;
    }

    pub fn ceiling_ms(&self) -> u32 {
        self.ceiling_ms
    }

    /// Plant currently owning the water path, if any.
    pub fn holder(&self) -> Option<PlantId> {
        self.active.map(|a| a.plant)
    }

    pub fn is_emergency_stopped(&self) -> bool {
        self.emergency_stopped
    }

    /// Acquire the water path for `plant`.
    pub fn request(
        &mut self,
        plant: PlantId,
        max_duration_ms: u32,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
    ) -> Result<PumpLease, PumpError> {
        if self.emergency_stopped {
            return Err(PumpError::EmergencyStopped);
        }
        if let Some(active) = self.active {
            return Err(PumpError::Busy {
                holder: active.plant,
            });
        }

        let duration_ms = max_duration_ms.min(self.ceiling_ms);
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let active = ActiveLease {
            id,
            plant,
            granted_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(u64::from(duration_ms)),
        };
        self.active = Some(active);

        hw.open_valve(plant);
        hw.start_pump();
        info!("Pump: lease #{id} granted to {plant} for {duration_ms} ms");

        Ok(PumpLease {
            id,
            plant,
            granted_at_ms: active.granted_at_ms,
            expires_at_ms: active.expires_at_ms,
        })
    }

    /// Per-cycle check of a held lease.
    pub fn tick(&mut self, lease: PumpLease, now_ms: u64, hw: &mut impl ActuatorPort) -> LeaseTick {
        if !self.is_current(&lease) {
            return LeaseTick::Revoked(lease.plant);
        }
        if now_ms >= lease.expires_at_ms {
            warn!("Pump: lease #{} for {} hit its ceiling", lease.id, lease.plant);
            return match self.shut_down(now_ms, RunOutcome::TimedOut, hw) {
                Some(run) => LeaseTick::TimedOut(run),
                None => LeaseTick::Revoked(lease.plant),
            };
        }
        LeaseTick::Held(lease)
    }

    /// End a run.  Returns `None` if the lease had already been revoked,
    /// in which case no hardware is touched.
    pub fn release(
        &mut self,
        lease: PumpLease,
        outcome: RunOutcome,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
    ) -> Option<PumpRun> {
        if !self.is_current(&lease) {
            return None;
        }
        let run = self.shut_down(now_ms, outcome, hw)?;
        info!(
            "Pump: lease #{} for {} released after {} ms ({:?})",
            lease.id,
            lease.plant,
            run.duration_ms(),
            outcome
        );
        Some(run)
    }

    /// Ceiling guard.  Revokes the outstanding lease when the next guard
    /// pass would land past its expiry, whether or not the owner is still
    /// ticking it.
    pub fn enforce(&mut self, now_ms: u64, hw: &mut impl ActuatorPort) -> Option<PumpRun> {
        let active = self.active?;
        let next_pass_ms = now_ms.saturating_add(u64::from(self.guard_interval_ms));
        if next_pass_ms <= active.expires_at_ms {
            return None;
        }
        warn!("Pump: revoking expired lease #{} for {}", active.id, active.plant);
        self.shut_down(now_ms, RunOutcome::TimedOut, hw)
    }

    /// Engage the emergency stop: revoke any lease, force the whole water
    /// path off, refuse new leases until cleared.
    pub fn emergency_stop(&mut self, now_ms: u64, hw: &mut impl ActuatorPort) -> Option<PumpRun> {
        self.emergency_stopped = true;
        let run = self.shut_down(now_ms, RunOutcome::Aborted, hw);
        // Regardless of bookkeeping, nothing may stay energised.
        hw.stop_pump();
        for plant in PlantId::ALL {
            hw.close_valve(plant);
        }
        warn!("Pump: emergency stop engaged");
        run
    }

    pub fn clear_emergency_stop(&mut self) {
        if self.emergency_stopped {
            info!("Pump: emergency stop cleared");
        }
        self.emergency_stopped = false;
    }

    fn is_current(&self, lease: &PumpLease) -> bool {
        self.active.is_some_and(|a| a.id == lease.id)
    }

    /// The one shutdown sequence: pump off, then valve closed.
    fn shut_down(
        &mut self,
        now_ms: u64,
        outcome: RunOutcome,
        hw: &mut impl ActuatorPort,
    ) -> Option<PumpRun> {
        let active = self.active.take()?;
        hw.stop_pump();
        hw.close_valve(active.plant);
        Some(PumpRun {
            plant: active.plant,
            started_at_ms: active.granted_at_ms,
            ended_at_ms: now_ms,
            outcome,
        })
    }
}
