//! Fixed-cadence timer engine.
//!
//! The controller runs three loops at very different rates: the actuator
//! poll (tens of milliseconds), the control tick (seconds) and the status
//! report (tens of minutes).  The scheduler owns their due times and
//! notifies a [`SchedulerDelegate`] when one fires; the main loop
//! implements the delegate to push events into the event queue.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Cadences                                 │
//! │                                                              │
//! │  ┌───────────┐      ┌───────────┐      ┌───────────┐         │
//! │  │ Actuator  │      │ Control   │      │ Status    │         │
//! │  │  15 ms    │      │  10 s     │      │  30 min   │         │
//! │  └─────┬─────┘      └─────┬─────┘      └─────┬─────┘         │
//! │        ▼                  ▼                  ▼               │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                         │  │
//! │  │       (main loop pushes into Event Queue)              │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          ▼                                   │
//! │        AppService.poll() / tick() / publish_status()         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A late poll fires each due cadence once and re-anchors it on `now`,
//! so a stalled loop never produces a burst of catch-up ticks.

use crate::app::ports::{ScheduleFiredKind, SchedulerDelegate};
use crate::config::SystemConfig;
use log::{debug, info};

/// Maximum number of cadences (stack-allocated).
const MAX_CADENCES: usize = 4;

/// A single repeating timer.
#[derive(Debug, Clone)]
pub struct Cadence {
    /// Human-readable label (e.g., "control").
    pub label: &'static str,
    pub kind: ScheduleFiredKind,
    pub interval_ms: u32,
    /// Absolute due time; `0` fires on the first poll.
    pub next_due_ms: u64,
}

impl Cadence {
    pub fn new(label: &'static str, kind: ScheduleFiredKind, interval_ms: u32) -> Self {
        Self {
            label,
            kind,
            interval_ms,
            next_due_ms: 0,
        }
    }
}

/// The scheduler engine.
///
/// Decoupled from the event system: when a cadence fires it invokes the
/// [`SchedulerDelegate`] callback rather than directly pushing events.
pub struct Scheduler {
    cadences: [Option<Cadence>; MAX_CADENCES],
    enabled: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            cadences: [None, None, None, None],
            enabled: true,
        }
    }

    /// The three controller loops, timed from `config`.
    pub fn from_config(config: &SystemConfig) -> Self {
        let mut s = Self::new();
        s.add(Cadence::new("actuator", ScheduleFiredKind::Actuator, config.actuator_poll_interval_ms));
        s.add(Cadence::new("control", ScheduleFiredKind::Control, config.control_loop_interval_ms));
        s.add(Cadence::new("status", ScheduleFiredKind::Status, config.status_update_interval_ms));
        s
    }

    /// Add a cadence.  Returns the slot index, or `None` if full.
    pub fn add(&mut self, cadence: Cadence) -> Option<usize> {
        let (i, slot) = self
            .cadences
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())?;
        info!(
            "Scheduler: '{}' every {} ms at slot {}",
            cadence.label, cadence.interval_ms, i
        );
        *slot = Some(cadence);
        Some(i)
    }

    /// Retime every cadence of `kind`.  The next due time is kept.
    pub fn set_interval(&mut self, kind: ScheduleFiredKind, interval_ms: u32) {
        for c in self.cadences.iter_mut().flatten().filter(|c| c.kind == kind) {
            c.interval_ms = interval_ms;
        }
    }

    /// Pick up the loop intervals from a new configuration.
    pub fn apply_config(&mut self, config: &SystemConfig) {
        self.set_interval(ScheduleFiredKind::Actuator, config.actuator_poll_interval_ms);
        self.set_interval(ScheduleFiredKind::Control, config.control_loop_interval_ms);
        self.set_interval(ScheduleFiredKind::Status, config.status_update_interval_ms);
    }

    /// Enable or disable the entire scheduler.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Fire every cadence that is due at `now_ms`, in slot order.
    pub fn poll(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        if !self.enabled {
            return;
        }
        for c in self.cadences.iter_mut().flatten() {
            if now_ms < c.next_due_ms {
                continue;
            }
            if c.next_due_ms != 0 && now_ms - c.next_due_ms >= u64::from(c.interval_ms) {
                debug!("Scheduler: '{}' late by {} ms", c.label, now_ms - c.next_due_ms);
            }
            delegate.on_schedule_fired(c.label, c.kind);
            c.next_due_ms = now_ms + u64::from(c.interval_ms);
        }
    }

    /// Milliseconds until the earliest cadence is due.
    pub fn ms_until_next(&self, now_ms: u64) -> Option<u64> {
        self.cadences
            .iter()
            .flatten()
            .map(|c| c.next_due_ms.saturating_sub(now_ms))
            .min()
    }

    pub fn len(&self) -> usize {
        self.cadences.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
