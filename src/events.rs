//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - GPIO ISRs (emergency-stop switch)
//! - The scheduler delegate (actuator, control and status cadences)
//!
//! Events are consumed by the main control loop, which processes them
//! one at a time in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ GPIO ISR    │────▶│              │     │              │
//! │ Scheduler   │────▶│  Event Queue │────▶│  Main Loop   │
//! │             │     │  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use heapless::mpmc::Q32;

/// System event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Emergency-stop switch changed level.
    EmergencyStopChanged,
    /// Fast actuator cadence fired.
    ActuatorTick,
    /// Decision loop cadence fired.
    ControlTick,
    /// Status report cadence fired.
    StatusTick,
}

// Multi-producer: the ISR and the main task both push.
static EVENT_QUEUE: Q32<Event> = Q32::new();

/// Push an event into the queue.
/// Safe to call from ISR context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    EVENT_QUEUE.enqueue(event).is_ok()
}

/// Pop the next event from the queue.
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    EVENT_QUEUE.dequeue()
}

/// Drain all pending events into a callback.
/// Processes events in FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}
