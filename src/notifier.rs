//! Async alert delivery with retries.
//!
//! Runs in a dedicated thread using `edge-executor` and `async-io-mini`
//! timers (no busy-spinning).  The control loop pushes [`Notification`]s
//! into [`NOTIFY_CHANNEL`](crate::channels::NOTIFY_CHANNEL); the notifier
//! wakes on each one, renders it to JSON and hands it to a
//! [`WebhookTransport`], retrying with a fixed delay.
//!
//! ```text
//!  ┌────────────────────────────────────────────────────────────┐
//!  │  Notifier Thread                                           │
//!  │  ┌──────────────────────────────────────────────────────┐  │
//!  │  │  futures_lite::block_on                              │  │
//!  │  │  ┌──────────────────────────────────────────────────┐│  │
//!  │  │  │  edge_executor::LocalExecutor                    ││  │
//!  │  │  │    receive ─▶ to_json ─▶ post (retry ⏱)          ││  │
//!  │  │  └──────────────────────────────────────────────────┘│  │
//!  │  └──────────────────────────────────────────────────────┘  │
//!  └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The HTTP client itself lives outside this crate; [`LogOnlyTransport`]
//! stands in until one is wired up.

use core::fmt;
use core::time::Duration;

use log::{info, warn};
use serde::Serialize;

use crate::app::events::{AppEvent, StatusReport};
use crate::channels::NOTIFY_CHANNEL;
use crate::config::SystemConfig;
use crate::control::pump_arbiter::RunOutcome;
use crate::plant::PlantId;

// ── Payload ───────────────────────────────────────────────────

/// One outbound alert or report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    CriticalMoisture { plant: PlantId, percent: f32 },
    HardwareFault { plant: PlantId },
    WateringStarted { plant: PlantId, max_duration_ms: u64 },
    WateringCompleted { plant: PlantId, duration_ms: u64 },
    WateringTimedOut { plant: PlantId, duration_ms: u64 },
    WateringAborted { plant: PlantId, duration_ms: u64 },
    PeriodicStatus { report: StatusReport },
}

impl Notification {
    /// Map an application event to its notification, if it has one.
    pub fn from_event(event: &AppEvent) -> Option<Self> {
        let n = match *event {
            AppEvent::CriticalMoisture { plant, percent } => Self::CriticalMoisture { plant, percent },
            AppEvent::HardwareFault { plant } => Self::HardwareFault { plant },
            AppEvent::WateringStarted {
                plant,
                max_duration_ms,
            } => Self::WateringStarted {
                plant,
                max_duration_ms,
            },
            AppEvent::WateringEnded {
                plant,
                duration_ms,
                outcome,
            } => match outcome {
                RunOutcome::Completed => Self::WateringCompleted { plant, duration_ms },
                RunOutcome::TimedOut => Self::WateringTimedOut { plant, duration_ms },
                RunOutcome::Aborted => Self::WateringAborted { plant, duration_ms },
            },
            AppEvent::Status(report) => Self::PeriodicStatus { report },
            _ => return None,
        };
        Some(n)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ── Transport ─────────────────────────────────────────────────

/// Outbound webhook.  One call is one delivery attempt.
pub trait WebhookTransport {
    type Error: fmt::Display;

    fn post(&mut self, body: &str) -> Result<(), Self::Error>;
}

/// Writes each payload to the log instead of the network.
pub struct LogOnlyTransport;

impl WebhookTransport for LogOnlyTransport {
    type Error = core::convert::Infallible;

    fn post(&mut self, body: &str) -> Result<(), Self::Error> {
        info!("Notify: {body}");
        Ok(())
    }
}

// ── Delivery ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per notification (at least one).
    pub attempts: u8,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            attempts: config.notification_retry_count.max(1),
            delay: Duration::from_millis(u64::from(config.notification_retry_delay_ms)),
        }
    }
}

/// Delivery result for one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent { attempts: u8 },
    GaveUp,
    /// The payload could not be rendered.
    Unencodable,
}

/// Deliver one notification, waiting `policy.delay` between attempts.
pub async fn deliver<T: WebhookTransport>(
    transport: &mut T,
    notification: &Notification,
    policy: RetryPolicy,
) -> Delivery {
    let body = match notification.to_json() {
        Ok(b) => b,
        Err(e) => {
            warn!("Notify: cannot encode {notification:?}: {e}");
            return Delivery::Unencodable;
        }
    };

    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        match transport.post(&body) {
            Ok(()) => return Delivery::Sent { attempts: attempt },
            Err(e) => {
                warn!("Notify: attempt {attempt}/{attempts} failed: {e}");
                if attempt < attempts {
                    async_io_mini::Timer::after(policy.delay).await;
                }
            }
        }
    }
    warn!("Notify: giving up on {notification:?}");
    Delivery::GaveUp
}

/// Drain the notification channel forever.
async fn notify_loop<T: WebhookTransport>(mut transport: T, policy: RetryPolicy) {
    loop {
        let n = NOTIFY_CHANNEL.receive().await;
        deliver(&mut transport, &n, policy).await;
    }
}

fn run_notifier<T: WebhookTransport + 'static>(transport: T, policy: RetryPolicy) {
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    executor.spawn(notify_loop(transport, policy)).detach();

    info!(
        "Notifier started ({} attempts, {} ms apart)",
        policy.attempts,
        policy.delay.as_millis()
    );
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

/// Spawn the notifier in a dedicated thread on Core 0 (PRO_CPU), next to
/// the network stack.
pub fn spawn<T: WebhookTransport + Send + 'static>(
    transport: T,
    policy: RetryPolicy,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    crate::drivers::task_pin::spawn_on_core(
        crate::drivers::task_pin::Core::Pro,
        5,
        8,
        "notifier\0",
        move || run_notifier(transport, policy),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;

    /// Fails the first `failures` posts, then records bodies.
    struct Flaky {
        failures: u8,
        calls: u8,
        sent: Vec<String>,
    }

    impl WebhookTransport for Flaky {
        type Error = &'static str;

        fn post(&mut self, body: &str) -> Result<(), Self::Error> {
            self.calls += 1;
            if self.failures > 0 {
                self.failures -= 1;
                return Err("http 503");
            }
            self.sent.push(body.to_string());
            Ok(())
        }
    }

    fn flaky(failures: u8) -> Flaky {
        Flaky {
            failures,
            calls: 0,
            sent: Vec::new(),
        }
    }

    const FAST: RetryPolicy = RetryPolicy {
        attempts: 3,
        delay: Duration::from_millis(1),
    };

    #[test]
    fn json_is_tagged() {
        let n = Notification::HardwareFault { plant: PlantId::Two };
        assert_eq!(n.to_json().unwrap(), r#"{"kind":"hardware_fault","plant":"Two"}"#);
    }

    #[test]
    fn run_outcome_selects_variant() {
        let ev = AppEvent::WateringEnded {
            plant: PlantId::One,
            duration_ms: 30_000,
            outcome: RunOutcome::TimedOut,
        };
        assert_eq!(
            Notification::from_event(&ev),
            Some(Notification::WateringTimedOut {
                plant: PlantId::One,
                duration_ms: 30_000
            })
        );
        assert_eq!(Notification::from_event(&AppEvent::ConfigUpdated), None);
    }

    #[test]
    fn retries_until_success() {
        let mut t = flaky(2);
        let n = Notification::HardwareFault { plant: PlantId::One };
        assert_eq!(block_on(deliver(&mut t, &n, FAST)), Delivery::Sent { attempts: 3 });
        assert_eq!(t.sent.len(), 1);
    }

    #[test]
    fn gives_up_after_policy_attempts() {
        let mut t = flaky(10);
        let n = Notification::HardwareFault { plant: PlantId::One };
        assert_eq!(block_on(deliver(&mut t, &n, FAST)), Delivery::GaveUp);
        assert_eq!(t.calls, 3);
    }

    #[test]
    fn policy_never_zero_attempts() {
        let c = SystemConfig {
            notification_retry_count: 0,
            ..Default::default()
        };
        assert_eq!(RetryPolicy::from_config(&c).attempts, 1);
    }
}
