//! Inter-task communication between the control loop and the notifier.
//!
//! Uses `embassy-sync` primitives so both tasks share these statics
//! without heap allocation.
//!
//! ```text
//! ┌──────────────┐  Notification  ┌──────────────┐
//! │ Control Loop │──────────────▶│  Notifier    │
//! │  (sync)      │◀──────────────│  (async)     │
//! └──────────────┘ forecast/online└──────────────┘
//! ```
//!
//! The control loop never blocks on these: sends are `try_send` and a
//! full channel drops the notification with a warning.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::notifier::Notification;
use crate::weather::ForecastSnapshot;

/// Channel depth for outbound notifications.
const NOTIFY_DEPTH: usize = 8;

/// Outbound notification channel: control loop → notifier task.
pub static NOTIFY_CHANNEL: Channel<CriticalSectionRawMutex, Notification, NOTIFY_DEPTH> =
    Channel::new();

/// Latest forecast, written by whichever task fetches it.
static FORECAST: Mutex<CriticalSectionRawMutex, Cell<Option<ForecastSnapshot>>> =
    Mutex::new(Cell::new(None));

static ONLINE: AtomicBool = AtomicBool::new(false);

/// Queue a notification for delivery.  Returns `false` if it was dropped.
pub fn send_notification(n: Notification) -> bool {
    match NOTIFY_CHANNEL.try_send(n) {
        Ok(()) => true,
        Err(_) => {
            warn!("Notify: channel full, dropping notification");
            false
        }
    }
}

/// Try to take the next pending notification without waiting.
pub fn try_recv_notification() -> Option<Notification> {
    NOTIFY_CHANNEL.try_receive().ok()
}

pub fn publish_forecast(snapshot: ForecastSnapshot) {
    FORECAST.lock(|f| f.set(Some(snapshot)));
}

pub fn latest_forecast() -> Option<ForecastSnapshot> {
    FORECAST.lock(Cell::get)
}

pub fn set_online(online: bool) {
    ONLINE.store(online, Ordering::Release);
}

pub fn is_online() -> bool {
    ONLINE.load(Ordering::Acquire)
}
