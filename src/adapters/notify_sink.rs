//! Notification sink: a decorator over another [`EventSink`].
//!
//! Every event is forwarded to the inner sink; alert-worthy events are
//! additionally turned into [`Notification`]s and queued for the
//! notifier task.  The queue never blocks the control loop.

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::channels;
use crate::notifier::Notification;

pub struct NotifySink<S> {
    inner: S,
    dropped: u32,
}

impl<S: EventSink> NotifySink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, dropped: 0 }
    }

    /// Notifications lost to a full queue since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<S: EventSink> EventSink for NotifySink<S> {
    fn emit(&mut self, event: &AppEvent) {
        self.inner.emit(event);
        if !event.is_notifiable() {
            return;
        }
        if let Some(n) = Notification::from_event(event) {
            if !channels::send_notification(n) {
                self.dropped = self.dropped.saturating_add(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::PlantId;

    #[derive(Default)]
    struct Count(usize);

    impl EventSink for Count {
        fn emit(&mut self, _event: &AppEvent) {
            self.0 += 1;
        }
    }

    // The only test in the crate that touches the notify channel.
    #[test]
    fn forwards_all_and_queues_alerts() {
        while channels::try_recv_notification().is_some() {}

        let mut sink = NotifySink::new(Count::default());
        sink.emit(&AppEvent::ConfigUpdated);
        sink.emit(&AppEvent::HardwareFault { plant: PlantId::One });
        assert_eq!(sink.inner.0, 2);
        assert_eq!(
            channels::try_recv_notification(),
            Some(Notification::HardwareFault { plant: PlantId::One })
        );
        assert_eq!(channels::try_recv_notification(), None);
    }
}
