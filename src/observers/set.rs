//! # ObserverSet: non-blocking fan-out over multiple observers.
//!
//! [`ObserverSet`] distributes each [`Event`] to multiple observers
//! **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-observer FIFO (queue order).
//! - Panics inside observers are caught and reported (isolation).
//!
//! ## What it does **not** guarantee
//! - No global ordering across different observers.
//! - No retries on per-observer queue overflow (events are dropped for
//!   that observer and an [`EventKind::ObserverOverflow`] is published).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │                        (Arc-clone per observer)
//!        ├────────────────► [queue O1] ─► worker O1 ─► on_event()
//!        ├────────────────► [queue O2] ─► worker O2 ─► on_event()
//!        └────────────────► [queue ON] ─► worker ON ─► on_event()
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event};

use super::Observer;

/// Per-observer channel with metadata.
struct ObserverChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-observer bounded queues and worker tasks.
pub struct ObserverSet {
    channels: Vec<ObserverChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl ObserverSet {
    /// Creates a new set and spawns one worker per observer.
    ///
    /// Overflow and panic incidents are reported back on `bus` (observer
    /// health events are themselves fanned out, so a misbehaving observer
    /// is visible to the healthy ones).
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Observer>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(observers.len());
        let mut workers = Vec::with_capacity(observers.len());

        for obs in observers {
            let cap = obs.queue_capacity().max(1);
            let name = obs.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let o = Arc::clone(&obs);
            let report = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = o.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        report.publish(Event::observer_panicked(
                            o.name(),
                            format!("{panic_err:?}"),
                        ));
                    }
                }
            });

            channels.push(ObserverChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Fan-out one event to all observers (non-blocking).
    ///
    /// If an observer's queue is **full** or **closed**, the event is
    /// dropped for it and an overflow event is published.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.bus
                        .publish(Event::observer_overflow(channel.name, "full"));
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    self.bus
                        .publish(Event::observer_overflow(channel.name, "closed"));
                }
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        seen: Arc<Mutex<Vec<EventKind>>>,
    }

    #[async_trait]
    impl Observer for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn events_reach_observers_in_order() {
        let bus = Bus::new(16);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let set = ObserverSet::new(
            vec![Arc::new(Recorder {
                seen: Arc::clone(&seen),
            })],
            bus,
        );

        set.emit(&Event::now(EventKind::TaskAdmitted));
        set.emit(&Event::now(EventKind::TaskCompleted));
        set.shutdown().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::TaskAdmitted, EventKind::TaskCompleted]
        );
    }

    struct Panicky;

    #[async_trait]
    impl Observer for Panicky {
        async fn on_event(&self, _event: &Event) {
            panic!("observer bug");
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[tokio::test]
    async fn observer_panic_is_isolated_and_reported() {
        let bus = Bus::new(16);
        let mut health = bus.subscribe();
        let set = ObserverSet::new(vec![Arc::new(Panicky)], bus);

        set.emit(&Event::now(EventKind::TaskAdmitted));
        let report = health.recv().await.unwrap();
        assert_eq!(report.kind, EventKind::ObserverPanicked);
        assert_eq!(report.service.as_deref(), Some("panicky"));
        set.shutdown().await;
    }
}
