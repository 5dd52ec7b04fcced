//! # Consumer: wires intake, processing, observers, and lifecycle.
//!
//! The [`Consumer`] owns the event bus and global configuration. Each
//! [`Consumer::subscribe`] call connects to the bus, builds a fresh
//! [`AdmissionGate`], and spawns the intake loop.
//!
//! ## High-level architecture
//! ```text
//! Consumer::subscribe(operator, handler)
//!   ├─► cfg.validate()
//!   ├─► operator.connect(cfg) ──► Arc<dyn Connection>
//!   └─► spawn intake loop:
//!
//! loop {
//!   ├─► gate.acquire()            (suspends when prefetch slots taken)
//!   ├─► gate.verify()             (at-most-N is a hard invariant)
//!   ├─► conn.recv()               (next delivery; only while holding a slot)
//!   └─► spawn worker::process_one (context → handler → settle → release)
//! }
//!
//! Exit conditions:
//!   - unsubscribe() cancelled the token
//!   - delivery stream ended (recv → None)
//!   - admission invariant violated (fatal)
//!
//! On exit: drain in-flight workers → publish Drained → close connection
//!          → publish ConnectionClosed → resolve the subscription future
//! ```
//!
//! Event flow (as wired here):
//! ```text
//! intake/workers ── publish(Event) ──► Bus ──► observer listener ──► ObserverSet
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::ConsumerConfig;
use crate::error::ConsumerError;
use crate::events::{Bus, Event, EventKind};
use crate::handler::HandlerRef;
use crate::observers::{Observer, ObserverSet};
use crate::operator::{Connection, Operator};

use super::gate::AdmissionGate;
use super::subscription::Subscription;
use super::worker::process_one;

/// Builder for constructing a [`Consumer`] with optional observers.
pub struct ConsumerBuilder {
    cfg: ConsumerConfig,
    observers: Vec<Arc<dyn Observer>>,
}

impl ConsumerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ConsumerConfig) -> Self {
        Self {
            cfg,
            observers: Vec::new(),
        }
    }

    /// Sets event observers for observability.
    ///
    /// Observers receive runtime events (message lifecycle, subscription
    /// lifecycle, observer health) through dedicated workers with bounded
    /// queues.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observer>>) -> Self {
        self.observers = observers;
        self
    }

    /// Builds the consumer and wires the observer listener.
    ///
    /// Must be called within a Tokio runtime (observer workers are
    /// spawned here).
    pub fn build(self) -> Consumer {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        if !self.observers.is_empty() {
            let set = ObserverSet::new(self.observers, bus.clone());
            let mut rx = bus.subscribe();
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(ev) => set.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                set.shutdown().await;
            });
        }

        Consumer {
            cfg: self.cfg,
            bus,
        }
    }
}

/// Bounded-concurrency task consumer bound to one configuration.
///
/// One `Consumer` can open multiple (sequential or parallel)
/// subscriptions; each gets its own admission gate, so multiple consumers
/// in one process never interfere.
pub struct Consumer {
    cfg: ConsumerConfig,
    bus: Bus,
}

impl Consumer {
    /// Starts building a consumer.
    pub fn builder(cfg: ConsumerConfig) -> ConsumerBuilder {
        ConsumerBuilder::new(cfg)
    }

    /// The resolved configuration.
    pub fn config(&self) -> &ConsumerConfig {
        &self.cfg
    }

    /// A new receiver observing subsequent runtime events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Connects to the operator and starts admitting messages.
    ///
    /// Resolves once the subscription is active, yielding the
    /// [`Subscription`] whose `unsubscribe` tears it down. Configuration
    /// and connection failures are fatal to this call; handler outcomes
    /// never are.
    pub async fn subscribe(
        &self,
        operator: &dyn Operator,
        handler: HandlerRef,
    ) -> Result<Subscription, ConsumerError> {
        self.cfg.validate()?;

        let conn = operator.connect(&self.cfg).await?;
        let gate = AdmissionGate::new(self.cfg.prefetch);
        let token = CancellationToken::new();

        let done = tokio::spawn(intake(
            conn,
            handler,
            gate,
            self.bus.clone(),
            token.clone(),
        ));

        Ok(Subscription {
            token,
            done,
            bus: self.bus.clone(),
        })
    }
}

/// The intake loop: admit → pull → hand off to a worker.
///
/// Cancellation is checked at the two suspension points (slot acquire,
/// delivery pull); in-flight workers are never cancelled and drain before
/// the connection closes.
async fn intake(
    conn: Arc<dyn Connection>,
    handler: HandlerRef,
    gate: AdmissionGate,
    bus: Bus,
    token: CancellationToken,
) -> Result<(), ConsumerError> {
    let mut workers = JoinSet::new();

    let result = loop {
        let slot = tokio::select! {
            _ = token.cancelled() => break Ok(()),
            slot = gate.acquire() => match slot {
                Some(slot) => slot,
                None => break Ok(()),
            },
        };

        if let Err(e) = gate.verify() {
            drop(slot);
            break Err(e);
        }

        let delivery = tokio::select! {
            _ = token.cancelled() => {
                drop(slot);
                break Ok(());
            }
            msg = conn.recv() => match msg {
                Some(delivery) => delivery,
                None => {
                    drop(slot);
                    break Ok(());
                }
            },
        };

        workers.spawn(process_one(
            delivery,
            Arc::clone(&handler),
            Arc::clone(&conn),
            bus.clone(),
            slot,
        ));
    };

    // No further admissions; in-flight tasks run to their terminal outcome.
    gate.close();
    while workers.join_next().await.is_some() {}
    bus.publish(Event::now(EventKind::Drained));

    let closed = conn.close().await;
    match &closed {
        Ok(()) => bus.publish(Event::now(EventKind::ConnectionClosed)),
        Err(e) => bus.publish(Event::now(EventKind::ConnectionClosed).with_reason(e.as_message())),
    }

    result.and(closed)
}
