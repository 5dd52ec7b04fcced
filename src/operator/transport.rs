//! # Transport traits and wire-facing actions.
//!
//! The consumer core is generic over the transport through two object-safe
//! traits. Implementations own serialization, authentication, and the
//! physical connection; the core only pulls, processes, and settles.
//!
//! ## Pull contract
//! [`Connection::recv`] is called **only while the caller holds an
//! admission slot**, so a conforming transport is never asked to hold more
//! than `prefetch` unsettled deliveries. A transport that pushes beyond
//! that is in breach; the gate still refuses to exceed the bound and
//! surfaces the violation loudly.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ConsumerConfig;
use crate::error::ConsumerError;
use crate::task::TaskDelivery;

/// One tagged unit of work pulled from the bus.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Transport-scoped tag used to settle this delivery.
    pub tag: u64,
    /// The delivered task.
    pub task: TaskDelivery,
}

/// Per-invocation outcome reported back to the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum AckAction {
    /// Acknowledge success; `data` becomes this service's result data.
    Ack {
        /// Service data produced by the handler.
        data: Value,
    },

    /// Redeliver the current service step after `delay`.
    ///
    /// Neither success nor failure is acknowledged.
    RetryAfter {
        /// Enforced redelivery delay (zero = no enforced delay).
        delay: Duration,
    },

    /// Fail the current service step.
    ///
    /// Whether the overall task fails is the bus's fail-over decision.
    Fail {
        /// Optional reason reported to the bus.
        reason: Option<String>,
    },
}

/// # Connection factory for an operator-style bus.
///
/// One `connect` call backs one subscription; re-subscribing connects
/// again through a fresh lifecycle.
#[async_trait]
pub trait Operator: Send + Sync + 'static {
    /// Opens a connection using the fully-resolved configuration.
    async fn connect(&self, cfg: &ConsumerConfig) -> Result<Arc<dyn Connection>, ConsumerError>;
}

/// # An open bus connection: pull deliveries, settle by tag.
///
/// Implementations use interior mutability; the consumer core shares the
/// connection between the intake loop and concurrent workers.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Pulls the next delivery.
    ///
    /// Suspends until a delivery is available. Returns `None` once the
    /// connection is closed or the delivery stream ends. Called only
    /// while the caller holds an admission slot.
    async fn recv(&self) -> Option<Delivery>;

    /// Settles a previously received delivery.
    async fn settle(&self, tag: u64, action: AckAction) -> Result<(), ConsumerError>;

    /// Closes the connection; subsequent `recv` calls return `None`.
    async fn close(&self) -> Result<(), ConsumerError>;
}
