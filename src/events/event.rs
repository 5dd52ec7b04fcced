//! # Runtime events emitted by the consumer.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Message lifecycle**: admitted, completed, retried, aborted, faulted
//! - **Subscription lifecycle**: unsubscribe requested, drained, closed
//! - **Observer health**: overflow, panic
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! the service/tenant involved, delivery tags, retry delays, and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Message lifecycle events ===
    /// A delivery was admitted (slot acquired, message pulled).
    ///
    /// Sets: `service`, `tenant`, `tag`, `at`, `seq`.
    TaskAdmitted,

    /// Handler returned a value; success acknowledged to the bus.
    ///
    /// Sets: `service`, `tenant`, `tag`, `at`, `seq`.
    TaskCompleted,

    /// Handler signalled retry; redelivery instruction sent.
    ///
    /// Sets: `service`, `tenant`, `tag`, `delay_ms`, `at`, `seq`.
    RetryScheduled,

    /// Handler signalled abort; failure instruction sent.
    ///
    /// Sets: `service`, `tenant`, `tag`, `reason` (if given), `at`, `seq`.
    TaskAborted,

    /// Handler faulted (uncaught error or panic); reported as failure.
    ///
    /// Sets: `service`, `tenant`, `tag`, `reason`, `at`, `seq`.
    TaskFaulted,

    /// Settling a delivery failed at the transport.
    ///
    /// Sets: `service`, `tenant`, `tag`, `reason`, `at`, `seq`.
    SettleFailed,

    // === Subscription lifecycle events ===
    /// `unsubscribe()` was called; intake stops immediately.
    ///
    /// Sets: `at`, `seq`.
    UnsubscribeRequested,

    /// All in-flight tasks reached a terminal outcome after intake
    /// stopped.
    ///
    /// Sets: `at`, `seq`.
    Drained,

    /// The bus connection was torn down (or the delivery stream ended).
    ///
    /// Sets: `reason` (if the transport supplied one), `at`, `seq`.
    ConnectionClosed,

    // === Observer health events ===
    /// Observer dropped an event (queue full or worker closed).
    ///
    /// Sets: `service` (observer name), `reason`, `at`, `seq`.
    ObserverOverflow,

    /// Observer panicked during event processing.
    ///
    /// Sets: `service` (observer name), `reason`, `at`, `seq`.
    ObserverPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Service name involved, if applicable (observer name for
    /// observer-health events).
    pub service: Option<Arc<str>>,
    /// Tenant involved, if applicable.
    pub tenant: Option<Arc<str>>,
    /// Delivery tag, if applicable.
    pub tag: Option<u64>,
    /// Retry delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (abort/fault/settle details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            tenant: None,
            tag: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches a tenant name.
    #[inline]
    pub fn with_tenant(mut self, tenant: impl Into<Arc<str>>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Attaches a delivery tag.
    #[inline]
    pub fn with_tag(mut self, tag: u64) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Attaches a retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates an observer overflow event.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::ObserverOverflow)
            .with_service(observer)
            .with_reason(reason)
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        Event::now(EventKind::ObserverPanicked)
            .with_service(observer)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::now(EventKind::TaskAdmitted);
        let b = Event::now(EventKind::TaskCompleted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_attach_metadata() {
        let ev = Event::now(EventKind::RetryScheduled)
            .with_service("classify")
            .with_tenant("acme")
            .with_tag(7)
            .with_delay(Duration::from_millis(250))
            .with_reason("transient");
        assert_eq!(ev.service.as_deref(), Some("classify"));
        assert_eq!(ev.tenant.as_deref(), Some("acme"));
        assert_eq!(ev.tag, Some(7));
        assert_eq!(ev.delay_ms, Some(250));
        assert_eq!(ev.reason.as_deref(), Some("transient"));
    }
}
