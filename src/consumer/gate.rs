//! # Admission gate: the prefetch bound.
//!
//! [`AdmissionGate`] holds `prefetch` permits. The intake path acquires a
//! slot **before** requesting the next delivery, so at most `prefetch`
//! tasks are ever in flight per subscription - a hard invariant, not a
//! best effort.
//!
//! ## Slot semantics
//! [`AdmissionSlot`] is a strict one-shot token: it owns the semaphore
//! permit, release happens exactly once when the slot is dropped, and a
//! double release is a compile-time impossibility (the slot cannot be
//! cloned or re-dropped). Release-on-crash is guaranteed because the slot
//! travels into the worker task and drops on every exit path, panic
//! included.
//!
//! ## Rules
//! - `acquire()` suspends when saturated; `None` only after `close()`.
//! - The in-flight counter exists to surface a transport contract
//!   violation loudly ([`ConsumerError::AdmissionViolation`]), never to
//!   tolerate it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::ConsumerError;

/// Enforces the at-most-`prefetch`-in-flight invariant.
pub(crate) struct AdmissionGate {
    permits: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    prefetch: usize,
}

impl AdmissionGate {
    /// Creates a gate with `prefetch` slots (`>= 1`, validated upstream).
    pub(crate) fn new(prefetch: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(prefetch)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            prefetch,
        }
    }

    /// Acquires one slot, suspending until a slot is free.
    ///
    /// Returns `None` once the gate is closed (shutdown in progress).
    pub(crate) async fn acquire(&self) -> Option<AdmissionSlot> {
        let permit = Arc::clone(&self.permits).acquire_owned().await.ok()?;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        Some(AdmissionSlot {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Verifies the at-most-N invariant after an admission.
    ///
    /// The semaphore makes a breach structurally impossible through this
    /// gate; observing one anyway means slots are being minted outside
    /// `acquire`, and the subscription must fail loudly rather than keep
    /// consuming.
    pub(crate) fn verify(&self) -> Result<(), ConsumerError> {
        let in_flight = self.in_flight.load(Ordering::SeqCst);
        if in_flight > self.prefetch {
            return Err(ConsumerError::AdmissionViolation {
                in_flight,
                prefetch: self.prefetch,
            });
        }
        Ok(())
    }

    /// Number of slots currently held.
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Closes the gate: pending and future `acquire` calls return `None`.
    ///
    /// Held slots are unaffected and release normally.
    pub(crate) fn close(&self) {
        self.permits.close();
    }
}

/// One of the `prefetch` concurrent processing rights.
///
/// Dropping the slot releases it; ownership makes the release exactly
/// once per admitted message regardless of outcome.
pub(crate) struct AdmissionSlot {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for AdmissionSlot {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn slots_release_on_drop() {
        let gate = AdmissionGate::new(2);
        let a = gate.acquire().await.unwrap();
        let _b = gate.acquire().await.unwrap();
        assert_eq!(gate.in_flight(), 2);

        drop(a);
        assert_eq!(gate.in_flight(), 1);
        assert!(gate.verify().is_ok());
    }

    #[tokio::test]
    async fn acquire_suspends_when_saturated() {
        let gate = AdmissionGate::new(1);
        let held = gate.acquire().await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(20), gate.acquire()).await;
        assert!(blocked.is_err(), "third slot must not be granted");

        drop(held);
        let granted = tokio::time::timeout(Duration::from_millis(20), gate.acquire()).await;
        assert!(granted.is_ok_and(|s| s.is_some()));
    }

    #[tokio::test]
    async fn close_wakes_pending_acquires_with_none() {
        let gate = Arc::new(AdmissionGate::new(1));
        let held = gate.acquire().await.unwrap();

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.acquire().await.is_none() })
        };
        tokio::task::yield_now().await;

        gate.close();
        assert!(waiter.await.unwrap());

        // Held slots still release normally after close.
        drop(held);
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test]
    async fn verify_reports_out_of_band_slots() {
        let gate = AdmissionGate::new(1);
        let _slot = gate.acquire().await.unwrap();
        // Simulate a slot minted outside acquire().
        gate.in_flight.fetch_add(1, Ordering::SeqCst);

        match gate.verify() {
            Err(ConsumerError::AdmissionViolation {
                in_flight,
                prefetch,
            }) => {
                assert_eq!(in_flight, 2);
                assert_eq!(prefetch, 1);
            }
            other => panic!("expected admission violation, got {other:?}"),
        }
        gate.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
