//! # Process a single delivery end to end.
//!
//! Executes the per-message lifecycle: build the context, invoke the
//! handler **once**, interpret the outcome, settle with the bus, release
//! the admission slot.
//!
//! ## Outcome interpretation
//! ```text
//! Ok(value)                 → Ack { data: value }        → TaskCompleted
//! Err(Retry { delay })      → RetryAfter { delay }       → RetryScheduled
//! Err(Abort { reason })     → Fail { reason }            → TaskAborted
//! Err(Fault { error })      → Fail { reason: error }     → TaskFaulted
//! panic                     → Fail { reason: panic msg } → TaskFaulted
//! ```
//!
//! ## Rules
//! - Exactly one settle attempt and one terminal event per delivery.
//! - A failed settle is published as `SettleFailed`; redelivery is the
//!   bus's job, not this loop's.
//! - The slot is owned by this function and drops on every exit path,
//!   so release happens exactly once, panics included.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::context::TaskContext;
use crate::error::HandlerError;
use crate::events::{Bus, Event, EventKind};
use crate::handler::HandlerRef;
use crate::operator::{AckAction, Connection, Delivery};

use super::gate::AdmissionSlot;

/// Runs one delivery through the full lifecycle.
pub(crate) async fn process_one(
    delivery: Delivery,
    handler: HandlerRef,
    conn: Arc<dyn Connection>,
    bus: Bus,
    slot: AdmissionSlot,
) {
    let tag = delivery.tag;
    let service: Arc<str> = delivery.task.service.name.as_str().into();
    let tenant: Arc<str> = delivery.task.tenant.as_str().into();

    bus.publish(
        Event::now(EventKind::TaskAdmitted)
            .with_service(Arc::clone(&service))
            .with_tenant(Arc::clone(&tenant))
            .with_tag(tag),
    );

    let ctx = TaskContext::new(delivery.task);
    let invoked = AssertUnwindSafe(handler.call(ctx)).catch_unwind().await;

    let outcome = match invoked {
        Ok(res) => res,
        Err(panic_err) => Err(HandlerError::fault(panic_reason(panic_err.as_ref()))),
    };

    let (action, event) = interpret(outcome);
    let event = event
        .with_service(Arc::clone(&service))
        .with_tenant(tenant)
        .with_tag(tag);
    bus.publish(event);

    if let Err(e) = conn.settle(tag, action).await {
        bus.publish(
            Event::now(EventKind::SettleFailed)
                .with_service(service)
                .with_tag(tag)
                .with_reason(e.as_message()),
        );
    }

    drop(slot);
}

/// Maps a handler outcome to the settle action and its terminal event.
fn interpret(outcome: Result<serde_json::Value, HandlerError>) -> (AckAction, Event) {
    match outcome {
        Ok(data) => (
            AckAction::Ack { data },
            Event::now(EventKind::TaskCompleted),
        ),
        Err(HandlerError::Retry { delay }) => (
            AckAction::RetryAfter { delay },
            Event::now(EventKind::RetryScheduled).with_delay(delay),
        ),
        Err(HandlerError::Abort { reason }) => {
            let event = match &reason {
                Some(r) => Event::now(EventKind::TaskAborted).with_reason(r.as_str()),
                None => Event::now(EventKind::TaskAborted),
            };
            (AckAction::Fail { reason }, event)
        }
        Err(HandlerError::Fault { error }) => (
            AckAction::Fail {
                reason: Some(error.clone()),
            },
            Event::now(EventKind::TaskFaulted).with_reason(error),
        ),
    }
}

/// Best-effort extraction of a panic payload message.
fn panic_reason(err: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
