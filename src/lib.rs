//! # opvisor
//!
//! **Opvisor** is a bounded-concurrency message-consumer runtime for Rust.
//!
//! It attaches application logic to a task-oriented message bus (the
//! "operator"): it pulls units of work, bounds how many are processed
//! concurrently, builds a read-only execution context for each task
//! exposing prior-service results, and translates the handler's outcome
//! into an acknowledgment action sent back to the bus.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!            operator bus (external)
//!                    │ deliveries
//!                    ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Subscription (intake loop)                                   │
//! │  - AdmissionGate (at most `prefetch` slots)                   │
//! │  - pulls the next delivery only while holding a slot          │
//! └──────┬──────────────────┬──────────────────┬──────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐
//!   │  worker  │       │  worker  │  ...  │  worker  │   (≤ prefetch)
//!   │ ctx+call │       │ ctx+call │       │ ctx+call │
//!   └────┬─────┘       └────┬─────┘       └────┬─────┘
//!        │ settle           │ settle           │ settle
//!        ▼                  ▼                  ▼
//!   ack / retryAfter / fail ──────────────► operator bus
//!
//! Lifecycle events ── publish ──► Bus ──► ObserverSet ──► observers
//! ```
//!
//! ### Per-message lifecycle
//! ```text
//! Admitted → ContextBuilt → Invoking → {Completed | Retried | Aborted | Faulted}
//!                                                       │
//!                                               SlotReleased (exactly once,
//!                                               on every path, panics included)
//! ```
//!
//! ## Handler contract
//! A handler receives a fresh [`TaskContext`] per invocation and returns
//! `Result<Value, HandlerError>`:
//! - `Ok(value)` acknowledges success with `value` as service data;
//! - `return Err(ctx.retry(delay))` asks the bus to redeliver (positive
//!   delays below 100ms are clamped up to 100ms);
//! - `return Err(ctx.abort(reason))` fails the current service step;
//! - any other error (or a panic) is reported as a fault - the consumer
//!   process never crashes because of a single handler.
//!
//! The control signals are non-local exits: after the `return`, no
//! handler code for that invocation executes.
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                    |
//! |-------------------|----------------------------------------------------------|---------------------------------------|
//! | **Handlers**      | Define task handlers as trait impls or closures.         | [`Handler`], [`HandlerFn`]            |
//! | **Context**       | Read-only task state and control operations.             | [`TaskContext`]                       |
//! | **Admission**     | Hard at-most-`prefetch`-in-flight bound.                 | [`ConsumerConfig::prefetch`]          |
//! | **Transport**     | Bring your own bus client behind two small traits.       | [`Operator`], [`Connection`]          |
//! | **Lifecycle**     | Subscribe / unsubscribe with graceful drain.             | [`Consumer`], [`Subscription`]        |
//! | **Observability** | Runtime events fanned out to user observers.             | [`Observer`], [`Event`], [`EventKind`]|
//! | **Errors**        | Typed errors for config, runtime, and handler outcomes.  | [`ConfigError`], [`ConsumerError`], [`HandlerError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` observer
//!   _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use opvisor::{Consumer, ConsumerConfig, HandlerFn, HandlerRef, MemoryOperator, TaskContext};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = ConsumerConfig::new("operator://localhost:4222", "1.0.0").with_prefetch(4);
//!     let consumer = Consumer::builder(cfg).build();
//!
//!     let handler: HandlerRef = HandlerFn::arc(|ctx: TaskContext| async move {
//!         let Some(text) = ctx.service_data("ocr") else {
//!             // Not ready yet: ask the bus to redeliver this step.
//!             return Err(ctx.retry(None));
//!         };
//!         Ok(json!({ "summary": text }))
//!     });
//!
//!     // Swap MemoryOperator for a real transport in production.
//!     let operator = MemoryOperator::new();
//!     let subscription = consumer.subscribe(&operator, handler).await?;
//!
//!     // ... deliveries flow until:
//!     subscription.unsubscribe().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod consumer;
mod context;
mod error;
mod events;
mod handler;
mod observers;
mod operator;
mod task;

// ---- Public re-exports ----

pub use config::ConsumerConfig;
pub use consumer::{Consumer, ConsumerBuilder, Subscription};
pub use context::{TaskContext, TaskState};
pub use error::{ConfigError, ConsumerError, HandlerError, MIN_RETRY_DELAY};
pub use events::{Bus, Event, EventKind};
pub use handler::{Handler, HandlerFn, HandlerRef};
pub use observers::{Observer, ObserverSet};
pub use operator::{AckAction, Connection, Delivery, MemoryConnection, MemoryOperator, Operator};
pub use task::{ServiceIdentity, ServiceMeta, ServiceResult, TaskDelivery};

// Optional: expose a simple built-in logging observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
