//! # Event observers for the consumer runtime.
//!
//! This module provides the [`Observer`] trait and the fan-out machinery
//! for handling runtime events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   worker ── publish(Event) ──► Bus ──► observer listener ──► ObserverSet
//!                                                 │
//!                                   ┌─────────────┼─────────────┐
//!                                   ▼             ▼             ▼
//!                              [queue O1]    [queue O2]    [queue ON]
//!                                   │             │             │
//!                              worker O1     worker O2     worker ON
//!                                   │             │             │
//!                            on_event(&Event) (per observer)
//! ```
//!
//! ## Implementing custom observers
//! ```no_run
//! use opvisor::{Observer, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Observer for Metrics {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::TaskFaulted {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

mod observer;
mod set;

#[cfg(feature = "logging")]
mod log;

pub use observer::Observer;
pub use set::ObserverSet;

#[cfg(feature = "logging")]
pub use log::LogWriter;
