//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the intake loop, the
//! processing workers, and the observer workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the intake loop (`consumer::core`), per-message
//!   workers (`consumer::worker`), `ObserverSet` workers (overflow/panic).
//! - **Consumer**: the subscription's observer listener, which fans out to
//!   the [`ObserverSet`](crate::observers::ObserverSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
