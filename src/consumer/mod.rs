//! Consumer core: admission, processing, lifecycle.
//!
//! This module contains the embedded implementation of the opvisor
//! runtime. The public API from this module is [`Consumer`] (with its
//! builder) and [`Subscription`].
//!
//! Internal modules:
//! - [`gate`]: enforces the prefetch bound with one-shot admission slots;
//! - [`worker`]: processes one delivery end to end (context, handler,
//!   outcome interpretation, settle);
//! - [`core`]: wires intake, observers, and the subscription lifecycle;
//! - [`subscription`]: the handle returned by `subscribe`.

mod core;
mod gate;
mod subscription;
mod worker;

pub use self::core::{Consumer, ConsumerBuilder};
pub use subscription::Subscription;
