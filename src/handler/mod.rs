//! # Handler abstractions.
//!
//! This module provides the user-facing seam of the runtime:
//! - [`Handler`] - trait for implementing async task handlers
//! - [`HandlerFn`] - function-backed handler implementation
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler>`)

mod handle;

pub use handle::{Handler, HandlerFn, HandlerRef};
