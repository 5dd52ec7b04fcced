//! # Handler trait and function-backed implementation.
//!
//! A handler receives a fresh [`TaskContext`] per invocation and produces
//! the unified outcome: a plain value, a control signal, or a fault. The
//! common handle type is [`HandlerRef`], an `Arc<dyn Handler>` suitable
//! for sharing across concurrent invocations.
//!
//! ## Concurrency semantics
//! - Each delivery invokes the handler exactly once.
//! - Up to `prefetch` invocations run concurrently; shared state must be
//!   owned explicitly (`Arc<...>`) inside the handler.
//! - Each [`HandlerFn`] call creates a **new** future owning its state.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::TaskContext;
use crate::error::HandlerError;

/// Shared reference to a handler.
pub type HandlerRef = Arc<dyn Handler>;

/// # Asynchronous task handler.
///
/// The outcome drives the settle action: `Ok(value)` acknowledges success
/// with `value` as service data; `Err` carries a retry/abort signal or a
/// fault (see [`HandlerError`]).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use serde_json::{json, Value};
/// use opvisor::{Handler, HandlerError, TaskContext};
///
/// struct Classify;
///
/// #[async_trait]
/// impl Handler for Classify {
///     async fn call(&self, ctx: TaskContext) -> Result<Value, HandlerError> {
///         let Some(text) = ctx.service_data("ocr") else {
///             return Err(ctx.abort(Some("ocr never ran")));
///         };
///         Ok(json!({"length": text.to_string().len()}))
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Executes one invocation against the given context.
    async fn call(&self, ctx: TaskContext) -> Result<Value, HandlerError>;
}

/// Function-backed handler implementation.
///
/// Wraps a closure that *creates* a new future per invocation.
///
/// ## Example
/// ```
/// use serde_json::json;
/// use opvisor::{HandlerFn, HandlerRef, TaskContext};
///
/// let h: HandlerRef = HandlerFn::arc(|ctx: TaskContext| async move {
///     if ctx.input().is_null() {
///         return Err(ctx.retry(None));
///     }
///     Ok(json!({"ok": true}))
/// });
/// ```
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    async fn call(&self, ctx: TaskContext) -> Result<Value, HandlerError> {
        (self.f)(ctx).await
    }
}
