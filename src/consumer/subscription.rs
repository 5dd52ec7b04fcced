//! # Subscription handle: the unsubscribe operation.
//!
//! A [`Subscription`] is returned by
//! [`Consumer::subscribe`](super::Consumer::subscribe) once the
//! subscription is active. It owns the intake cancellation token and the
//! join handle of the intake task.
//!
//! ## Rules
//! - `unsubscribe()` stops admitting new messages immediately.
//! - In-flight admitted messages complete normally; their slots release
//!   through the normal processing path.
//! - The future resolves only after the bus connection is fully torn
//!   down.
//! - Re-subscribing requires a fresh `subscribe` call; the handle is
//!   consumed.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ConsumerError;
use crate::events::{Bus, Event, EventKind};

/// Handle to an active subscription.
#[derive(Debug)]
pub struct Subscription {
    pub(crate) token: CancellationToken,
    pub(crate) done: JoinHandle<Result<(), ConsumerError>>,
    pub(crate) bus: Bus,
}

impl Subscription {
    /// Stops intake and waits for teardown.
    ///
    /// Resolves after all in-flight tasks reached a terminal outcome and
    /// the connection is closed. Errors from the intake loop (admission
    /// violations, teardown failures) surface here.
    pub async fn unsubscribe(self) -> Result<(), ConsumerError> {
        self.bus.publish(Event::now(EventKind::UnsubscribeRequested));
        self.token.cancel();

        match self.done.await {
            Ok(res) => res,
            Err(join_err) => Err(ConsumerError::Teardown {
                reason: format!("intake task failed: {join_err}"),
            }),
        }
    }

    /// True once the intake loop has exited (stream end or unsubscribe).
    ///
    /// The subscription must still be consumed by [`unsubscribe`] to tear
    /// the connection down and observe the final result.
    ///
    /// [`unsubscribe`]: Subscription::unsubscribe
    pub fn is_finished(&self) -> bool {
        self.done.is_finished()
    }
}
