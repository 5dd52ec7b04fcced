//! # Simple logging observer for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [admitted] service=classify tenant=acme tag=7
//! [completed] service=classify tag=7
//! [retry] service=classify tag=7 delay_ms=250
//! [aborted] service=classify tag=7 reason="bad scan"
//! [faulted] service=classify tag=7 reason="index out of bounds"
//! [unsubscribe-requested]
//! [drained]
//! [connection-closed]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Observer;

/// Simple stdout logging observer.
///
/// Enabled via the `logging` feature. Not intended for production use -
/// implement a custom [`Observer`] for structured logging or metrics
/// collection.
pub struct LogWriter;

#[async_trait]
impl Observer for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskAdmitted => {
                println!(
                    "[admitted] service={:?} tenant={:?} tag={:?}",
                    e.service, e.tenant, e.tag
                );
            }
            EventKind::TaskCompleted => {
                println!("[completed] service={:?} tag={:?}", e.service, e.tag);
            }
            EventKind::RetryScheduled => {
                println!(
                    "[retry] service={:?} tag={:?} delay_ms={:?}",
                    e.service, e.tag, e.delay_ms
                );
            }
            EventKind::TaskAborted => {
                println!(
                    "[aborted] service={:?} tag={:?} reason={:?}",
                    e.service, e.tag, e.reason
                );
            }
            EventKind::TaskFaulted => {
                println!(
                    "[faulted] service={:?} tag={:?} reason={:?}",
                    e.service, e.tag, e.reason
                );
            }
            EventKind::SettleFailed => {
                println!(
                    "[settle-failed] service={:?} tag={:?} reason={:?}",
                    e.service, e.tag, e.reason
                );
            }
            EventKind::UnsubscribeRequested => {
                println!("[unsubscribe-requested]");
            }
            EventKind::Drained => {
                println!("[drained]");
            }
            EventKind::ConnectionClosed => {
                println!("[connection-closed]");
            }
            EventKind::ObserverOverflow => {
                println!("[observer-overflow] observer={:?} reason={:?}", e.service, e.reason);
            }
            EventKind::ObserverPanicked => {
                println!("[observer-panicked] observer={:?}", e.service);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
