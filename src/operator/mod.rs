//! # Operator boundary: the transport seam.
//!
//! The wire transport is an external collaborator; this module specifies
//! only the interface the consumer core consumes and produces:
//! - [`Operator`] - connects to the bus with a resolved configuration
//! - [`Connection`] - pulls deliveries and settles them by tag
//! - [`Delivery`] - one tagged [`TaskDelivery`](crate::TaskDelivery)
//! - [`AckAction`] - the per-invocation outcome sent back to the bus
//!
//! [`MemoryOperator`] is an in-memory reference transport for tests and
//! demos (no wire, no authentication).

mod memory;
mod transport;

pub use memory::{MemoryConnection, MemoryOperator};
pub use transport::{AckAction, Connection, Delivery, Operator};
