//! # Task data model.
//!
//! Wire-facing types describing one unit of work as the operator delivers
//! it:
//! - [`TaskDelivery`] - the delivered task: payload, meta, tenant, prior
//!   results, and the identity of the service about to run
//! - [`ServiceIdentity`] - who the currently executing service is
//! - [`ServiceResult`] - one historical execution record
//! - [`ServiceMeta`] - a result envelope with data/error stripped
//!
//! Deserialization from the wire is the transport's concern; this crate
//! only consumes the already-resolved structures.

mod delivery;
mod result;

pub use delivery::{ServiceIdentity, TaskDelivery};
pub use result::{ServiceMeta, ServiceResult};
