//! # Delivered task and current-service identity.
//!
//! [`TaskDelivery`] is what the operator hands the consumer per message:
//! the opaque payload, service-agnostic meta, the tenant, the ordered
//! prior-result sequence, and the [`ServiceIdentity`] of the service this
//! consumer is about to run.
//!
//! The delivery is immutable for the duration of one invocation and
//! logically destroyed once settled.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ServiceResult;

/// Identity and configuration of the currently executing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceIdentity {
    /// Stable internal service identifier.
    pub id: String,

    /// Optional alias this execution was registered under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Service name.
    pub name: String,

    /// Service version.
    pub version: String,

    /// This service's own configuration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,
}

/// One unit of work as delivered by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDelivery {
    /// Opaque task payload.
    #[serde(default)]
    pub input: Value,

    /// Opaque, service-agnostic annotations.
    #[serde(default)]
    pub meta: Value,

    /// Tenant the task belongs to.
    #[serde(default)]
    pub tenant: String,

    /// Ordered prior-service execution records.
    #[serde(default)]
    pub results: Vec<ServiceResult>,

    /// Identity of the service about to run.
    pub service: ServiceIdentity,
}
