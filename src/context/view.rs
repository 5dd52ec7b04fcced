//! # TaskContext: the per-invocation view handed to handler code.
//!
//! Composes a [`TaskState`] with the identity/configuration of the
//! currently executing service, and exposes the two control operations,
//! [`TaskContext::retry`] and [`TaskContext::abort`].
//!
//! ## Control-flow contract
//! `retry`/`abort` construct a [`HandlerError`] the handler must
//! immediately return:
//!
//! ```rust
//! use opvisor::{TaskContext, HandlerError};
//! use serde_json::{json, Value};
//!
//! async fn handle(ctx: TaskContext) -> Result<Value, HandlerError> {
//!     if ctx.service_data("ocr").is_none() {
//!         return Err(ctx.retry(None));
//!     }
//!     Ok(json!({"done": true}))
//! }
//! ```
//!
//! The `return` makes the exit non-local: no handler code after it
//! executes, and the normal return value is never produced.

use std::time::Duration;

use serde_json::Value;

use crate::error::HandlerError;
use crate::task::{ServiceIdentity, ServiceMeta, ServiceResult, TaskDelivery};

use super::TaskState;

/// Read-only execution context for one handler invocation.
///
/// Created fresh per delivery, discarded after the invocation settles.
#[derive(Debug, Clone)]
pub struct TaskContext {
    state: TaskState,
    service: ServiceIdentity,
}

impl TaskContext {
    /// Builds the context from a delivery.
    pub fn new(delivery: TaskDelivery) -> Self {
        let TaskDelivery {
            input,
            meta,
            tenant,
            results,
            service,
        } = delivery;
        Self {
            state: TaskState::new(input, meta, tenant, results),
            service,
        }
    }

    /// The opaque task payload.
    pub fn input(&self) -> &Value {
        self.state.input()
    }

    /// The opaque, service-agnostic annotations.
    pub fn meta(&self) -> &Value {
        self.state.meta()
    }

    /// The tenant the task belongs to.
    pub fn tenant(&self) -> &str {
        self.state.tenant()
    }

    /// The currently executing service's own configuration, if any.
    pub fn configuration(&self) -> Option<&Value> {
        self.service.configuration.as_ref()
    }

    /// Identity of the currently executing service.
    pub fn service(&self) -> &ServiceIdentity {
        &self.service
    }

    /// Envelope of the first matching execution record.
    ///
    /// `None` means the identified service has not executed in this task
    /// (the not-yet-executed sentinel).
    pub fn service_meta(&self, ident: &str) -> Option<ServiceMeta> {
        self.state.first(ident).map(ServiceResult::meta)
    }

    /// Data of the first matching execution, if it produced data.
    pub fn service_data(&self, ident: &str) -> Option<&Value> {
        self.state.first(ident).and_then(|r| r.data.as_ref())
    }

    /// Error of the first matching execution, if it produced an error.
    pub fn service_error(&self, ident: &str) -> Option<&Value> {
        self.state.first(ident).and_then(|r| r.error.as_ref())
    }

    /// Data of the last matching execution in sequence order.
    pub fn last_service_data(&self, ident: &str) -> Option<&Value> {
        self.state.last(ident).and_then(|r| r.data.as_ref())
    }

    /// Error of the last matching execution in sequence order.
    pub fn last_service_error(&self, ident: &str) -> Option<&Value> {
        self.state.last(ident).and_then(|r| r.error.as_ref())
    }

    /// The full ordered result sequence, verbatim.
    pub fn results(&self) -> &[ServiceResult] {
        self.state.results()
    }

    /// Requests redelivery of this task's current service step.
    ///
    /// The returned signal must be returned from the handler immediately.
    /// A positive `delay` below 100ms is clamped up to 100ms; `None` means
    /// "retry with no enforced delay". The engine does not prevent
    /// infinite retry loops; bounding retries is the handler's job.
    #[must_use = "the signal must be returned from the handler"]
    pub fn retry(&self, delay: Option<Duration>) -> HandlerError {
        HandlerError::retry(delay)
    }

    /// Fails this task's current service step immediately.
    ///
    /// The returned signal must be returned from the handler immediately.
    /// Whether the overall task fails is decided by the bus's fail-over
    /// configuration; this engine only reports the abort and its reason.
    #[must_use = "the signal must be returned from the handler"]
    pub fn abort(&self, reason: Option<impl Into<String>>) -> HandlerError {
        HandlerError::abort(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(name: &str, alias: Option<&str>, data: Option<Value>, error: Option<Value>) -> ServiceResult {
        ServiceResult {
            id: format!("svc-{name}"),
            alias: alias.map(str::to_string),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            configuration: None,
            executed_at: data.as_ref().or(error.as_ref()).map(|_| "2024-05-02T10:00:00Z".to_string()),
            data,
            error,
        }
    }

    fn context(results: Vec<ServiceResult>) -> TaskContext {
        TaskContext::new(TaskDelivery {
            input: json!({"document": "doc-1"}),
            meta: json!({"trace": "abc"}),
            tenant: "acme".to_string(),
            results,
            service: ServiceIdentity {
                id: "svc-current".to_string(),
                alias: None,
                name: "classify".to_string(),
                version: "2.0.0".to_string(),
                configuration: Some(json!({"threshold": 0.8})),
            },
        })
    }

    #[test]
    fn direct_projections() {
        let ctx = context(vec![]);
        assert_eq!(ctx.input(), &json!({"document": "doc-1"}));
        assert_eq!(ctx.meta(), &json!({"trace": "abc"}));
        assert_eq!(ctx.tenant(), "acme");
        assert_eq!(ctx.configuration(), Some(&json!({"threshold": 0.8})));
        assert_eq!(ctx.service().name, "classify");
    }

    #[test]
    fn prior_ocr_data_is_visible() {
        let ctx = context(vec![result("ocr", None, Some(json!({"text": "A"})), None)]);
        assert_eq!(ctx.service_data("ocr"), Some(&json!({"text": "A"})));
    }

    #[test]
    fn missing_service_yields_none_not_error() {
        let ctx = context(vec![result("ocr", None, Some(json!({"text": "A"})), None)]);
        assert!(ctx.service_data("missing").is_none());
        assert!(ctx.service_error("missing").is_none());
        assert!(ctx.service_meta("missing").is_none());
    }

    #[test]
    fn first_and_last_lookups_over_repeats() {
        let ctx = context(vec![
            result("ocr", None, Some(json!({"pass": 1})), None),
            result("ocr", None, Some(json!({"pass": 2})), None),
            result("ocr", None, Some(json!({"pass": 3})), None),
        ]);
        assert_eq!(ctx.service_data("ocr"), Some(&json!({"pass": 1})));
        assert_eq!(ctx.last_service_data("ocr"), Some(&json!({"pass": 3})));
    }

    #[test]
    fn error_and_data_are_distinct_outcome_kinds() {
        let ctx = context(vec![
            result("ocr", None, None, Some(json!({"code": "blur"}))),
            result("ocr", None, Some(json!({"text": "B"})), None),
        ]);
        // First occurrence carries only an error, no data.
        assert!(ctx.service_data("ocr").is_none());
        assert_eq!(ctx.service_error("ocr"), Some(&json!({"code": "blur"})));
        // Last occurrence carries only data.
        assert_eq!(ctx.last_service_data("ocr"), Some(&json!({"text": "B"})));
        assert!(ctx.last_service_error("ocr").is_none());
    }

    #[test]
    fn meta_lookup_returns_stripped_envelope() {
        let ctx = context(vec![result("ocr", Some("front"), Some(json!({})), None)]);
        let meta = ctx.service_meta("front").unwrap();
        assert_eq!(meta.name, "ocr");
        assert_eq!(meta.alias.as_deref(), Some("front"));
        assert!(meta.executed_at.is_some());
    }

    #[test]
    fn control_ops_produce_signals() {
        let ctx = context(vec![]);
        assert_eq!(
            ctx.retry(Some(Duration::from_millis(50))),
            HandlerError::Retry {
                delay: Duration::from_millis(100)
            }
        );
        assert_eq!(
            ctx.abort(Some("bad scan")),
            HandlerError::Abort {
                reason: Some("bad scan".into())
            }
        );
    }

    #[test]
    fn results_returns_sequence_verbatim() {
        let entries = vec![
            result("ocr", Some("front"), Some(json!({})), None),
            result("ocr", None, Some(json!({})), None),
        ];
        let ctx = context(entries.clone());
        assert_eq!(ctx.results(), entries.as_slice());
    }
}
