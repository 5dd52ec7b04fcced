//! # Task state store.
//!
//! [`TaskState`] is built once per delivery from the wire payload's
//! service-result list and never mutated afterwards. It owns the direct
//! projections (input/meta/tenant) and the identifier resolution over the
//! ordered result sequence.
//!
//! ## Rules
//! - First/last lookups resolve by **sequence position**, never by the
//!   `executed_at` timestamp (which may be coarse or absent).
//! - An aliased entry is addressable only by its alias; an unaliased
//!   entry by its name (see [`ServiceResult::matches`]).

use serde_json::Value;

use crate::task::ServiceResult;

/// Immutable snapshot of a task's accumulated state.
#[derive(Debug, Clone)]
pub struct TaskState {
    input: Value,
    meta: Value,
    tenant: String,
    results: Vec<ServiceResult>,
}

impl TaskState {
    /// Builds the store from already-resolved wire data.
    pub fn new(input: Value, meta: Value, tenant: String, results: Vec<ServiceResult>) -> Self {
        Self {
            input,
            meta,
            tenant,
            results,
        }
    }

    /// The opaque task payload.
    pub fn input(&self) -> &Value {
        &self.input
    }

    /// The opaque, service-agnostic annotations.
    pub fn meta(&self) -> &Value {
        &self.meta
    }

    /// The tenant the task belongs to.
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// The full ordered result sequence, verbatim.
    pub fn results(&self) -> &[ServiceResult] {
        &self.results
    }

    /// First entry matching `ident` in sequence order.
    pub fn first(&self, ident: &str) -> Option<&ServiceResult> {
        self.results.iter().find(|r| r.matches(ident))
    }

    /// Last entry matching `ident` in sequence order.
    pub fn last(&self, ident: &str) -> Option<&ServiceResult> {
        self.results.iter().rev().find(|r| r.matches(ident))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(name: &str, alias: Option<&str>, data: Value) -> ServiceResult {
        ServiceResult {
            id: format!("svc-{name}"),
            alias: alias.map(str::to_string),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            configuration: None,
            executed_at: Some("2024-05-02T10:00:00Z".to_string()),
            data: Some(data),
            error: None,
        }
    }

    fn state(results: Vec<ServiceResult>) -> TaskState {
        TaskState::new(json!({}), json!({}), "acme".to_string(), results)
    }

    #[test]
    fn first_and_last_agree_on_single_occurrence() {
        let s = state(vec![result("ocr", None, json!({"text": "A"}))]);
        assert_eq!(s.first("ocr"), s.last("ocr"));
    }

    #[test]
    fn first_and_last_diverge_on_repeats() {
        let s = state(vec![
            result("ocr", None, json!({"pass": 1})),
            result("enrich", None, json!({})),
            result("ocr", None, json!({"pass": 2})),
        ]);
        assert_eq!(s.first("ocr").unwrap().data, Some(json!({"pass": 1})));
        assert_eq!(s.last("ocr").unwrap().data, Some(json!({"pass": 2})));
    }

    #[test]
    fn resolution_is_by_sequence_not_timestamp() {
        let mut early = result("ocr", None, json!({"pass": 1}));
        early.executed_at = Some("2024-05-02T12:00:00Z".to_string());
        let mut late = result("ocr", None, json!({"pass": 2}));
        // Coarser (earlier) timestamp on the later entry must not matter.
        late.executed_at = Some("2024-05-02T11:00:00Z".to_string());

        let s = state(vec![early, late]);
        assert_eq!(s.last("ocr").unwrap().data, Some(json!({"pass": 2})));
    }

    #[test]
    fn aliased_entries_hide_from_name_lookup() {
        let s = state(vec![
            result("ocr", Some("front"), json!({"side": "front"})),
            result("ocr", None, json!({"side": "plain"})),
        ]);
        // The aliased entry is skipped by a name lookup; the unaliased one wins.
        assert_eq!(
            s.first("ocr").unwrap().data,
            Some(json!({"side": "plain"}))
        );
        assert_eq!(
            s.first("front").unwrap().data,
            Some(json!({"side": "front"}))
        );
    }

    #[test]
    fn missing_identifier_resolves_to_none() {
        let s = state(vec![result("ocr", None, json!({}))]);
        assert!(s.first("missing").is_none());
        assert!(s.last("missing").is_none());
    }
}
