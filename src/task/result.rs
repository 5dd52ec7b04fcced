//! # Historical service execution records.
//!
//! A task accumulates one [`ServiceResult`] per service execution, in
//! sequence order. The same service may run more than once per task; the
//! optional `alias` disambiguates repeated use.
//!
//! ## Identifier resolution rule
//! An entry that carries an alias is addressable **only** by that alias;
//! an entry without an alias is addressable by its name. Alias is the
//! explicit disambiguation key, so looking up an aliased entry by bare
//! name intentionally misses.
//!
//! ## Ordering
//! "First" and "last" lookups resolve by sequence position, never by
//! `executed_at` - the wire timestamp may be coarse or absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One historical execution record of a service within a task.
///
/// At most one of `data` / `error` is set; both absent means the entry was
/// recorded but the service has not run yet (`executed_at` is also absent
/// in that case).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResult {
    /// Stable internal service identifier.
    pub id: String,

    /// Optional alias disambiguating repeated use of the same service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Service name.
    pub name: String,

    /// Service version.
    pub version: String,

    /// Service configuration used for this execution, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,

    /// Wire timestamp of the execution; absent if not yet run.
    ///
    /// Kept opaque (the bus decides the format); never used for ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<String>,

    /// Successful execution output, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Execution error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ServiceResult {
    /// True if `ident` addresses this entry under the resolution rule:
    /// alias match when an alias is set, name match otherwise.
    pub fn matches(&self, ident: &str) -> bool {
        match &self.alias {
            Some(alias) => alias == ident,
            None => self.name == ident,
        }
    }

    /// Returns the envelope of this record with data/error stripped.
    pub fn meta(&self) -> ServiceMeta {
        ServiceMeta {
            id: self.id.clone(),
            alias: self.alias.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            configuration: self.configuration.clone(),
            executed_at: self.executed_at.clone(),
        }
    }
}

/// A [`ServiceResult`] envelope without the data/error outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMeta {
    /// Stable internal service identifier.
    pub id: String,
    /// Optional alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Service name.
    pub name: String,
    /// Service version.
    pub version: String,
    /// Service configuration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,
    /// Wire timestamp of the execution; absent if not yet run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, alias: Option<&str>) -> ServiceResult {
        ServiceResult {
            id: format!("svc-{name}"),
            alias: alias.map(str::to_string),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            configuration: None,
            executed_at: Some("2024-05-02T10:00:00Z".to_string()),
            data: Some(json!({"ok": true})),
            error: None,
        }
    }

    #[test]
    fn unaliased_entry_matches_by_name() {
        let e = entry("ocr", None);
        assert!(e.matches("ocr"));
        assert!(!e.matches("svc-ocr"));
    }

    #[test]
    fn aliased_entry_matches_only_by_alias() {
        let e = entry("ocr", Some("ocr-front"));
        assert!(e.matches("ocr-front"));
        assert!(!e.matches("ocr"));
    }

    #[test]
    fn meta_strips_outcome() {
        let e = entry("ocr", None);
        let meta = e.meta();
        assert_eq!(meta.name, "ocr");
        assert_eq!(meta.executed_at, e.executed_at);
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("data").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn wire_names_are_camel_case() {
        let mut e = entry("ocr", None);
        e.executed_at = Some("t".into());
        let json = serde_json::to_value(&e).unwrap();
        assert!(json.get("executedAt").is_some());
        assert!(json.get("executed_at").is_none());
    }
}
