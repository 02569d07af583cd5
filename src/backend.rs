//! Lookup backend: the transport half of the search client.
//!
//! `SearchBackend` is the pluggable seam; `OlsBackend` talks to an
//! OLS-style semantic-lookup service over its Solr `select` endpoint.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug_span;

use crate::query::SearchRequest;
use crate::types::{Candidate, EntityKind};

/// Per-query failure. Non-fatal to the session: the last-good suggestion
/// list stays on display and the error is surfaced to the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend error (status {status}): {message}")]
    Backend { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

/// A pluggable search backend executing one request at a time.
///
/// Implementations must be idempotent and must not retry; retry policy
/// belongs to the host.
pub trait SearchBackend: Send + Sync {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Candidate>, SearchError>;
}

/// Backend for the OLS `select` endpoint
/// (e.g. `https://semanticlookup.zbmed.de/ols/api/`).
pub struct OlsBackend {
    base_url: String,
}

impl OlsBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

/// Query parameters for one request, in the order they are sent.
fn query_params(request: &SearchRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("q", request.text.clone()),
        ("rows", request.page_size.to_string()),
    ];
    if !request.catalogs.is_empty() {
        let list: Vec<&str> = request.catalogs.iter().map(String::as_str).collect();
        params.push(("ontology", list.join(",")));
    }
    if let Some(collection) = &request.collection {
        params.push(("collection", collection.clone()));
    }
    if let Some(kind) = request.entity_kind {
        params.push(("type", kind.as_str().to_string()));
    }
    if !request.fields.is_empty() {
        params.push(("fieldList", request.fields.join(",")));
    }
    params
}

impl SearchBackend for OlsBackend {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Candidate>, SearchError> {
        let _span = debug_span!("ols_select", query = %request.text).entered();

        let url = format!("{}/select", self.base_url);
        let mut call = ureq::get(&url);
        for (key, value) in query_params(request) {
            call = call.query(key, &value);
        }

        let body = match call.call() {
            Ok(response) => response
                .into_body()
                .read_to_string()
                .map_err(|e| SearchError::Network(e.to_string()))?,
            Err(ureq::Error::StatusCode(status)) => {
                return Err(SearchError::Backend {
                    status,
                    message: format!("HTTP {status}"),
                })
            }
            Err(e) => return Err(SearchError::Network(e.to_string())),
        };

        decode_select_body(&body, &request.fields)
    }
}

/// Decode a Solr-style select body into candidates, keeping only the
/// requested fields. The service reports some failures as an in-body
/// error object with HTTP 200; those surface as `Backend` errors.
pub(crate) fn decode_select_body(
    body: &str,
    fields: &[String],
) -> Result<Vec<Candidate>, SearchError> {
    let root: Value =
        serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;

    if let Some(error) = root.get("error").and_then(Value::as_str) {
        let status = root.get("status").and_then(Value::as_u64).unwrap_or(500) as u16;
        let message = match root.get("message").and_then(Value::as_str) {
            Some(detail) => format!("{error} - {detail}"),
            None => error.to_string(),
        };
        return Err(SearchError::Backend { status, message });
    }

    let docs = root
        .get("response")
        .and_then(|r| r.get("docs"))
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Decode("missing response.docs".into()))?;

    Ok(docs.iter().map(|doc| candidate_from_doc(doc, fields)).collect())
}

fn candidate_from_doc(doc: &Value, fields: &[String]) -> Candidate {
    let mut requested = BTreeMap::new();
    for field in fields {
        if let Some(value) = doc_str(doc, field) {
            requested.insert(field.clone(), value);
        }
    }
    Candidate {
        iri: doc_str(doc, "iri").unwrap_or_default(),
        label: doc_str(doc, "label").unwrap_or_default(),
        short_form: doc_str(doc, "short_form").unwrap_or_default(),
        ontology_name: doc_str(doc, "ontology_name").unwrap_or_default(),
        kind: doc_str(doc, "type").and_then(|t| EntityKind::from_name(&t)),
        fields: requested,
    }
}

/// Read a doc attribute as a string. Multi-valued attributes (Solr returns
/// e.g. `description` as an array) collapse to their first entry.
fn doc_str(doc: &Value, key: &str) -> Option<String> {
    match doc.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::query::build_request;

    const SELECT_BODY: &str = r#"{
        "responseHeader": {"status": 0, "QTime": 3},
        "response": {
            "numFound": 2,
            "start": 0,
            "docs": [
                {
                    "iri": "http://www.ebi.ac.uk/efo/EFO_0000400",
                    "label": "diabetes mellitus",
                    "short_form": "EFO_0000400",
                    "ontology_name": "efo",
                    "ontology_prefix": "EFO",
                    "type": "class",
                    "description": ["A metabolic disease.", "Alternate."]
                },
                {
                    "iri": "http://purl.obolibrary.org/obo/NCIT_C2985",
                    "label": "Diabetes Mellitus",
                    "short_form": "NCIT_C2985",
                    "ontology_name": "ncit",
                    "type": "class"
                }
            ]
        }
    }"#;

    fn fields() -> Vec<String> {
        Config::default().result_fields
    }

    #[test]
    fn test_decode_preserves_backend_order() {
        let candidates = decode_select_body(SELECT_BODY, &fields()).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].short_form, "EFO_0000400");
        assert_eq!(candidates[1].short_form, "NCIT_C2985");
        assert_eq!(candidates[0].kind, Some(EntityKind::Class));
    }

    #[test]
    fn test_decode_intersects_requested_fields() {
        let mut fields = fields();
        fields.push("description".into());
        let candidates = decode_select_body(SELECT_BODY, &fields).unwrap();
        // Multi-valued description collapses to the first entry.
        assert_eq!(
            candidates[0].fields.get("description").map(String::as_str),
            Some("A metabolic disease.")
        );
        // Unrequested attributes are dropped.
        assert!(!candidates[0].fields.contains_key("ontology_prefix"));
        // Absent attributes simply do not appear.
        assert!(!candidates[1].fields.contains_key("description"));
    }

    #[test]
    fn test_decode_in_body_error_object() {
        let body = r#"{"error": "Bad Request", "status": 400, "message": "unknown ontology"}"#;
        let err = decode_select_body(body, &fields()).unwrap_err();
        assert_eq!(
            err,
            SearchError::Backend {
                status: 400,
                message: "Bad Request - unknown ontology".into()
            }
        );
    }

    #[test]
    fn test_decode_malformed_body() {
        assert!(matches!(
            decode_select_body("<html>", &fields()),
            Err(SearchError::Decode(_))
        ));
        assert!(matches!(
            decode_select_body("{}", &fields()),
            Err(SearchError::Decode(_))
        ));
    }

    #[test]
    fn test_query_params() {
        let mut config = Config::default();
        config.catalogs.extend(["ms".to_string(), "efo".to_string()]);
        config.collection = Some("nfdi4health".into());
        config.entity_kind = Some(EntityKind::Class);
        config.page_size = 7;

        let request = build_request("insulin", &config).unwrap();
        let params = query_params(&request);
        assert_eq!(params[0], ("q", "insulin".to_string()));
        assert_eq!(params[1], ("rows", "7".to_string()));
        // BTreeSet keeps the catalog filter deterministic.
        assert!(params.contains(&("ontology", "efo,ms".to_string())));
        assert!(params.contains(&("collection", "nfdi4health".to_string())));
        assert!(params.contains(&("type", "class".to_string())));
        assert!(params
            .iter()
            .any(|(k, v)| *k == "fieldList" && v.starts_with("iri,label")));
    }
}
