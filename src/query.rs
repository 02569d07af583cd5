//! Query construction: raw input text + configuration → `SearchRequest`.
//!
//! All normalization lives here so the debouncer and the search client
//! never see divergent representations of the same query.

use std::collections::BTreeSet;

use crate::config::Config;
use crate::types::EntityKind;

/// One normalized search request. Snapshots everything the backend needs
/// so downstream components never consult the configuration again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub text: String,
    pub catalogs: BTreeSet<String>,
    pub collection: Option<String>,
    pub entity_kind: Option<EntityKind>,
    pub fields: Vec<String>,
    pub page_size: usize,
}

/// Trim and collapse internal whitespace. Case is left to the backend.
pub(crate) fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a request for `raw`, or `None` when the normalized text is below
/// the minimum query length (an empty box never searches).
pub fn build_request(raw: &str, config: &Config) -> Option<SearchRequest> {
    let text = normalize(raw);
    if text.chars().count() < config.min_query_len {
        return None;
    }
    Some(SearchRequest {
        text,
        catalogs: config.catalogs.clone(),
        collection: config.collection.clone(),
        entity_kind: config.entity_kind,
        fields: config.result_fields.clone(),
        page_size: config.page_size,
    })
}
