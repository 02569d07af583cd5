//! Session configuration: stringly host input → normalized `Config`.
//!
//! Validation happens exactly once, at session construction. Out-of-range
//! numeric values clamp so that bad host input degrades instead of breaking
//! the widget; only values that cannot be coerced to their expected type
//! are rejected.

use std::collections::BTreeSet;

use crate::types::EntityKind;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_MIN_QUERY_LEN: usize = 1;

/// Fields the committed value always needs, regardless of what the host
/// asked to display.
const REQUIRED_FIELDS: &[&str] = &["iri", "label", "short_form", "ontology_name", "type"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} is not numeric: {value:?}")]
    NotNumeric { field: &'static str, value: String },
    #[error("{field} is not a boolean: {value:?}")]
    NotBoolean { field: &'static str, value: String },
    #[error("unknown entity kind: {0:?}")]
    UnknownEntityKind(String),
}

/// Raw construction parameters as supplied by the host, all optional.
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    pub label: Option<String>,
    /// Initial committed value (free text or a pre-resolved label).
    pub value: Option<String>,
    /// Session identity, used by the host to route events.
    pub key: Option<String>,
    /// Comma-separated catalog list, e.g. `"efo,ms,chebi"`.
    pub ontologies: Option<String>,
    pub collection: Option<String>,
    pub entity_type: Option<String>,
    pub allow_custom_terms: Option<String>,
    pub has_short_selected_label: Option<String>,
    /// Comma-separated result field list.
    pub field_list: Option<String>,
    pub rows: Option<String>,
    /// Fallback committed value if the user makes no selection.
    pub default: Option<String>,
}

/// Normalized configuration, immutable for the lifetime of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub label: Option<String>,
    pub session_key: Option<String>,
    /// Empty set = unrestricted search.
    pub catalogs: BTreeSet<String>,
    pub collection: Option<String>,
    pub entity_kind: Option<EntityKind>,
    /// Ordered: host-requested fields first, then the required ones.
    pub result_fields: Vec<String>,
    pub page_size: usize,
    pub allow_custom_terms: bool,
    /// Display-only: render committed labels without catalog context.
    pub short_label_mode: bool,
    pub min_query_len: usize,
    pub debounce_ms: u64,
    pub initial_value: Option<String>,
    pub default_value: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            label: None,
            session_key: None,
            catalogs: BTreeSet::new(),
            collection: None,
            entity_kind: None,
            result_fields: with_required_fields(Vec::new()),
            page_size: DEFAULT_PAGE_SIZE,
            allow_custom_terms: false,
            short_label_mode: true,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            initial_value: None,
            default_value: None,
        }
    }
}

impl Config {
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let catalogs: BTreeSet<String> = split_list(raw.ontologies.as_deref())
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect();

        let entity_kind = match raw.entity_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(
                EntityKind::from_name(name)
                    .ok_or_else(|| ConfigError::UnknownEntityKind(name.to_string()))?,
            ),
        };

        let page_size = match raw.rows.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_PAGE_SIZE,
            Some(value) => value
                .parse::<i64>()
                .map_err(|_| ConfigError::NotNumeric {
                    field: "rows",
                    value: value.to_string(),
                })?
                .clamp(1, MAX_PAGE_SIZE as i64) as usize,
        };

        Ok(Self {
            label: non_empty(raw.label),
            session_key: non_empty(raw.key),
            catalogs,
            collection: non_empty(raw.collection),
            entity_kind,
            result_fields: with_required_fields(split_list(raw.field_list.as_deref())),
            page_size,
            allow_custom_terms: parse_bool(
                "allow_custom_terms",
                raw.allow_custom_terms.as_deref(),
                false,
            )?,
            short_label_mode: parse_bool(
                "has_short_selected_label",
                raw.has_short_selected_label.as_deref(),
                true,
            )?,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            initial_value: non_empty(raw.value),
            default_value: non_empty(raw.default),
        })
    }
}

/// Split a comma-separated list, trimming entries and dropping empties.
fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Host-requested fields first (in request order, deduplicated), then any
/// missing required fields. Downstream rendering never sees an empty list.
fn with_required_fields(requested: Vec<String>) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for field in requested
        .into_iter()
        .chain(REQUIRED_FIELDS.iter().map(|f| f.to_string()))
    {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    fields
}

fn parse_bool(
    field: &'static str,
    raw: Option<&str>,
    default: bool,
) -> Result<bool, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::NotBoolean {
                field,
                value: value.to_string(),
            }),
        },
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
