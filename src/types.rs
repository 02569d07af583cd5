use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Monotonically increasing per-session query identifier.
///
/// A network response is applied only if its id matches the session's
/// current in-flight id; anything else is superseded and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryId(pub u64);

/// Entity kinds exposed by the lookup service's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Class,
    Property,
    Individual,
    Ontology,
}

impl EntityKind {
    /// Parse a lookup-service type name. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "class" => Some(Self::Class),
            "property" => Some(Self::Property),
            "individual" => Some(Self::Individual),
            "ontology" => Some(Self::Ontology),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Property => "property",
            Self::Individual => "individual",
            Self::Ontology => "ontology",
        }
    }
}

/// One catalog entity returned by the lookup backend.
///
/// `fields` carries only the attributes the host asked for via
/// `field_list`, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub iri: String,
    pub label: String,
    pub short_form: String,
    pub ontology_name: String,
    pub kind: Option<EntityKind>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Candidate {
    /// Label shown for a committed selection.
    ///
    /// Short mode shows the bare label; long mode appends catalog context,
    /// e.g. `diabetes mellitus (EFO EFO_0000400)`.
    pub fn display_label(&self, short: bool) -> String {
        if short || self.ontology_name.is_empty() {
            self.label.clone()
        } else {
            format!(
                "{} ({} {})",
                self.label,
                self.ontology_name.to_uppercase(),
                self.short_form
            )
        }
    }

    /// The structured object handed back to the host for a catalog pick.
    pub fn host_object(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("iri".into(), Value::String(self.iri.clone()));
        map.insert("label".into(), Value::String(self.label.clone()));
        map.insert("short_form".into(), Value::String(self.short_form.clone()));
        map.insert(
            "ontology_name".into(),
            Value::String(self.ontology_name.clone()),
        );
        map.insert(
            "type".into(),
            match self.kind {
                Some(kind) => Value::String(kind.as_str().into()),
                None => Value::String(String::new()),
            },
        );
        for (name, value) in &self.fields {
            map.entry(name.clone())
                .or_insert_with(|| Value::String(value.clone()));
        }
        Value::Object(map)
    }
}

/// Suggestion list for one accepted query. Replaced wholesale on each
/// response, never mutated or re-sorted; order is the backend's rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionList {
    pub query: QueryId,
    pub candidates: Vec<Candidate>,
}

/// The single value a session ever hands back to its host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CommittedValue {
    /// A pick from the catalog suggestion list.
    Catalog { candidate: Candidate },
    /// Free text outside the catalog; reachable only when the
    /// configuration permits custom terms.
    Custom { text: String },
}

impl CommittedValue {
    /// Host-facing JSON: the requested-field object for catalog picks,
    /// a plain string for custom terms.
    pub fn host_value(&self) -> Value {
        match self {
            Self::Catalog { candidate } => candidate.host_object(),
            Self::Custom { text } => Value::String(text.clone()),
        }
    }

    pub fn label(&self, short: bool) -> String {
        match self {
            Self::Catalog { candidate } => candidate.display_label(short),
            Self::Custom { text } => text.clone(),
        }
    }
}
