//! Submit resolution: what an Enter press with no explicit pick means.

use crate::types::Candidate;

/// Outcome of resolving a raw submit against the current suggestion list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one suggestion matched the text; commit it.
    Catalog(Candidate),
    /// No unique match, but custom terms are permitted; commit the raw text.
    Custom(String),
    /// No unique match and no escape hatch; keep the list open.
    NoUniqueMatch,
}

/// A candidate matches when the submitted text equals its label or its
/// short form, ignoring ASCII case.
fn is_exact_match(candidate: &Candidate, text: &str) -> bool {
    candidate.label.eq_ignore_ascii_case(text)
        || (!candidate.short_form.is_empty() && candidate.short_form.eq_ignore_ascii_case(text))
}

pub fn resolve_submit(
    text: &str,
    candidates: &[Candidate],
    allow_custom_terms: bool,
) -> Resolution {
    let mut matches = candidates.iter().filter(|c| is_exact_match(c, text));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Resolution::Catalog(only.clone()),
        _ if allow_custom_terms => Resolution::Custom(text.to_string()),
        _ => Resolution::NoUniqueMatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(label: &str, short_form: &str) -> Candidate {
        Candidate {
            iri: format!("http://example.org/{short_form}"),
            label: label.into(),
            short_form: short_form.into(),
            ontology_name: "efo".into(),
            kind: None,
            fields: Default::default(),
        }
    }

    #[test]
    fn test_unique_label_match_commits_catalog() {
        let list = vec![candidate("insulin", "EFO_1"), candidate("proinsulin", "EFO_2")];
        let resolution = resolve_submit("Insulin", &list, false);
        assert_eq!(resolution, Resolution::Catalog(list[0].clone()));
    }

    #[test]
    fn test_short_form_matches_too() {
        let list = vec![candidate("insulin", "EFO_1")];
        assert_eq!(
            resolve_submit("efo_1", &list, false),
            Resolution::Catalog(list[0].clone())
        );
    }

    #[test]
    fn test_no_match_with_custom_terms_allowed() {
        let list = vec![candidate("insulin receptor", "EFO_1")];
        assert_eq!(
            resolve_submit("insulin", &list, true),
            Resolution::Custom("insulin".into())
        );
    }

    #[test]
    fn test_no_match_without_custom_terms() {
        let list = vec![candidate("insulin receptor", "EFO_1")];
        assert_eq!(resolve_submit("insulin", &list, false), Resolution::NoUniqueMatch);
    }

    #[test]
    fn test_ambiguous_match_is_not_a_catalog_commit() {
        let list = vec![candidate("insulin", "EFO_1"), candidate("insulin", "NCIT_1")];
        assert_eq!(resolve_submit("insulin", &list, false), Resolution::NoUniqueMatch);
        assert_eq!(
            resolve_submit("insulin", &list, true),
            Resolution::Custom("insulin".into())
        );
    }
}
