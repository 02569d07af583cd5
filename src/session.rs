//! Per-widget suggestion session: the state machine that turns input
//! events, timer firings, and network outcomes into display state and a
//! committed value.
//!
//! The session is synchronous and exclusively owns its state. Timing and
//! network effects are described in the returned `SessionResponse` and
//! executed by the caller (`AutocompleteEngine`), so every transition is
//! testable without threads.

use tracing::debug;

use crate::backend::SearchError;
use crate::config::Config;
use crate::query::{build_request, normalize, SearchRequest};
use crate::resolver::{resolve_submit, Resolution};
use crate::types::{Candidate, CommittedValue, QueryId, SuggestionList};


/// Observable phase of a session. `Committed` is terminal for the
/// interaction; `clear` or `reset` starts a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Typing,
    AwaitingResponse,
    Showing,
    Committed,
}

/// Suggestion panel action, exactly one of three states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SuggestionAction {
    /// Leave the panel as-is (e.g. keep the last-good list on a failure).
    #[default]
    Keep,
    /// Show or replace the panel with these candidates.
    Show {
        query: QueryId,
        candidates: Vec<Candidate>,
    },
    /// Hide the panel.
    Hide,
}

/// Commit attempt failure. Non-fatal: the session state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// Custom-term commit attempted while the configuration disallows it.
    #[error("custom terms are not permitted by this session")]
    PolicyViolation,
    /// Submit found no unambiguous catalog match; the list stays open.
    #[error("no unique match for the submitted text")]
    NoUniqueMatch,
    /// Nothing selectable or committable in the current state.
    #[error("nothing to commit")]
    NothingToCommit,
}

/// Effects of one session transition, returned to the caller.
#[derive(Debug, Default)]
pub struct SessionResponse {
    /// Newly committed value to emit to the host.
    pub committed: Option<CommittedValue>,
    pub suggestions: SuggestionAction,
    /// Request to hand to the debouncer.
    pub schedule: Option<SearchRequest>,
    /// Cancel any pending debounce timer.
    pub cancel_pending: bool,
    /// Per-query failure to surface inline; the display state is kept.
    pub error: Option<SearchError>,
}

impl SessionResponse {
    fn hide() -> Self {
        Self {
            suggestions: SuggestionAction::Hide,
            ..Self::default()
        }
    }
}

/// State machine for one autocomplete input session.
pub struct SuggestionSession {
    config: Config,
    /// Raw text as last typed (normalization happens in the query builder).
    pending: String,
    /// Last accepted suggestion list; survives re-querying and failures.
    suggestions: Option<SuggestionList>,
    /// Query id of the single in-flight request, if any.
    in_flight: Option<QueryId>,
    committed: Option<CommittedValue>,
    last_error: Option<SearchError>,
    query_seq: u64,
}

impl SuggestionSession {
    pub fn new(config: Config) -> Self {
        let committed = config
            .initial_value
            .clone()
            .or_else(|| config.default_value.clone())
            .map(|text| CommittedValue::Custom { text });
        Self {
            config,
            pending: String::new(),
            suggestions: None,
            in_flight: None,
            committed,
            last_error: None,
            query_seq: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        if self.committed.is_some() {
            SessionPhase::Committed
        } else if self.in_flight.is_some() {
            SessionPhase::AwaitingResponse
        } else if self.suggestions.is_some() {
            SessionPhase::Showing
        } else if !normalize(&self.pending).is_empty() {
            SessionPhase::Typing
        } else {
            SessionPhase::Idle
        }
    }

    pub fn pending_text(&self) -> &str {
        &self.pending
    }

    pub fn suggestions(&self) -> Option<&SuggestionList> {
        self.suggestions.as_ref()
    }

    pub fn committed_value(&self) -> Option<&CommittedValue> {
        self.committed.as_ref()
    }

    pub fn last_error(&self) -> Option<&SearchError> {
        self.last_error.as_ref()
    }

    /// A keystroke changed the input text.
    ///
    /// Any state moves to `Typing`; sub-minimum text (the cleared-box case)
    /// instead drops straight to `Idle` with no list and no pending timer.
    pub fn on_input(&mut self, text: &str) -> SessionResponse {
        self.pending = text.to_string();
        self.committed = None;
        self.last_error = None;

        match build_request(text, &self.config) {
            Some(request) => SessionResponse {
                schedule: Some(request),
                ..SessionResponse::default()
            },
            None => {
                self.suggestions = None;
                self.in_flight = None;
                SessionResponse {
                    cancel_pending: true,
                    ..SessionResponse::hide()
                }
            }
        }
    }

    /// The debounce timer fired for `request`.
    ///
    /// Issues a fresh `QueryId` and moves to `AwaitingResponse`, unless the
    /// session has moved on since the request was scheduled (committed,
    /// cleared, or retyped), in which case the fire is dropped.
    pub fn accept_fire(&mut self, request: SearchRequest) -> Option<(QueryId, SearchRequest)> {
        if self.committed.is_some() {
            return None;
        }
        let current = build_request(&self.pending, &self.config)?;
        if current.text != request.text {
            debug!(fired = %request.text, pending = %current.text, "dropping stale fire");
            return None;
        }
        self.query_seq += 1;
        let query = QueryId(self.query_seq);
        self.in_flight = Some(query);
        Some((query, request))
    }

    /// A search outcome arrived.
    ///
    /// Outcomes whose id is not the current in-flight id are superseded and
    /// discarded. Success replaces the suggestion list wholesale, keeping
    /// the backend's rank order; failure keeps the previous display state
    /// and records the error for the host.
    pub fn apply_result(
        &mut self,
        query: QueryId,
        result: Result<Vec<Candidate>, SearchError>,
    ) -> SessionResponse {
        if self.in_flight != Some(query) {
            debug!(?query, current = ?self.in_flight, "discarding superseded response");
            return SessionResponse::default();
        }
        self.in_flight = None;

        match result {
            Ok(candidates) => {
                self.last_error = None;
                self.suggestions = Some(SuggestionList {
                    query,
                    candidates: candidates.clone(),
                });
                SessionResponse {
                    suggestions: SuggestionAction::Show { query, candidates },
                    ..SessionResponse::default()
                }
            }
            Err(error) => {
                self.last_error = Some(error.clone());
                SessionResponse {
                    error: Some(error),
                    ..SessionResponse::default()
                }
            }
        }
    }

    /// The user picked a suggestion from the list.
    pub fn select_suggestion(&mut self, index: usize) -> Result<SessionResponse, CommitError> {
        if self.committed.is_some() {
            return Err(CommitError::NothingToCommit);
        }
        let candidate = self
            .suggestions
            .as_ref()
            .and_then(|list| list.candidates.get(index))
            .cloned()
            .ok_or(CommitError::NothingToCommit)?;
        Ok(self.commit(CommittedValue::Catalog { candidate }))
    }

    /// The user pressed Enter with no explicit pick.
    pub fn submit(&mut self) -> Result<SessionResponse, CommitError> {
        if self.committed.is_some() {
            return Err(CommitError::NothingToCommit);
        }
        let text = normalize(&self.pending);
        if text.is_empty() {
            return Err(CommitError::NothingToCommit);
        }
        let candidates = self
            .suggestions
            .as_ref()
            .map(|list| list.candidates.as_slice())
            .unwrap_or_default();
        match resolve_submit(&text, candidates, self.config.allow_custom_terms) {
            Resolution::Catalog(candidate) => Ok(self.commit(CommittedValue::Catalog { candidate })),
            Resolution::Custom(text) => Ok(self.commit(CommittedValue::Custom { text })),
            Resolution::NoUniqueMatch => Err(CommitError::NoUniqueMatch),
        }
    }

    /// Explicitly commit the pending text as a non-catalog term.
    ///
    /// Gated by the custom-term policy. A unique catalog match for the text
    /// takes precedence over the escape hatch.
    pub fn commit_custom_text(&mut self) -> Result<SessionResponse, CommitError> {
        if self.committed.is_some() {
            return Err(CommitError::NothingToCommit);
        }
        let text = normalize(&self.pending);
        if text.is_empty() {
            return Err(CommitError::NothingToCommit);
        }
        let candidates = self
            .suggestions
            .as_ref()
            .map(|list| list.candidates.as_slice())
            .unwrap_or_default();
        if let Resolution::Catalog(candidate) = resolve_submit(&text, candidates, false) {
            return Ok(self.commit(CommittedValue::Catalog { candidate }));
        }
        if !self.config.allow_custom_terms {
            return Err(CommitError::PolicyViolation);
        }
        Ok(self.commit(CommittedValue::Custom { text }))
    }

    /// Drop everything and return to `Idle`.
    pub fn clear(&mut self) -> SessionResponse {
        self.pending.clear();
        self.suggestions = None;
        self.in_flight = None;
        self.committed = None;
        self.last_error = None;
        SessionResponse {
            cancel_pending: true,
            ..SessionResponse::hide()
        }
    }

    /// Host-driven re-initialization, mirroring construction: `Idle` with
    /// no value, `Committed` with one.
    pub fn reset(&mut self, value: Option<CommittedValue>) -> SessionResponse {
        let mut response = self.clear();
        if let Some(value) = value {
            self.committed = Some(value.clone());
            response.committed = Some(value);
        }
        response
    }

    fn commit(&mut self, value: CommittedValue) -> SessionResponse {
        debug!(label = %value.label(true), "commit");
        self.pending.clear();
        self.suggestions = None;
        self.in_flight = None;
        self.last_error = None;
        self.committed = Some(value.clone());
        SessionResponse {
            committed: Some(value),
            cancel_pending: true,
            ..SessionResponse::hide()
        }
    }
}
