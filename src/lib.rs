//! Autocomplete engine for ontology-entity lookup.
//!
//! Turns raw keystrokes into debounced requests against a semantic-lookup
//! service (an OLS-style `select` endpoint), reconciles out-of-order
//! responses into a suggestion list, and resolves user actions into a
//! single committed value for the host: either a structured catalog
//! entity or, when the configuration permits, free custom text.
//!
//! The decision logic lives in [`SuggestionSession`], a synchronous state
//! machine; [`AutocompleteEngine`] wires it to the debounce timer and the
//! background search worker for hosts that want the batteries included.

pub mod backend;
pub mod config;
pub mod engine;
pub mod query;
pub mod resolver;
pub mod session;
pub mod trace_init;
pub mod types;

mod debounce;
mod worker;

pub use backend::{OlsBackend, SearchBackend, SearchError};
pub use config::{Config, ConfigError, RawConfig};
pub use engine::AutocompleteEngine;
pub use query::{build_request, SearchRequest};
pub use resolver::{resolve_submit, Resolution};
pub use session::{
    CommitError, SessionPhase, SessionResponse, SuggestionAction, SuggestionSession,
};
pub use types::{Candidate, CommittedValue, EntityKind, QueryId, SuggestionList};
