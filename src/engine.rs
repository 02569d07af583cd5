//! Host-facing glue: wires one `SuggestionSession` to its debounce timer
//! and search worker.
//!
//! The engine owns the only writable reference to the session. Timer and
//! network threads communicate exclusively over channels that `poll`
//! drains, so session transitions happen one at a time on the caller's
//! thread. Independent engine instances share nothing.

use std::sync::{mpsc, Arc};
use std::time::Duration;

use serde_json::Value;

use crate::backend::SearchBackend;
use crate::config::{Config, ConfigError, RawConfig};
use crate::debounce::Debouncer;
use crate::query::SearchRequest;
use crate::session::{CommitError, SessionResponse, SuggestionSession};
use crate::types::CommittedValue;
use crate::worker::SearchWorker;

pub struct AutocompleteEngine {
    session: SuggestionSession,
    debouncer: Debouncer,
    worker: SearchWorker,
    fired_rx: mpsc::Receiver<SearchRequest>,
}

impl AutocompleteEngine {
    pub fn new(config: Config, backend: Arc<dyn SearchBackend>) -> Self {
        let (fired_tx, fired_rx) = mpsc::channel();
        let debouncer = Debouncer::new(Duration::from_millis(config.debounce_ms), move |request| {
            let _ = fired_tx.send(request);
        });
        Self {
            session: SuggestionSession::new(config),
            debouncer,
            worker: SearchWorker::new(backend),
            fired_rx,
        }
    }

    /// Validate raw host configuration and construct the engine.
    /// The only fatal failure in the crate: a session that cannot be
    /// configured never becomes usable.
    pub fn from_raw(raw: RawConfig, backend: Arc<dyn SearchBackend>) -> Result<Self, ConfigError> {
        Ok(Self::new(Config::from_raw(raw)?, backend))
    }

    pub fn session(&self) -> &SuggestionSession {
        &self.session
    }

    /// The committed value, if any.
    pub fn value(&self) -> Option<&CommittedValue> {
        self.session.committed_value()
    }

    /// The host-facing component value: `null` before any commitment, a
    /// structured object for catalog picks, a plain string for custom terms.
    pub fn host_value(&self) -> Value {
        self.session
            .committed_value()
            .map(CommittedValue::host_value)
            .unwrap_or(Value::Null)
    }

    /// Drain timer firings and search outcomes into the session.
    /// Call this from the host's event loop; returns one response per
    /// applied outcome.
    pub fn poll(&mut self) -> Vec<SessionResponse> {
        while let Ok(request) = self.fired_rx.try_recv() {
            if let Some((query, request)) = self.session.accept_fire(request) {
                self.worker.submit(query, request);
            }
        }

        let mut responses = Vec::new();
        while let Some(outcome) = self.worker.try_recv() {
            responses.push(self.session.apply_result(outcome.query, outcome.result));
        }
        responses
    }

    pub fn on_input(&mut self, text: &str) -> SessionResponse {
        let response = self.session.on_input(text);
        self.run_effects(&response);
        response
    }

    pub fn select_suggestion(&mut self, index: usize) -> Result<SessionResponse, CommitError> {
        let response = self.session.select_suggestion(index)?;
        self.run_effects(&response);
        Ok(response)
    }

    pub fn submit(&mut self) -> Result<SessionResponse, CommitError> {
        let response = self.session.submit()?;
        self.run_effects(&response);
        Ok(response)
    }

    pub fn commit_custom_text(&mut self) -> Result<SessionResponse, CommitError> {
        let response = self.session.commit_custom_text()?;
        self.run_effects(&response);
        Ok(response)
    }

    pub fn clear(&mut self) -> SessionResponse {
        let response = self.session.clear();
        self.run_effects(&response);
        response
    }

    pub fn reset(&mut self, value: Option<CommittedValue>) -> SessionResponse {
        let response = self.session.reset(value);
        self.run_effects(&response);
        response
    }

    fn run_effects(&self, response: &SessionResponse) {
        if response.cancel_pending {
            self.debouncer.cancel();
        }
        if let Some(request) = &response.schedule {
            self.debouncer.schedule(request.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Instant;

    use super::*;
    use crate::backend::SearchError;
    use crate::session::SessionPhase;
    use crate::types::{Candidate, EntityKind};

    /// Deterministic in-memory backend that logs every request it serves.
    struct FakeBackend {
        requests: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
            })
        }

        fn served(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl SearchBackend for FakeBackend {
        fn search(&self, request: &SearchRequest) -> Result<Vec<Candidate>, SearchError> {
            self.requests.lock().unwrap().push(request.text.clone());
            Ok((0..3)
                .map(|i| Candidate {
                    iri: format!("http://example.org/{}/{i}", request.text),
                    label: format!("{} {i}", request.text),
                    short_form: format!("T_{i}"),
                    ontology_name: "efo".into(),
                    kind: Some(EntityKind::Class),
                    fields: BTreeMap::new(),
                })
                .collect())
        }
    }

    fn fast_config() -> Config {
        Config {
            debounce_ms: 50,
            ..Config::default()
        }
    }

    /// Poll until the session leaves `AwaitingResponse`/`Typing`, or panic.
    fn poll_until_showing(engine: &mut AutocompleteEngine) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            engine.poll();
            if engine.session().phase() == SessionPhase::Showing {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("session never reached Showing");
    }

    #[test]
    fn test_burst_sends_exactly_one_request() {
        // Scenario C: "a", "ab", "abc" within the debounce window.
        let backend = FakeBackend::new();
        let mut engine = AutocompleteEngine::new(fast_config(), backend.clone());

        engine.on_input("a");
        engine.on_input("ab");
        engine.on_input("abc");
        poll_until_showing(&mut engine);

        assert_eq!(backend.served(), vec!["abc".to_string()]);
        assert_eq!(
            engine.session().suggestions().unwrap().candidates[0].label,
            "abc 0"
        );
    }

    #[test]
    fn test_commit_emits_host_value() {
        let backend = FakeBackend::new();
        let mut engine = AutocompleteEngine::new(fast_config(), backend);
        assert_eq!(engine.host_value(), Value::Null);

        engine.on_input("insulin");
        poll_until_showing(&mut engine);
        engine.select_suggestion(0).unwrap();

        let value = engine.host_value();
        assert_eq!(value["label"], "insulin 0");
        assert_eq!(value["ontology_name"], "efo");
        assert_eq!(engine.poll().len(), 0);
    }

    #[test]
    fn test_identical_requests_yield_identical_ordering() {
        let backend = FakeBackend::new();
        let run = || {
            let mut engine = AutocompleteEngine::new(fast_config(), backend.clone());
            engine.on_input("insulin");
            poll_until_showing(&mut engine);
            engine.session().suggestions().unwrap().candidates.clone()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_clear_suppresses_pending_query() {
        let backend = FakeBackend::new();
        let config = Config {
            debounce_ms: 100,
            ..Config::default()
        };
        let mut engine = AutocompleteEngine::new(config, backend.clone());

        engine.on_input("abc");
        engine.clear();
        thread::sleep(Duration::from_millis(300));
        engine.poll();

        assert!(backend.served().is_empty());
        assert_eq!(engine.session().phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_invalid_raw_config_is_fatal() {
        let raw = RawConfig {
            rows: Some("many".into()),
            ..Default::default()
        };
        assert!(AutocompleteEngine::from_raw(raw, FakeBackend::new()).is_err());
    }
}
