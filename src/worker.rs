//! Background search dispatch.
//!
//! One worker thread runs requests against the backend sequentially and
//! reports outcomes tagged with the session-issued `QueryId`. In-flight
//! calls are never killed; a stale outcome is simply ignored by the
//! session's id check.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use crate::backend::{SearchBackend, SearchError};
use crate::query::SearchRequest;
use crate::types::{Candidate, QueryId};

pub(crate) struct SearchWork {
    pub query: QueryId,
    pub request: SearchRequest,
}

pub(crate) struct SearchOutcome {
    pub query: QueryId,
    pub result: Result<Vec<Candidate>, SearchError>,
}

pub(crate) struct SearchWorker {
    tx: mpsc::Sender<SearchWork>,
    rx: Mutex<mpsc::Receiver<SearchOutcome>>,
}

impl SearchWorker {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        let (work_tx, work_rx) = mpsc::channel::<SearchWork>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<SearchOutcome>();
        thread::Builder::new()
            .name("ontosuggest-search".into())
            .spawn(move || search_worker(work_rx, outcome_tx, backend))
            .expect("failed to spawn search worker");
        Self {
            tx: work_tx,
            rx: Mutex::new(outcome_rx),
        }
    }

    pub fn submit(&self, query: QueryId, request: SearchRequest) {
        let _ = self.tx.send(SearchWork { query, request });
    }

    pub fn try_recv(&self) -> Option<SearchOutcome> {
        let rx = self.rx.lock().ok()?;
        rx.try_recv().ok()
    }
}

fn search_worker(
    rx: mpsc::Receiver<SearchWork>,
    tx: mpsc::Sender<SearchOutcome>,
    backend: Arc<dyn SearchBackend>,
) {
    while let Ok(work) = rx.recv() {
        let result = backend.search(&work.request);
        let _ = tx.send(SearchOutcome {
            query: work.query,
            result,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Config;
    use crate::query::build_request;

    struct EchoBackend;

    impl SearchBackend for EchoBackend {
        fn search(&self, request: &SearchRequest) -> Result<Vec<Candidate>, SearchError> {
            Ok(vec![Candidate {
                iri: format!("http://example.org/{}", request.text),
                label: request.text.clone(),
                short_form: String::new(),
                ontology_name: String::new(),
                kind: None,
                fields: Default::default(),
            }])
        }
    }

    #[test]
    fn test_outcome_carries_query_id() {
        let worker = SearchWorker::new(Arc::new(EchoBackend));
        let request = build_request("insulin", &Config::default()).unwrap();
        worker.submit(QueryId(7), request);

        let mut outcome = None;
        for _ in 0..100 {
            outcome = worker.try_recv();
            if outcome.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        let outcome = outcome.expect("worker never responded");
        assert_eq!(outcome.query, QueryId(7));
        assert_eq!(outcome.result.unwrap()[0].label, "insulin");
    }
}
