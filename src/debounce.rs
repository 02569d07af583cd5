//! Keystroke coalescing: only the last request scheduled within a quiet
//! window is dispatched.
//!
//! A dedicated worker thread receives scheduled requests, drains its queue
//! to the newest one, sleeps out the window, then re-checks the generation
//! counter. `schedule` and `cancel` both bump the counter, so a superseded
//! or cancelled timer can never fire late.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::query::SearchRequest;

struct Work {
    request: SearchRequest,
    generation: u64,
}

pub(crate) struct Debouncer {
    tx: mpsc::Sender<Work>,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(
        window: Duration,
        on_fire: impl Fn(SearchRequest) + Send + 'static,
    ) -> Self {
        let generation = Arc::new(AtomicU64::new(0));
        let (tx, rx) = mpsc::channel::<Work>();
        {
            let generation = Arc::clone(&generation);
            thread::Builder::new()
                .name("ontosuggest-debounce".into())
                .spawn(move || debounce_worker(rx, generation, window, on_fire))
                .expect("failed to spawn debounce worker");
        }
        Self { tx, generation }
    }

    /// Supersede any un-fired request and restart the quiet window.
    pub fn schedule(&self, request: SearchRequest) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.tx.send(Work {
            request,
            generation,
        });
    }

    /// Guarantee the pending timer never fires.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

fn debounce_worker(
    rx: mpsc::Receiver<Work>,
    generation: Arc<AtomicU64>,
    window: Duration,
    on_fire: impl Fn(SearchRequest),
) {
    while let Ok(work) = rx.recv() {
        // Drain: if a burst queued up, skip straight to the newest.
        let mut latest = work;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }

        thread::sleep(window);

        // Anything scheduled or cancelled during the sleep supersedes this one.
        if latest.generation != generation.load(Ordering::SeqCst) {
            continue;
        }

        on_fire(latest.request);
    }
}
