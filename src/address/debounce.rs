use crate::address::traits::AddressSearch;
use crate::address::types::{is_searchable, SearchOutcome};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Debounced address search with request supersession.
///
/// Each [`submit`](Self::submit) starts a new generation: the previous task is
/// aborted, and a task only publishes its outcome if no newer query was
/// submitted in the meantime. The generation check and the publication happen
/// under the same lock as the bump, so once `submit` returns no older task can
/// publish. At most one request per field is in flight.
pub struct DebouncedSearch {
    search: Arc<dyn AddressSearch>,
    delay: Duration,
    limit: usize,
    generation: Arc<Mutex<u64>>,
    pending: Option<JoinHandle<()>>,
    tx: watch::Sender<SearchOutcome>,
}

impl DebouncedSearch {
    pub fn new(search: Arc<dyn AddressSearch>, delay: Duration, limit: usize) -> Self {
        let (tx, _rx) = watch::channel(SearchOutcome::default());
        Self {
            search,
            delay,
            limit,
            generation: Arc::new(Mutex::new(0)),
            pending: None,
            tx,
        }
    }

    /// Receiver of the latest applied outcome
    pub fn subscribe(&self) -> watch::Receiver<SearchOutcome> {
        self.tx.subscribe()
    }

    /// Latest applied outcome
    pub fn latest(&self) -> SearchOutcome {
        self.tx.borrow().clone()
    }

    /// Feed the current input value. Must be called from within a tokio runtime.
    pub fn submit(&mut self, query: &str) {
        let generation = self.bump();
        self.abort_pending();

        let query = query.trim().to_string();
        if !is_searchable(&query) {
            self.tx.send_replace(SearchOutcome::empty(query));
            return;
        }

        let search = Arc::clone(&self.search);
        let current = Arc::clone(&self.generation);
        let tx = self.tx.clone();
        let delay = self.delay;
        let limit = self.limit;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if *lock(&current) != generation {
                return;
            }

            let outcome = match search.search(&query, limit).await {
                Ok(suggestions) => SearchOutcome::found(query, suggestions),
                Err(e) => {
                    warn!("{} search failed: {:#}", search.provider_name(), e);
                    SearchOutcome::failed(query)
                }
            };

            let latest = lock(&current);
            if *latest == generation {
                tx.send_replace(outcome);
            } else {
                debug!("Dropping superseded result for {:?}", outcome.query);
            }
        }));
    }

    /// Cancel any pending or in-flight search without publishing anything
    pub fn cancel(&mut self) {
        self.bump();
        self.abort_pending();
    }

    fn bump(&self) -> u64 {
        let mut generation = lock(&self.generation);
        *generation += 1;
        *generation
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

fn lock(generation: &Mutex<u64>) -> std::sync::MutexGuard<'_, u64> {
    generation.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.cancel();
    }
}
