use crate::error::Result;
use crate::error::SearchError;
use crate::generation::SearchGeneration;
use crate::options::SearchOptions;
use crate::pass::SearchPass;
use crate::progress::DepthProgress;
use crate::progress::ProgressBoard;
use picker_catalog::CatalogNode;
use picker_catalog::CatalogProvider;
use picker_matcher::Matcher;
use picker_matcher::SearchQuery;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::thread;
use std::time::Duration;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Searching,
    Delivered,
    Cancelled,
}

/// The filtered tree of one completed pass.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub generation: u64,
    pub query: SearchQuery,
    pub nodes: Vec<CatalogNode>,
    pub elapsed: Duration,
}

/// Runs at most one background search pass at a time.
///
/// Starting a pass cancels the previous one first. Publishing is checked
/// against the pass token and the generation counter under the slot lock,
/// so once `start` or `cancel` returns nothing from an older pass can be
/// delivered. Superseded workers are detached and stop at their next node
/// check.
#[derive(Clone)]
pub struct SearchCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Arc<dyn CatalogProvider>,
    options: SearchOptions,
    generation: SearchGeneration,
    slot: Mutex<Slot>,
    ready: Condvar,
}

struct Slot {
    state: SearchState,
    delivery: Option<Delivery>,
    active: Option<ActivePass>,
}

struct ActivePass {
    generation: u64,
    token: CancellationToken,
    progress: Arc<ProgressBoard>,
    _worker: thread::JoinHandle<()>,
}

impl SearchCoordinator {
    pub fn new(provider: Arc<dyn CatalogProvider>, options: SearchOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                options,
                generation: SearchGeneration::new(),
                slot: Mutex::new(Slot {
                    state: SearchState::Idle,
                    delivery: None,
                    active: None,
                }),
                ready: Condvar::new(),
            }),
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.inner.options
    }

    /// Cancels any running pass and starts a new one over `snapshot`.
    /// Returns the generation id of the new pass.
    pub fn start(&self, snapshot: Arc<Vec<CatalogNode>>, query: SearchQuery) -> Result<u64> {
        let mut slot = self.inner.lock_slot();
        if let Some(previous) = slot.active.take() {
            previous.token.cancel();
            debug!("search pass {} superseded", previous.generation);
        }
        slot.delivery = None;
        let generation = self.inner.generation.next();
        let token = CancellationToken::new();
        let progress = Arc::new(ProgressBoard::new());

        let inner = Arc::clone(&self.inner);
        let worker_token = token.clone();
        let worker_progress = Arc::clone(&progress);
        let spawned = thread::Builder::new()
            .name(format!("picker-search-{generation}"))
            .spawn(move || {
                inner.run_pass(generation, snapshot, query, worker_token, worker_progress);
            });
        let worker = match spawned {
            Ok(worker) => worker,
            Err(source) => {
                slot.state = SearchState::Idle;
                return Err(SearchError::WorkerSpawn {
                    worker: "search",
                    source,
                });
            }
        };

        slot.active = Some(ActivePass {
            generation,
            token,
            progress,
            _worker: worker,
        });
        slot.state = SearchState::Searching;
        Ok(generation)
    }

    /// Cancels the running pass, if any. Its result can no longer be
    /// delivered once this returns.
    pub fn cancel(&self) {
        let mut slot = self.inner.lock_slot();
        let Some(active) = slot.active.take() else {
            return;
        };
        active.token.cancel();
        self.inner.generation.next();
        slot.state = SearchState::Cancelled;
        debug!("search pass {} cancelled", active.generation);
        self.inner.ready.notify_all();
    }

    pub fn state(&self) -> SearchState {
        self.inner.lock_slot().state
    }

    pub fn is_searching(&self) -> bool {
        self.state() == SearchState::Searching
    }

    /// Takes the delivered tree. Each delivery is handed out once.
    pub fn poll(&self) -> Option<Delivery> {
        self.inner.lock_slot().delivery.take()
    }

    /// Blocks until the running pass delivers or is cancelled, or until
    /// `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> Option<Delivery> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.inner.lock_slot();
        while slot.state == SearchState::Searching {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            slot = match self.inner.ready.wait_timeout(slot, remaining) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        slot.delivery.take()
    }

    /// Progress of the running pass: at most `max_progress_depths` of the
    /// deepest active depths.
    pub fn progress(&self) -> Vec<DepthProgress> {
        let slot = self.inner.lock_slot();
        slot.active
            .as_ref()
            .map(|active| active.progress.snapshot(self.inner.options.max_progress_depths))
            .unwrap_or_default()
    }
}

impl Inner {
    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn run_pass(
        &self,
        generation: u64,
        snapshot: Arc<Vec<CatalogNode>>,
        query: SearchQuery,
        token: CancellationToken,
        progress: Arc<ProgressBoard>,
    ) {
        let started = Instant::now();
        let matcher = Matcher::new(query, self.options.weights);
        let roots: Vec<CatalogNode> = snapshot.as_ref().clone();
        drop(snapshot);

        let pass = SearchPass {
            matcher: &matcher,
            provider: self.provider.as_ref(),
            options: &self.options,
            token: &token,
            progress: &progress,
        };
        let outcome = pass.run(roots);

        let mut slot = self.lock_slot();
        match outcome {
            Some(nodes) if !token.is_cancelled() && self.generation.is_current(generation) => {
                let elapsed = started.elapsed();
                debug!(
                    "search pass {generation} delivered {} roots in {elapsed:?}",
                    nodes.len()
                );
                slot.delivery = Some(Delivery {
                    generation,
                    query: matcher.query().clone(),
                    nodes,
                    elapsed,
                });
                slot.state = SearchState::Delivered;
                slot.active = None;
                self.ready.notify_all();
            }
            _ => debug!("search pass {generation} discarded"),
        }
    }
}
