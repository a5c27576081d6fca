use crate::error::Result;
use crate::error::SearchError;
use crate::progress::BoardSink;
use crate::progress::DepthProgress;
use crate::progress::ProgressBoard;
use picker_catalog::CatalogProvider;
use picker_catalog::NamespaceMap;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::thread;
use std::time::Duration;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::warn;

enum LoadState {
    Running,
    Ready(Result<NamespaceMap>),
    Taken,
    Cancelled,
}

/// One-shot background sweep over every type the provider knows, started
/// when a session opens so type listings are ready before they are needed.
pub struct CatalogLoader {
    inner: Arc<LoaderInner>,
    _worker: thread::JoinHandle<()>,
}

struct LoaderInner {
    token: CancellationToken,
    progress: ProgressBoard,
    state: Mutex<LoadState>,
    ready: Condvar,
}

impl CatalogLoader {
    pub fn spawn(provider: Arc<dyn CatalogProvider>) -> Result<Self> {
        let inner = Arc::new(LoaderInner {
            token: CancellationToken::new(),
            progress: ProgressBoard::new(),
            state: Mutex::new(LoadState::Running),
            ready: Condvar::new(),
        });
        let worker_inner = Arc::clone(&inner);
        let worker = thread::Builder::new()
            .name("picker-catalog-loader".to_string())
            .spawn(move || worker_inner.run(provider.as_ref()))
            .map_err(|source| SearchError::WorkerSpawn {
                worker: "catalog loader",
                source,
            })?;
        Ok(Self {
            inner,
            _worker: worker,
        })
    }

    /// Takes the sweep result once it is ready.
    pub fn poll(&self) -> Option<Result<NamespaceMap>> {
        self.inner.take()
    }

    pub fn wait(&self, timeout: Duration) -> Option<Result<NamespaceMap>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.lock();
        while matches!(*state, LoadState::Running) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            state = match self.inner.ready.wait_timeout(state, remaining) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        drop(state);
        self.inner.take()
    }

    pub fn progress(&self) -> Option<DepthProgress> {
        self.inner.progress.snapshot(1).pop()
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.inner.lock(), LoadState::Running)
    }

    pub fn cancel(&self) {
        self.inner.token.cancel();
        let mut state = self.inner.lock();
        if matches!(*state, LoadState::Running | LoadState::Ready(_)) {
            *state = LoadState::Cancelled;
        }
        self.inner.ready.notify_all();
    }
}

impl Drop for CatalogLoader {
    fn drop(&mut self) {
        self.inner.token.cancel();
    }
}

impl LoaderInner {
    fn lock(&self) -> MutexGuard<'_, LoadState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn take(&self) -> Option<Result<NamespaceMap>> {
        let mut state = self.lock();
        if !matches!(*state, LoadState::Ready(_)) {
            return None;
        }
        match std::mem::replace(&mut *state, LoadState::Taken) {
            LoadState::Ready(result) => Some(result),
            _ => None,
        }
    }

    fn run(&self, provider: &dyn CatalogProvider) {
        let started = Instant::now();
        let sink = BoardSink {
            board: &self.progress,
            depth: 0,
            token: &self.token,
        };
        let result = provider.all_types(&sink).map_err(SearchError::from);
        if self.token.is_cancelled() {
            return;
        }
        match &result {
            Ok(map) => info!(
                "catalog sweep found {} types in {} namespaces in {:?}",
                map.values().map(Vec::len).sum::<usize>(),
                map.len(),
                started.elapsed()
            ),
            Err(err) => warn!("catalog sweep failed: {err}"),
        }
        let mut state = self.lock();
        if matches!(*state, LoadState::Running) {
            *state = LoadState::Ready(result);
        }
        self.ready.notify_all();
    }
}
