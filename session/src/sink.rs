use picker_catalog::CatalogNode;
use picker_catalog::ResolvedReference;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

/// Receives everything a session wants rendered. Called on the thread that
/// drives the session, never from a worker.
pub trait PickerSink: Send {
    fn on_filtered_tree_ready(&mut self, nodes: &[CatalogNode]);

    fn on_progress(&mut self, depth: usize, fraction: f32, label: &str);

    fn on_resolved(&mut self, reference: &ResolvedReference);

    fn on_cancelled(&mut self);
}

#[derive(Debug, Clone)]
pub enum SinkEvent {
    TreeReady(Vec<CatalogNode>),
    Progress {
        depth: usize,
        fraction: f32,
        label: String,
    },
    Resolved(ResolvedReference),
    Cancelled,
}

/// Sink that records events for later inspection. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, event: SinkEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SinkEvent>> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl PickerSink for CollectingSink {
    fn on_filtered_tree_ready(&mut self, nodes: &[CatalogNode]) {
        self.push(SinkEvent::TreeReady(nodes.to_vec()));
    }

    fn on_progress(&mut self, depth: usize, fraction: f32, label: &str) {
        self.push(SinkEvent::Progress {
            depth,
            fraction,
            label: label.to_string(),
        });
    }

    fn on_resolved(&mut self, reference: &ResolvedReference) {
        self.push(SinkEvent::Resolved(reference.clone()));
    }

    fn on_cancelled(&mut self) {
        self.push(SinkEvent::Cancelled);
    }
}
