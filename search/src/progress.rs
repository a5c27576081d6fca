use picker_catalog::ProgressSink;
use std::sync::Mutex;
use std::sync::MutexGuard;
use tokio_util::sync::CancellationToken;

/// Progress of one tree depth within a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthProgress {
    pub depth: usize,
    pub completed: usize,
    pub total: usize,
    pub label: String,
}

impl DepthProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            (self.completed as f32 / self.total as f32).min(1.0)
        }
    }
}

pub fn searching_label(completed: usize, total: usize) -> String {
    format!("Searching: {completed}-{total}")
}

/// One progress cell per depth, written by a worker and read by the
/// interactive thread.
#[derive(Debug, Default)]
pub struct ProgressBoard {
    cells: Mutex<Vec<Option<DepthProgress>>>,
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, depth: usize, completed: usize, total: usize) {
        self.update_labeled(depth, completed, total, searching_label(completed, total));
    }

    pub fn update_labeled(&self, depth: usize, completed: usize, total: usize, label: String) {
        let mut cells = self.lock();
        if cells.len() <= depth {
            cells.resize(depth + 1, None);
        }
        cells[depth] = Some(DepthProgress {
            depth,
            completed,
            total,
            label,
        });
    }

    /// Drops the cell at `depth` and every deeper one.
    pub fn retire(&self, depth: usize) {
        self.lock().truncate(depth);
    }

    /// The `max_depths` deepest active cells, shallowest first.
    pub fn snapshot(&self, max_depths: usize) -> Vec<DepthProgress> {
        let cells = self.lock();
        let active: Vec<DepthProgress> = cells.iter().flatten().cloned().collect();
        let skip = active.len().saturating_sub(max_depths);
        active.into_iter().skip(skip).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Option<DepthProgress>>> {
        match self.cells.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Adapts one board cell to the provider's progress callback, forwarding
/// cancellation from the pass token.
pub(crate) struct BoardSink<'a> {
    pub(crate) board: &'a ProgressBoard,
    pub(crate) depth: usize,
    pub(crate) token: &'a CancellationToken,
}

impl ProgressSink for BoardSink<'_> {
    fn report(&self, completed: usize, total: usize, label: &str) {
        self.board
            .update_labeled(self.depth, completed, total, label.to_string());
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
