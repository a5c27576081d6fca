use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Monotonic pass counter. Every started or cancelled pass bumps it; a
/// worker may only publish while its own id is still current.
#[derive(Debug, Default)]
pub struct SearchGeneration {
    current: AtomicU64,
}

impl SearchGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.current.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn is_current(&self, id: u64) -> bool {
        self.current() == id
    }
}
