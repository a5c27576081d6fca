/*!
# Picker Search

Cancellable background filtering of a catalog tree.

```text
UI thread                          worker thread
─────────                          ─────────────
start(snapshot, query) ──spawn──>  deep copy of Arc<Vec<CatalogNode>>
  │  (cancels previous pass)         │
  │                                  ├─> expanded SearchTrigger: run callback
  │                                  ├─> GroupedLazy: materialize
  │                                  ├─> Type: list members (deep search)
  │                                  └─> keep matches + ancestors, expand
  │                                  │
progress() <── ProgressBoard <───────┤ per-depth "Searching: i-n"
  │                                  │
poll() <────── delivery slot <───────┘ publish iff token live and
                                         generation still current
```

A pass owns its copy of the tree; the live tree is never mutated. The
[`CatalogLoader`] runs the one-shot all-types sweep on its own thread.
*/

mod coordinator;
mod error;
mod generation;
mod loader;
mod options;
mod pass;
mod progress;

pub use coordinator::Delivery;
pub use coordinator::SearchCoordinator;
pub use coordinator::SearchState;
pub use error::Result;
pub use error::SearchError;
pub use generation::SearchGeneration;
pub use loader::CatalogLoader;
pub use options::SearchOptions;
pub use progress::DepthProgress;
pub use progress::ProgressBoard;
pub use progress::searching_label;
