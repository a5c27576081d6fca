/*!
# Picker Session

The control surface a front end drives: one [`PickerSession`] per open
picker, reporting through a [`PickerSink`].

```text
open(provider, config, sink)
  │
  ├─> root_categories ──> live tree ──> sink.on_filtered_tree_ready
  ├─> CatalogLoader (background all-types sweep, optional)
  │
set_query / set_match_mode / set_kind_filter
  │
  └─> SearchCoordinator::start ──> pump()/wait() ──> sink.on_progress
                                                └─> sink.on_filtered_tree_ready
step_into / back ──> Navigator ──> new scope tree (expansion memo restored)
select ──────────> Navigator ──> sink.on_resolved ──> closed
close ───────────────────────────> sink.on_cancelled ──> closed
```
*/

mod config;
mod error;
mod session;
mod sink;
mod state;

pub use config::PickerConfig;
pub use config::ScopeConfig;
pub use config::SelectionConfig;
pub use error::PickerError;
pub use error::Result;
pub use session::PickerSession;
pub use sink::CollectingSink;
pub use sink::PickerSink;
pub use sink::SinkEvent;
pub use state::SessionState;
