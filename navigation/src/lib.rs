/*!
# Picker Navigation

Drill-down through the catalog and resolution of the final reference.

```text
step_into(node) ──> steppable? ──> open generic? ──yes──> NeedsTypeArguments
                                       │                      │
                                       no       supply_type_argument (per parameter,
                                       │         checked against its TypeFilter)
                                       v                      │
                              DrillStack::push <──── closed ──┘
                                       │
select(node) ─────> selectable? ──> resolve(stack + node) ──> ResolvedReference
```
*/

mod error;
mod generics;
mod navigator;
mod resolve;
mod rules;
mod stack;

pub use error::NavigationError;
pub use error::Result;
pub use generics::ConstraintChoice;
pub use generics::Intent;
pub use generics::PendingResolution;
pub use generics::TypeArgumentRequest;
pub use generics::constraint_candidates;
pub use navigator::Navigator;
pub use navigator::StepOutcome;
pub use resolve::resolve;
pub use rules::exposes_members;
pub use rules::is_selectable;
pub use rules::is_steppable;
pub use stack::DrillStack;
