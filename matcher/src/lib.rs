/*!
# Picker Matcher

Approximate matching of catalog nodes against a picker query.

Two strategies are chosen per query:

- **Generic**: case-insensitive `Contains`, `StartsWith`, `Equals` and
  `EndsWith` tests, plus `Relevant`, a two-phase subsequence match (word
  boundaries and streaks first, any in-order placement second) scored in
  `0..=1`.
- **Capitalized segment**: used whenever the query contains an uppercase
  letter; query segments must prefix candidate segments in order
  (`gOb` → `GetObject`).

```text
SearchQuery ──> Matcher ──┬─> Generic / CapitalizedSegment ─> MatchOutcome
                          ├─> Owner.Member qualified queries
                          ├─> kind filter
                          └─> Foo[] array transform
                                   │
                                   v
                      NodeMatch { score, spans } ─> HighlightCache
```

All positions are in `char` units of the node's display name.
*/

mod capitalized;
mod generic;
mod highlight;
mod matcher;
mod query;
mod text;

pub use capitalized::capitalized_match;
pub use generic::MatchOutcome;
pub use generic::RelevanceWeights;
pub use generic::generic_match;
pub use highlight::HighlightCache;
pub use highlight::Span;
pub use highlight::collapse;
pub use matcher::Matcher;
pub use matcher::NodeMatch;
pub use matcher::array_node;
pub use query::MatchMode;
pub use query::SearchQuery;
pub use query::Strategy;
pub use text::is_word_boundary;
