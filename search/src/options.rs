use picker_matcher::RelevanceWeights;

/// Knobs of a search pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// List members of unexpanded types during a pass so a query can match
    /// inside them.
    pub deep_member_search: bool,
    /// Minimum number of matchable query characters before member listing
    /// kicks in.
    pub min_deep_search_len: usize,
    /// How many of the most recent depth cells `progress()` surfaces.
    pub max_progress_depths: usize,
    pub weights: RelevanceWeights,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            deep_member_search: true,
            min_deep_search_len: 3,
            max_progress_depths: 4,
            weights: RelevanceWeights::default(),
        }
    }
}
