use picker_catalog::NodeId;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

/// Highlighted run of a display name, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Collapses ascending matched indices into contiguous spans.
pub fn collapse(indices: &[usize]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for &idx in indices {
        match spans.last_mut() {
            Some(span) if span.end() == idx => span.len += 1,
            _ => spans.push(Span::new(idx, 1)),
        }
    }
    spans
}

/// Moves spans computed on a substring into the coordinates of the full
/// text, where the substring starts at `offset`.
pub fn shifted(spans: Vec<Span>, offset: usize) -> Vec<Span> {
    spans
        .into_iter()
        .map(|span| Span::new(span.start + offset, span.len))
        .collect()
}

/// Re-bases spans computed on a longer text whose last `visible_len` chars
/// are the display name. Parts before the visible window are dropped.
pub fn clipped_to_suffix(spans: Vec<Span>, text_len: usize, visible_len: usize) -> Vec<Span> {
    let hidden = text_len.saturating_sub(visible_len);
    spans
        .into_iter()
        .filter(|span| span.end() > hidden)
        .map(|span| {
            let start = span.start.max(hidden);
            Span::new(start - hidden, span.end() - start)
        })
        .collect()
}

/// Per-node highlight spans for one query string. Entries are computed on
/// first request and dropped wholesale when the query text changes.
#[derive(Debug, Default)]
pub struct HighlightCache {
    query: String,
    spans: HashMap<NodeId, Vec<Span>>,
}

impl HighlightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns `true` when `query` differs from the cached one and the cache
    /// was cleared.
    pub fn sync_query(&mut self, query: &str) -> bool {
        if self.query == query {
            return false;
        }
        self.query = query.to_string();
        self.spans.clear();
        true
    }

    pub fn get(&self, id: NodeId) -> Option<&[Span]> {
        self.spans.get(&id).map(Vec::as_slice)
    }

    pub fn get_or_compute<F>(&mut self, id: NodeId, compute: F) -> &[Span]
    where
        F: FnOnce() -> Vec<Span>,
    {
        self.spans.entry(id).or_insert_with(compute)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn consecutive_indices_collapse() {
        assert_eq!(
            collapse(&[0, 3, 4, 7]),
            vec![Span::new(0, 1), Span::new(3, 2), Span::new(7, 1)]
        );
        assert!(collapse(&[]).is_empty());
    }

    #[test]
    fn clipping_drops_hidden_prefix() {
        // "System.Int32" displayed as "Int32"
        let spans = vec![Span::new(0, 3), Span::new(6, 3)];
        assert_eq!(clipped_to_suffix(spans, 12, 5), vec![Span::new(0, 2)]);
    }

    #[test]
    fn cache_resets_when_query_changes() {
        let mut cache = HighlightCache::new();
        let id = NodeId(7);
        assert!(cache.sync_query("str"));
        let spans = cache.get_or_compute(id, || vec![Span::new(0, 3)]).to_vec();
        assert_eq!(spans, vec![Span::new(0, 3)]);

        let mut recomputed = false;
        cache.get_or_compute(id, || {
            recomputed = true;
            Vec::new()
        });
        assert!(!recomputed);

        assert!(!cache.sync_query("str"));
        assert_eq!(cache.len(), 1);
        assert!(cache.sync_query("strb"));
        assert!(cache.is_empty());
    }
}
