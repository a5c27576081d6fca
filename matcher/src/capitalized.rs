use crate::generic::MatchOutcome;
use crate::generic::RelevanceWeights;
use crate::text::fold;
use crate::text::is_delimiter;
use std::ops::Range;

/// Splits at uppercase letters. Each segment runs up to the next capital;
/// a leading lowercase run forms its own segment.
fn segments(chars: &[char]) -> Vec<Range<usize>> {
    let mut starts: Vec<usize> = vec![0];
    starts.extend((1..chars.len()).filter(|&idx| chars[idx].is_uppercase()));
    let mut ranges = Vec::with_capacity(starts.len());
    for (pos, &start) in starts.iter().enumerate() {
        let end = starts.get(pos + 1).copied().unwrap_or(chars.len());
        if start < end {
            ranges.push(start..end);
        }
    }
    ranges
}

fn has_prefix(segment: &[char], prefix: &[char]) -> bool {
    segment.len() >= prefix.len()
        && segment
            .iter()
            .zip(prefix)
            .all(|(a, b)| fold(*a) == fold(*b))
}

/// Every query segment, in order, must be a case-insensitive prefix of a
/// candidate segment at or after the previous hit. Delimiters in the query
/// are ignored.
pub fn capitalized_match(
    candidate: &str,
    query: &str,
    weights: &RelevanceWeights,
) -> Option<MatchOutcome> {
    let candidate: Vec<char> = candidate.chars().collect();
    let query: Vec<char> = query.chars().filter(|c| !is_delimiter(*c)).collect();
    if query.is_empty() {
        return Some(MatchOutcome::everything());
    }

    let candidate_segments = segments(&candidate);
    let mut cursor = 0;
    let mut indices = Vec::with_capacity(query.len());
    for wanted in segments(&query) {
        let prefix = &query[wanted];
        let (pos, hit) = candidate_segments
            .iter()
            .enumerate()
            .skip(cursor)
            .find(|(_, range)| has_prefix(&candidate[(*range).clone()], prefix))?;
        indices.extend(hit.start..hit.start + prefix.len());
        cursor = pos + 1;
    }

    let score = weights.combine(1.0, query.len(), candidate.len());
    (score > 0.0).then_some(MatchOutcome { score, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::Span;
    use crate::highlight::collapse;
    use pretty_assertions::assert_eq;

    fn spans(candidate: &str, query: &str) -> Option<Vec<Span>> {
        capitalized_match(candidate, query, &RelevanceWeights::default())
            .map(|outcome| collapse(&outcome.indices))
    }

    #[test]
    fn leading_lowercase_run_is_a_segment() {
        assert_eq!(
            spans("GetObject", "gOb"),
            Some(vec![Span::new(0, 1), Span::new(3, 2)])
        );
    }

    #[test]
    fn segments_may_be_skipped() {
        assert_eq!(
            spans("StringBuilderCache", "SBC"),
            Some(vec![Span::new(0, 1), Span::new(6, 1), Span::new(13, 1)])
        );
        assert_eq!(
            spans("StringBuilderCache", "StrCa"),
            Some(vec![Span::new(0, 3), Span::new(13, 2)])
        );
    }

    #[test]
    fn order_and_prefixes_are_enforced() {
        assert_eq!(spans("StringBuilder", "BuSt"), None);
        assert_eq!(spans("StringBuilder", "Bx"), None);
        assert_eq!(spans("GetObject", "Object"), Some(vec![Span::new(3, 6)]));
    }

    #[test]
    fn query_delimiters_are_ignored() {
        assert_eq!(
            spans("System.Int32", "Sys.Int"),
            Some(vec![Span::new(0, 3), Span::new(7, 3)])
        );
    }
}
