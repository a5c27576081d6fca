use crate::query::MatchMode;
use crate::text::fold;
use crate::text::folded;
use crate::text::is_delimiter;
use crate::text::is_word_boundary;
use serde::Deserialize;
use serde::Serialize;

/// Weights of the relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceWeights {
    /// Credit for a character placed on a streak or a word boundary.
    #[serde(default = "default_strict")]
    pub strict: f32,
    /// Credit for a character only found by the relaxed pass.
    #[serde(default = "default_loose")]
    pub loose: f32,
    /// Weight of `query_len / candidate_len` in the final average.
    #[serde(default = "default_shortness")]
    pub shortness: f32,
}

fn default_strict() -> f32 {
    1.0
}

fn default_loose() -> f32 {
    0.25
}

fn default_shortness() -> f32 {
    1.0
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            loose: default_loose(),
            shortness: default_shortness(),
        }
    }
}

impl RelevanceWeights {
    pub fn validate(&self) -> Result<(), String> {
        if self.strict <= 0.0 {
            return Err("strict weight must be positive".to_string());
        }
        if self.loose < 0.0 || self.loose > self.strict {
            return Err("loose weight must be between 0 and the strict weight".to_string());
        }
        if self.shortness < 0.0 {
            return Err("shortness weight must not be negative".to_string());
        }
        Ok(())
    }

    /// Weighted average of the placement score and the shortness factor,
    /// normalised to `0..=1`.
    pub fn combine(&self, match_score: f32, query_len: usize, candidate_len: usize) -> f32 {
        let shortness = if candidate_len == 0 {
            0.0
        } else {
            (query_len as f32 / candidate_len as f32).min(1.0)
        };
        ((match_score + shortness * self.shortness) / (1.0 + self.shortness)).clamp(0.0, 1.0)
    }
}

/// Verdict of a successful match. `indices` are the matched candidate
/// positions in chars, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub score: f32,
    pub indices: Vec<usize>,
}

impl MatchOutcome {
    pub(crate) fn everything() -> Self {
        Self {
            score: 1.0,
            indices: Vec::new(),
        }
    }
}

pub fn generic_match(
    candidate: &str,
    query: &str,
    mode: MatchMode,
    weights: &RelevanceWeights,
) -> Option<MatchOutcome> {
    let candidate: Vec<char> = candidate.chars().collect();
    let query: Vec<char> = query.chars().collect();
    if query.is_empty() {
        return Some(MatchOutcome::everything());
    }
    if mode == MatchMode::Relevant {
        return relevant(&candidate, &query, weights);
    }

    let haystack = folded(&candidate);
    let needle = folded(&query);
    if needle.len() > haystack.len() {
        return None;
    }
    let start = match mode {
        MatchMode::Equals => (haystack == needle).then_some(0),
        MatchMode::StartsWith => haystack.starts_with(&needle).then_some(0),
        MatchMode::EndsWith => haystack
            .ends_with(&needle)
            .then_some(haystack.len() - needle.len()),
        MatchMode::Contains => haystack
            .windows(needle.len())
            .position(|window| window == needle.as_slice()),
        MatchMode::Relevant => None,
    }?;
    Some(MatchOutcome {
        score: weights.combine(1.0, needle.len(), haystack.len()),
        indices: (start..start + needle.len()).collect(),
    })
}

struct Placement {
    index: usize,
    strict: bool,
}

fn relevant(candidate: &[char], query: &[char], weights: &RelevanceWeights) -> Option<MatchOutcome> {
    let wanted: Vec<char> = query
        .iter()
        .copied()
        .filter(|c| !is_delimiter(*c))
        .map(fold)
        .collect();
    if wanted.is_empty() {
        return Some(MatchOutcome::everything());
    }
    let haystack = folded(candidate);
    let placements =
        place(candidate, &haystack, &wanted, true).or_else(|| place(candidate, &haystack, &wanted, false))?;

    let earned: f32 = placements
        .iter()
        .map(|p| if p.strict { weights.strict } else { weights.loose })
        .sum();
    let match_score = earned / (wanted.len() as f32 * weights.strict);
    let score = weights.combine(match_score, wanted.len(), candidate.len());
    if score <= 0.0 {
        return None;
    }
    Some(MatchOutcome {
        score,
        indices: placements.into_iter().map(|p| p.index).collect(),
    })
}

/// Places every wanted char on the next matching candidate char, in order.
/// With `strict_only` a char may only land right after the previous one or
/// on a word boundary.
fn place(
    candidate: &[char],
    haystack: &[char],
    wanted: &[char],
    strict_only: bool,
) -> Option<Vec<Placement>> {
    let mut placements: Vec<Placement> = Vec::with_capacity(wanted.len());
    let mut cursor = 0;
    for &target in wanted {
        let previous = placements.last().map(|p| p.index);
        let placement = (cursor..haystack.len())
            .filter(|&idx| haystack[idx] == target)
            .map(|idx| Placement {
                index: idx,
                strict: previous.is_some_and(|prev| prev + 1 == idx)
                    || is_word_boundary(candidate, idx),
            })
            .find(|p| p.strict || !strict_only)?;
        cursor = placement.index + 1;
        placements.push(placement);
    }
    Some(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::Span;
    use crate::highlight::collapse;
    use pretty_assertions::assert_eq;

    fn relevant_match(candidate: &str, query: &str) -> Option<MatchOutcome> {
        generic_match(candidate, query, MatchMode::Relevant, &RelevanceWeights::default())
    }

    #[test]
    fn word_boundaries_win_over_earlier_occurrences() {
        let outcome = relevant_match("GetObject", "gob").unwrap();
        assert_eq!(outcome.indices, vec![0, 3, 4]);
        assert_eq!(collapse(&outcome.indices), vec![Span::new(0, 1), Span::new(3, 2)]);
        assert!(outcome.score > 0.0);
    }

    #[test]
    fn missing_characters_fail() {
        assert!(relevant_match("GetObject", "xyz").is_none());
        assert!(relevant_match("GetObject", "tcejbo").is_none());
    }

    #[test]
    fn loose_matches_score_lower_than_strict() {
        assert!(relevant_match("Substring", "strb").is_none());

        let loose = relevant_match("Restore", "sr").unwrap();
        let tight = relevant_match("StrRead", "sr").unwrap();
        assert!(loose.score > 0.0);
        assert!(loose.score < tight.score);
    }

    #[test]
    fn delimiters_in_the_query_are_skipped() {
        let outcome = relevant_match("get_value", "get.va").unwrap();
        assert_eq!(collapse(&outcome.indices), vec![Span::new(0, 3), Span::new(4, 2)]);
    }

    #[test]
    fn exact_mode_checks_are_case_insensitive() {
        let weights = RelevanceWeights::default();
        let contains = generic_match("StringBuilder", "build", MatchMode::Contains, &weights).unwrap();
        assert_eq!(contains.indices, vec![6, 7, 8, 9, 10]);
        assert!(generic_match("StringBuilder", "STRING", MatchMode::StartsWith, &weights).is_some());
        assert!(generic_match("StringBuilder", "string", MatchMode::EndsWith, &weights).is_none());
        let ends = generic_match("StringBuilder", "der", MatchMode::EndsWith, &weights).unwrap();
        assert_eq!(ends.indices, vec![10, 11, 12]);
        let equals = generic_match("int32", "Int32", MatchMode::Equals, &weights).unwrap();
        assert_eq!(equals.score, 1.0);
        assert!(generic_match("Int32", "Int", MatchMode::Equals, &weights).is_none());
    }

    #[test]
    fn shorter_candidates_rank_higher() {
        let short = relevant_match("Parse", "parse").unwrap();
        let long = relevant_match("ParseExact", "parse").unwrap();
        assert!(short.score > long.score);
        assert_eq!(short.score, 1.0);
    }

    #[test]
    fn weights_validate() {
        assert!(RelevanceWeights::default().validate().is_ok());
        let bad = RelevanceWeights {
            loose: 2.0,
            ..RelevanceWeights::default()
        };
        assert!(bad.validate().is_err());
    }
}
