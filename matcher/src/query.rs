use picker_catalog::KindFilter;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

const ARRAY_SUFFIX: &str = "[]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Contains,
    StartsWith,
    Equals,
    EndsWith,
    /// Ranked subsequence matching.
    #[default]
    Relevant,
}

impl MatchMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "contains" | "substring" => Some(Self::Contains),
            "starts_with" | "startswith" | "prefix" => Some(Self::StartsWith),
            "equals" | "exact" => Some(Self::Equals),
            "ends_with" | "endswith" | "suffix" => Some(Self::EndsWith),
            "relevant" | "fuzzy" => Some(Self::Relevant),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::Equals => "equals",
            Self::EndsWith => "ends_with",
            Self::Relevant => "relevant",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which matching algorithm a query runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Generic,
    /// PascalCase/camelCase segment prefixes; picked whenever the query
    /// contains an uppercase character.
    CapitalizedSegment,
}

impl Strategy {
    pub fn for_query(raw: &str) -> Self {
        if raw.chars().any(char::is_uppercase) {
            Self::CapitalizedSegment
        } else {
            Self::Generic
        }
    }
}

/// A parsed picker query.
///
/// The raw text is split on `.` and whitespace into segments so that
/// `Type.Member` queries can be matched against the owner and the member
/// separately. A `[]` closing the first segment or the whole query is
/// stripped and recorded in `array_suffixed`, so `Foo[].Len` and `Foo[]`
/// both ask for arrays of `Foo`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    pub raw: String,
    pub segments: Vec<String>,
    pub array_suffixed: bool,
    pub match_mode: MatchMode,
    pub kind_filter: KindFilter,
}

impl SearchQuery {
    pub fn new(raw: impl Into<String>, match_mode: MatchMode, kind_filter: KindFilter) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        let (body, mut array_suffixed) = match trimmed.strip_suffix(ARRAY_SUFFIX) {
            Some(body) => (body, true),
            None => (trimmed, false),
        };
        let mut segments: Vec<String> = body
            .split(|c: char| c == '.' || c.is_whitespace())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if let Some(first) = segments.first_mut()
            && let Some(stem) = first.strip_suffix(ARRAY_SUFFIX)
        {
            *first = stem.to_string();
            array_suffixed = true;
        }
        segments.retain(|segment| !segment.is_empty());
        Self {
            raw,
            segments,
            array_suffixed,
            match_mode,
            kind_filter,
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self::new(raw, MatchMode::default(), KindFilter::default())
    }

    /// No text to match. An array-suffixed query with no text still
    /// filters, keeping every type that can become an array.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_qualified(&self) -> bool {
        self.segments.len() >= 2
    }

    pub fn strategy(&self) -> Strategy {
        Strategy::for_query(&self.raw)
    }

    /// Segments rejoined with `.`; what unqualified candidates and full
    /// names are matched against.
    pub fn text(&self) -> String {
        self.segments.join(".")
    }

    /// Segments concatenated without separators.
    pub fn concatenated(&self) -> String {
        self.segments.concat()
    }

    /// Number of characters that take part in matching.
    pub fn char_len(&self) -> usize {
        self.segments
            .iter()
            .flat_map(|segment| segment.chars())
            .filter(|c| c.is_alphanumeric())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_dots_and_whitespace() {
        let query = SearchQuery::parse("  Int32.Parse  ");
        assert_eq!(query.segments, vec!["Int32", "Parse"]);
        assert!(query.is_qualified());
        assert_eq!(query.text(), "Int32.Parse");
        assert_eq!(query.concatenated(), "Int32Parse");

        let spaced = SearchQuery::parse("new  StringBuilder");
        assert_eq!(spaced.segments, vec!["new", "StringBuilder"]);
    }

    #[test]
    fn array_suffix_is_stripped() {
        let query = SearchQuery::parse("int32[]");
        assert!(query.array_suffixed);
        assert_eq!(query.segments, vec!["int32"]);

        let bare = SearchQuery::parse("[]");
        assert!(bare.array_suffixed);
        assert!(bare.is_empty());
    }

    #[test]
    fn array_suffix_on_the_first_segment_is_stripped() {
        let query = SearchQuery::parse("Foo[].Len");
        assert!(query.array_suffixed);
        assert_eq!(query.segments, vec!["Foo", "Len"]);
        assert_eq!(query.text(), "Foo.Len");

        let spaced = SearchQuery::parse("[] Len");
        assert!(spaced.array_suffixed);
        assert_eq!(spaced.segments, vec!["Len"]);

        let inner = SearchQuery::parse("Foo.Bar[].Len");
        assert!(!inner.array_suffixed);
        assert_eq!(inner.segments, vec!["Foo", "Bar[]", "Len"]);
    }

    #[test]
    fn strategy_follows_case() {
        assert_eq!(SearchQuery::parse("strb").strategy(), Strategy::Generic);
        assert_eq!(SearchQuery::parse("gOb").strategy(), Strategy::CapitalizedSegment);
    }

    #[test]
    fn match_modes_parse_aliases() {
        assert_eq!(MatchMode::parse("Prefix"), Some(MatchMode::StartsWith));
        assert_eq!(MatchMode::parse("fuzzy"), Some(MatchMode::Relevant));
        assert_eq!(MatchMode::parse("bogus"), None);
        assert_eq!(MatchMode::EndsWith.to_string(), "ends_with");
    }
}
