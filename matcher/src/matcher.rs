use crate::capitalized::capitalized_match;
use crate::generic::MatchOutcome;
use crate::generic::RelevanceWeights;
use crate::generic::generic_match;
use crate::highlight::Span;
use crate::highlight::clipped_to_suffix;
use crate::highlight::collapse;
use crate::highlight::shifted;
use crate::query::SearchQuery;
use crate::query::Strategy;
use crate::text::char_offset;
use picker_catalog::AliasTarget;
use picker_catalog::CatalogNode;
use picker_catalog::KindFilter;
use picker_catalog::MemberKind;
use picker_catalog::MemberRef;
use picker_catalog::NodeKind;
use picker_catalog::TypeRef;
use picker_catalog::TypeSymbol;

const CONSTRUCTOR_KEYWORD: &str = "new";

/// Score and display-name highlight of a node that matched.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMatch {
    pub score: f32,
    pub spans: Vec<Span>,
}

/// Matches catalog nodes against one query. Cheap to clone and safe to move
/// onto a search worker.
#[derive(Debug, Clone)]
pub struct Matcher {
    query: SearchQuery,
    weights: RelevanceWeights,
    strategy: Strategy,
}

impl Matcher {
    pub fn new(query: SearchQuery, weights: RelevanceWeights) -> Self {
        let strategy = query.strategy();
        Self {
            query,
            weights,
            strategy,
        }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Runs the active strategy and mode on plain text.
    pub fn match_text(&self, candidate: &str, text: &str) -> Option<MatchOutcome> {
        match self.strategy {
            Strategy::Generic => generic_match(candidate, text, self.query.match_mode, &self.weights),
            Strategy::CapitalizedSegment => capitalized_match(candidate, text, &self.weights),
        }
    }

    /// Whether the kind filter lets this node take part in matching.
    pub fn accepts_kind(&self, kind: &NodeKind) -> bool {
        let filter = self.query.kind_filter;
        match kind {
            NodeKind::Category
            | NodeKind::Namespace(_)
            | NodeKind::GroupedLazy(_)
            | NodeKind::SearchTrigger(_)
            | NodeKind::CustomAction(_) => filter == KindFilter::All,
            NodeKind::Type(_) => filter.accepts_types(),
            NodeKind::Member(member) => filter.accepts_member(member.symbol.kind),
            NodeKind::MemberAlias(alias) => match filter {
                KindFilter::All => true,
                KindFilter::Function => matches!(alias.target, AliasTarget::Function),
                KindFilter::Variable => {
                    matches!(alias.target, AliasTarget::Variable | AliasTarget::Parameter)
                }
                KindFilter::Property | KindFilter::Type => false,
            },
        }
    }

    /// Independent verdict for one node, ignoring its children.
    pub fn match_node(&self, node: &CatalogNode) -> Option<NodeMatch> {
        if !self.accepts_kind(&node.kind) {
            return None;
        }
        if self.query.array_suffixed {
            return self.match_array_candidate(node);
        }
        if self.query.is_empty() {
            return Some(NodeMatch {
                score: 1.0,
                spans: Vec::new(),
            });
        }
        match &node.kind {
            NodeKind::Member(member) if self.query.is_qualified() => {
                self.match_qualified_member(node, member)
            }
            NodeKind::Type(ty) if self.query.is_qualified() => self.match_full_name(node, ty),
            _ => {
                let text = node.match_text();
                let outcome = self.match_text(&text, &self.query.text())?;
                Some(self.located(node, &text, outcome))
            }
        }
    }

    /// Display-name spans for `node`, empty when it does not match.
    pub fn highlight(&self, node: &CatalogNode) -> Vec<Span> {
        self.match_node(node).map(|m| m.spans).unwrap_or_default()
    }

    /// Type leaves of an array-suffixed query are replaced by their array
    /// type; leaves that cannot take part are dropped. Containers pass
    /// through untouched.
    pub fn prepare_leaf(&self, node: CatalogNode) -> Option<CatalogNode> {
        if !self.query.array_suffixed || node.is_container() {
            return Some(node);
        }
        array_node(&node)
    }

    fn match_array_candidate(&self, node: &CatalogNode) -> Option<NodeMatch> {
        let NodeKind::Type(ty) = &node.kind else {
            return None;
        };
        let element = ty.element.as_ref()?;
        if self.query.is_empty() {
            return Some(NodeMatch {
                score: 1.0,
                spans: Vec::new(),
            });
        }
        if self.query.is_qualified() {
            let full_name = element.full_name();
            let outcome = self.match_text(&full_name, &self.query.text())?;
            let spans = clipped_to_suffix(
                collapse(&outcome.indices),
                full_name.chars().count(),
                element.display_name().chars().count(),
            );
            return Some(NodeMatch {
                score: outcome.score,
                spans,
            });
        }
        let outcome = self.match_text(&element.name, &self.query.text())?;
        Some(NodeMatch {
            score: outcome.score,
            spans: collapse(&outcome.indices),
        })
    }

    /// `Owner.Member`: the first segment against the owner, the rest against
    /// the member. Falls back to the whole query against the member alone.
    fn match_qualified_member(&self, node: &CatalogNode, member: &MemberRef) -> Option<NodeMatch> {
        let symbol = &member.symbol;
        let member_name = symbol.match_name();
        let segments = &self.query.segments;
        let head = segments[0].as_str();
        let tail = segments[1..].concat();

        let via_keyword = symbol.kind == MemberKind::Constructor
            && CONSTRUCTOR_KEYWORD.starts_with(head.to_lowercase().as_str());
        let owner_matches = via_keyword
            || self.match_text(&symbol.declaring_type.name, head).is_some()
            || self.match_text(&member.reflected_type.name, head).is_some();

        if owner_matches && let Some(outcome) = self.match_text(member_name, &tail) {
            let mut found = self.located(node, member_name, outcome);
            if via_keyword && node.display_name.starts_with(CONSTRUCTOR_KEYWORD) {
                found.spans.insert(0, Span::new(0, head.chars().count()));
            }
            return Some(found);
        }

        let outcome = self.match_text(member_name, &self.query.concatenated())?;
        Some(self.located(node, member_name, outcome))
    }

    fn match_full_name(&self, node: &CatalogNode, ty: &TypeRef) -> Option<NodeMatch> {
        let full_name = ty.full_name();
        let outcome = self.match_text(&full_name, &self.query.text())?;
        let spans = clipped_to_suffix(
            collapse(&outcome.indices),
            full_name.chars().count(),
            node.display_name.chars().count(),
        );
        Some(NodeMatch {
            score: outcome.score,
            spans,
        })
    }

    /// Moves spans computed on `text` into display-name coordinates.
    fn located(&self, node: &CatalogNode, text: &str, outcome: MatchOutcome) -> NodeMatch {
        let spans = char_offset(&node.display_name, text)
            .map(|offset| shifted(collapse(&outcome.indices), offset))
            .unwrap_or_default();
        NodeMatch {
            score: outcome.score,
            spans,
        }
    }
}

/// The array-typed counterpart of a type node, or `None` for anything that
/// cannot become an array.
pub fn array_node(node: &CatalogNode) -> Option<CatalogNode> {
    let NodeKind::Type(ty) = &node.kind else {
        return None;
    };
    let array = TypeSymbol::array_of(ty)?;
    let mut transformed = CatalogNode::type_node(array);
    transformed.depth = node.depth;
    Some(transformed)
}
