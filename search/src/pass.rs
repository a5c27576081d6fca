use crate::options::SearchOptions;
use crate::progress::BoardSink;
use crate::progress::ProgressBoard;
use picker_catalog::CatalogNode;
use picker_catalog::CatalogProvider;
use picker_catalog::Children;
use picker_catalog::MemberFilter;
use picker_catalog::NodeKind;
use picker_catalog::TypeRef;
use picker_matcher::Matcher;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// `None` means the pass was cancelled and everything built so far is
/// dropped.
type Filtered<T> = Option<T>;

/// One filtering walk over an owned copy of the catalog tree.
///
/// A node survives when it is a search trigger, when any of its children
/// survive, or when it matches on its own. Surviving containers are forced
/// expanded. The walk checks the token before every node.
pub(crate) struct SearchPass<'a> {
    pub(crate) matcher: &'a Matcher,
    pub(crate) provider: &'a dyn CatalogProvider,
    pub(crate) options: &'a SearchOptions,
    pub(crate) token: &'a CancellationToken,
    pub(crate) progress: &'a ProgressBoard,
}

impl SearchPass<'_> {
    pub(crate) fn run(&self, roots: Vec<CatalogNode>) -> Filtered<Vec<CatalogNode>> {
        let kept = self.filter_level(roots, 0)?;
        self.progress.retire(0);
        Some(kept)
    }

    fn filter_level(&self, nodes: Vec<CatalogNode>, level: usize) -> Filtered<Vec<CatalogNode>> {
        let total = nodes.len();
        let mut kept = Vec::new();
        for (idx, node) in nodes.into_iter().enumerate() {
            if self.token.is_cancelled() {
                return None;
            }
            self.progress.update(level, idx, total);
            if let Some(node) = self.filter_node(node, level)? {
                kept.push(node);
            }
        }
        self.progress.update(level, total, total);
        self.progress.retire(level + 1);
        Some(kept)
    }

    fn filter_node(&self, node: CatalogNode, level: usize) -> Filtered<Option<CatalogNode>> {
        let Some(mut node) = self.matcher.prepare_leaf(node) else {
            return Some(None);
        };
        match &node.kind {
            NodeKind::SearchTrigger(trigger) => {
                if !node.is_expanded() {
                    return Some(Some(node));
                }
                let sink = BoardSink {
                    board: self.progress,
                    depth: level + 1,
                    token: self.token,
                };
                let produced = trigger.produce(&sink).unwrap_or_else(|err| {
                    warn!("search trigger {} failed: {err}", node.display_name);
                    Vec::new()
                });
                if self.token.is_cancelled() {
                    return None;
                }
                let kept = self.filter_level(produced, level + 1)?;
                Some(Some(with_kept_children(node, kept)))
            }
            NodeKind::GroupedLazy(group) => {
                let group = group.clone();
                let mut children = node.take_children();
                if children.all().is_empty() {
                    let produced = group.produce().unwrap_or_else(|err| {
                        warn!("lazy group {} failed: {err}", node.display_name);
                        Vec::new()
                    });
                    children = Children::Collapsed(produced);
                }
                self.filter_container(node, children, level)
            }
            NodeKind::Category | NodeKind::Namespace(_) => {
                let children = node.take_children();
                self.filter_container(node, children, level)
            }
            NodeKind::Type(ty) => {
                let matched = self.matcher.match_node(&node).is_some();
                if self.searches_members() {
                    let members = self.members_of(ty);
                    let kept = self.filter_level(members, level + 1)?;
                    if !kept.is_empty() {
                        return Some(Some(with_kept_children(node, kept)));
                    }
                }
                Some(matched.then_some(node))
            }
            NodeKind::Member(_) | NodeKind::CustomAction(_) | NodeKind::MemberAlias(_) => {
                Some(self.matcher.match_node(&node).is_some().then_some(node))
            }
        }
    }

    fn filter_container(
        &self,
        mut node: CatalogNode,
        children: Children,
        level: usize,
    ) -> Filtered<Option<CatalogNode>> {
        if self.matcher.match_node(&node).is_some() {
            node.set_children(Children::Expanded(children.into_vec()));
            return Some(Some(node));
        }
        let kept = self.filter_level(children.into_vec(), level + 1)?;
        if kept.is_empty() {
            return Some(None);
        }
        Some(Some(with_kept_children(node, kept)))
    }

    fn searches_members(&self) -> bool {
        let query = self.matcher.query();
        self.options.deep_member_search
            && !query.array_suffixed
            && query.char_len() >= self.options.min_deep_search_len
    }

    fn members_of(&self, ty: &TypeRef) -> Vec<CatalogNode> {
        let filter = MemberFilter {
            kind_filter: self.matcher.query().kind_filter,
            ..MemberFilter::default()
        };
        self.provider.members_of(ty, &filter).unwrap_or_else(|err| {
            warn!("member listing for {} failed: {err}", ty.full_name());
            Vec::new()
        })
    }
}

fn with_kept_children(mut node: CatalogNode, mut kept: Vec<CatalogNode>) -> CatalogNode {
    for child in &mut kept {
        child.assign_depths(node.depth + 1);
    }
    node.set_children(Children::Expanded(kept));
    node
}
