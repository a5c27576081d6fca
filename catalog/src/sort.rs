use crate::node::CatalogNode;
use crate::node::NodeKind;
use crate::provider::NamespaceKey;
use crate::symbol::MemberKind;
use std::cmp::Ordering;

fn rank(node: &CatalogNode) -> u8 {
    match &node.kind {
        NodeKind::Namespace(NamespaceKey::Global) => 0,
        NodeKind::Member(member) if member.symbol.kind == MemberKind::Constructor => 1,
        _ => 2,
    }
}

pub fn compare_nodes(a: &CatalogNode, b: &CatalogNode) -> Ordering {
    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.display_name.to_lowercase().cmp(&b.display_name.to_lowercase()))
        .then_with(|| a.display_name.cmp(&b.display_name))
}

/// Case-insensitive by display name; the global namespace and constructors
/// lead their lists.
pub fn sort_nodes(nodes: &mut [CatalogNode]) {
    nodes.sort_by(compare_nodes);
}
