use picker_catalog::CatalogNode;
use picker_catalog::NodeId;
use picker_matcher::HighlightCache;
use std::collections::HashMap;

/// Per-session memo that outlives individual tree snapshots.
#[derive(Debug, Default)]
pub struct SessionState {
    expanded: HashMap<NodeId, bool>,
    pub highlights: HighlightCache,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember_expanded(&mut self, id: NodeId, expanded: bool) {
        self.expanded.insert(id, expanded);
    }

    pub fn expanded(&self, id: NodeId) -> Option<bool> {
        self.expanded.get(&id).copied()
    }

    /// Re-applies remembered expand state to a freshly built tree.
    pub fn restore_expanded(&self, nodes: &mut [CatalogNode]) {
        if self.expanded.is_empty() {
            return;
        }
        for node in nodes {
            if let Some(expanded) = self.expanded(node.id) {
                node.toggle_expanded(expanded);
            }
            self.restore_expanded(node.children_mut());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expand_state_survives_rebuilds() {
        let build = || {
            vec![
                CatalogNode::category("Engine")
                    .with_children(vec![CatalogNode::category("Rendering").with_children(Vec::new())]),
            ]
        };
        let mut state = SessionState::new();
        let mut first = build();
        first[0].toggle_expanded(true);
        state.remember_expanded(first[0].id, true);
        let inner = first[0].visible_children()[0].id;
        state.remember_expanded(inner, true);

        let mut rebuilt = build();
        state.restore_expanded(&mut rebuilt);
        assert!(rebuilt[0].is_expanded());
        assert!(rebuilt[0].visible_children()[0].is_expanded());
        assert_eq!(state.expanded(NodeId(42)), None);
    }
}
