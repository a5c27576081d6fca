use picker_catalog::CatalogNode;

/// Nodes stepped into so far, oldest first. Entries are stored without
/// their children; only the node payload matters for resolution.
#[derive(Debug, Clone, Default)]
pub struct DrillStack {
    entries: Vec<CatalogNode>,
}

impl DrillStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mut node: CatalogNode) {
        drop(node.take_children());
        node.depth = self.entries.len() as i32;
        self.entries.push(node);
    }

    pub fn pop(&mut self) -> Option<CatalogNode> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn top(&self) -> Option<&CatalogNode> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[CatalogNode] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn breadcrumb(&self) -> Vec<String> {
        self.entries.iter().map(|node| node.display_name.clone()).collect()
    }
}
