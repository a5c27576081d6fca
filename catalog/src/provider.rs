use crate::error::Result;
use crate::filter::MemberFilter;
use crate::node::CatalogNode;
use crate::sort::sort_nodes;
use crate::symbol::TypeRef;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Namespace key ordered the way every listing presents namespaces: the
/// synthetic global namespace first, then case-insensitive by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NamespaceKey {
    Global,
    Named(String),
}

impl NamespaceKey {
    pub fn from_namespace(namespace: Option<&str>) -> Self {
        match namespace {
            Some(name) if !name.is_empty() => Self::Named(name.to_string()),
            _ => Self::Global,
        }
    }

    pub fn as_namespace(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl Ord for NamespaceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Global, Self::Global) => Ordering::Equal,
            (Self::Global, Self::Named(_)) => Ordering::Less,
            (Self::Named(_), Self::Global) => Ordering::Greater,
            (Self::Named(a), Self::Named(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
        }
    }
}

impl PartialOrd for NamespaceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NamespaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("(global)"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

pub type NamespaceMap = BTreeMap<NamespaceKey, Vec<TypeRef>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamespaceOptions {
    pub include_global: bool,
    pub ignore_assembly_allowlist: bool,
}

/// What the host exposes to the picker: the namespaces in scope and whether
/// the global namespace participates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeContext {
    pub namespaces: Vec<String>,
    pub include_global: bool,
}

impl ScopeContext {
    pub fn everything() -> Self {
        Self {
            namespaces: Vec::new(),
            include_global: true,
        }
    }
}

/// Receives progress from long-running enumerations. `is_cancelled` lets
/// producers stop early; cancellation is never reported as an error.
pub trait ProgressSink: Send + Sync {
    fn report(&self, completed: usize, total: usize, label: &str);

    fn is_cancelled(&self) -> bool {
        false
    }
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _completed: usize, _total: usize, _label: &str) {}
}

/// Data source behind the picker. Every call returns a snapshot with no live
/// references into provider state. Implementations may be slow; the search
/// coordinator only calls them off the interactive thread.
pub trait CatalogProvider: Send + Sync {
    fn root_categories(&self, scope: &ScopeContext) -> Result<Vec<CatalogNode>>;

    /// Members of `ty`, sorted with constructors first.
    fn members_of(&self, ty: &TypeRef, filter: &MemberFilter) -> Result<Vec<CatalogNode>>;

    fn types_under_namespaces(
        &self,
        names: &[String],
        options: NamespaceOptions,
    ) -> Result<NamespaceMap>;

    /// Full sweep over every known type.
    fn all_types(&self, progress: &dyn ProgressSink) -> Result<NamespaceMap>;
}

/// One collapsed namespace node per map entry, holding its sorted types.
pub fn namespace_tree(map: NamespaceMap) -> Vec<CatalogNode> {
    map.into_iter()
        .map(|(key, types)| {
            let mut children: Vec<CatalogNode> =
                types.into_iter().map(CatalogNode::type_node).collect();
            sort_nodes(&mut children);
            CatalogNode::namespace(key).with_children(children)
        })
        .collect()
}
