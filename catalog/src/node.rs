use crate::error::Result;
use crate::filter::SelectionFilter;
use crate::id::NodeId;
use crate::provider::NamespaceKey;
use crate::provider::ProgressSink;
use crate::reference::ResolvedReference;
use crate::symbol::MemberSymbol;
use crate::symbol::TypeRef;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Child list of a node. Collapsing parks the subtree instead of dropping it,
/// so a collapsed category still owns every descendant for search.
#[derive(Debug, Clone)]
pub enum Children {
    Expanded(Vec<CatalogNode>),
    Collapsed(Vec<CatalogNode>),
}

impl Default for Children {
    fn default() -> Self {
        Self::Collapsed(Vec::new())
    }
}

impl Children {
    pub fn all(&self) -> &[CatalogNode] {
        match self {
            Self::Expanded(nodes) | Self::Collapsed(nodes) => nodes,
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self, Self::Expanded(_))
    }

    pub fn all_mut(&mut self) -> &mut Vec<CatalogNode> {
        match self {
            Self::Expanded(nodes) | Self::Collapsed(nodes) => nodes,
        }
    }

    pub fn into_vec(self) -> Vec<CatalogNode> {
        match self {
            Self::Expanded(nodes) | Self::Collapsed(nodes) => nodes,
        }
    }
}

/// A reflected member as listed under a particular owner. `reflected_type`
/// is the type the member was enumerated from, which differs from
/// `symbol.declaring_type` for inherited members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub symbol: Arc<MemberSymbol>,
    pub reflected_type: TypeRef,
}

impl MemberRef {
    pub fn new(symbol: Arc<MemberSymbol>, reflected_type: TypeRef) -> Self {
        Self {
            symbol,
            reflected_type,
        }
    }

    pub fn declared(symbol: Arc<MemberSymbol>) -> Self {
        let reflected_type = symbol.declaring_type.clone();
        Self {
            symbol,
            reflected_type,
        }
    }
}

pub type ActionPredicate = dyn Fn(&SelectionFilter) -> bool + Send + Sync;

/// A non-reflected entry contributed by the host, e.g. "Create variable".
#[derive(Clone)]
pub struct CustomAction {
    pub key: String,
    pub label: String,
    pub steppable: bool,
    pub value_type: Option<TypeRef>,
    predicate: Option<Arc<ActionPredicate>>,
}

impl CustomAction {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            steppable: false,
            value_type: None,
            predicate: None,
        }
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SelectionFilter) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn steppable_into(mut self, value_type: TypeRef) -> Self {
        self.steppable = true;
        self.value_type = Some(value_type);
        self
    }

    pub fn is_selectable(&self, filter: &SelectionFilter) -> bool {
        self.predicate.as_ref().is_none_or(|predicate| predicate(filter))
    }
}

impl fmt::Debug for CustomAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAction")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("steppable", &self.steppable)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Domain object a [`AliasSymbol`] stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    Variable,
    Function,
    Parameter,
    /// A bound port of the consuming graph node.
    Port,
    /// A literal value; the payload is its textual form.
    ValueConstant(String),
    /// A reference resolved by an earlier drill session.
    Composite(ResolvedReference),
}

impl AliasTarget {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::Function => "function",
            Self::Parameter => "parameter",
            Self::Port => "port",
            Self::ValueConstant(_) => "value",
            Self::Composite(_) => "composite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSymbol {
    pub name: String,
    pub target: AliasTarget,
    pub value_type: Option<TypeRef>,
    pub steppable: bool,
}

impl AliasSymbol {
    pub fn new(name: impl Into<String>, target: AliasTarget, value_type: Option<TypeRef>) -> Self {
        let steppable = value_type.as_ref().is_some_and(|ty| !ty.is_void() && !ty.is_enum());
        Self {
            name: name.into(),
            target,
            value_type,
            steppable,
        }
    }

    pub fn with_steppable(mut self, steppable: bool) -> Self {
        self.steppable = steppable;
        self
    }
}

pub type LazyProducer = dyn Fn() -> Result<Vec<CatalogNode>> + Send + Sync;
pub type TriggerProducer = dyn Fn(&dyn ProgressSink) -> Result<Vec<CatalogNode>> + Send + Sync;

/// Group whose children are produced by a callback when first needed.
#[derive(Clone)]
pub struct LazyGroup {
    producer: Arc<LazyProducer>,
}

impl LazyGroup {
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn() -> Result<Vec<CatalogNode>> + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    pub fn produce(&self) -> Result<Vec<CatalogNode>> {
        (self.producer)()
    }
}

impl fmt::Debug for LazyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyGroup")
    }
}

/// Entry such as "Search all types" whose children come from a potentially
/// long-running enumeration that reports progress and honours cancellation.
#[derive(Clone)]
pub struct SearchTrigger {
    producer: Arc<TriggerProducer>,
}

impl SearchTrigger {
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn(&dyn ProgressSink) -> Result<Vec<CatalogNode>> + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    pub fn produce(&self, progress: &dyn ProgressSink) -> Result<Vec<CatalogNode>> {
        (self.producer)(progress)
    }
}

impl fmt::Debug for SearchTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SearchTrigger")
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Category,
    Namespace(NamespaceKey),
    Type(TypeRef),
    Member(MemberRef),
    CustomAction(Arc<CustomAction>),
    GroupedLazy(LazyGroup),
    SearchTrigger(SearchTrigger),
    MemberAlias(Arc<AliasSymbol>),
}

impl NodeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Namespace(_) => "namespace",
            Self::Type(_) => "type",
            Self::Member(_) => "member",
            Self::CustomAction(_) => "action",
            Self::GroupedLazy(_) => "lazy",
            Self::SearchTrigger(_) => "trigger",
            Self::MemberAlias(_) => "alias",
        }
    }

    /// Nodes that only group other nodes.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Category | Self::Namespace(_) | Self::GroupedLazy(_) | Self::SearchTrigger(_)
        )
    }
}

#[derive(Debug, Clone)]
pub struct CatalogNode {
    /// Unique within one tree: derived from the content key and the ids of
    /// every ancestor.
    pub id: NodeId,
    /// Content identity, independent of where the node is placed.
    key: NodeId,
    /// `-1` for synthetic roots.
    pub depth: i32,
    pub display_name: String,
    pub kind: NodeKind,
    children: Children,
}

impl CatalogNode {
    pub fn new(id: NodeId, display_name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            key: id,
            depth: 0,
            display_name: display_name.into(),
            kind,
            children: Children::default(),
        }
    }

    fn keyed(key: &str, display_name: String, kind: NodeKind) -> Self {
        let id = NodeId::derive(kind.tag(), key);
        Self::new(id, display_name, kind)
    }

    pub fn synthetic_root(children: Vec<CatalogNode>) -> Self {
        let mut root = Self::keyed("<root>", String::new(), NodeKind::Category);
        root.set_children(Children::Expanded(children));
        root.assign_depths(-1);
        root
    }

    pub fn category(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::keyed(&name, name.clone(), NodeKind::Category)
    }

    pub fn namespace(key: NamespaceKey) -> Self {
        let name = key.to_string();
        Self::keyed(&name, name.clone(), NodeKind::Namespace(key))
    }

    pub fn type_node(ty: TypeRef) -> Self {
        Self::keyed(&ty.full_name(), ty.display_name(), NodeKind::Type(ty))
    }

    pub fn member(member: MemberRef) -> Self {
        let key = format!(
            "{}::{}",
            member.reflected_type.full_name(),
            member.symbol.signature()
        );
        let display_name = member.symbol.display_name();
        Self::keyed(&key, display_name, NodeKind::Member(member))
    }

    pub fn custom_action(action: CustomAction) -> Self {
        let key = action.key.clone();
        let label = action.label.clone();
        Self::keyed(&key, label, NodeKind::CustomAction(Arc::new(action)))
    }

    pub fn alias(alias: AliasSymbol) -> Self {
        let key = format!("{}::{}", alias.target.tag(), alias.name);
        let name = alias.name.clone();
        Self::keyed(&key, name, NodeKind::MemberAlias(Arc::new(alias)))
    }

    pub fn lazy_group(name: impl Into<String>, group: LazyGroup) -> Self {
        let name = name.into();
        Self::keyed(&name, name.clone(), NodeKind::GroupedLazy(group))
    }

    pub fn search_trigger(name: impl Into<String>, trigger: SearchTrigger) -> Self {
        let name = name.into();
        Self::keyed(&name, name.clone(), NodeKind::SearchTrigger(trigger))
    }

    /// Attaches `children` in the collapsed state.
    pub fn with_children(mut self, children: Vec<CatalogNode>) -> Self {
        self.set_children(Children::Collapsed(children));
        self
    }

    pub fn expanded(mut self) -> Self {
        self.toggle_expanded(true);
        self
    }

    pub fn is_expanded(&self) -> bool {
        self.children.is_expanded()
    }

    /// Children a tree walk should render: empty while collapsed.
    pub fn visible_children(&self) -> &[CatalogNode] {
        match &self.children {
            Children::Expanded(nodes) => nodes,
            Children::Collapsed(_) => &[],
        }
    }

    /// Every child, whatever the expand state.
    pub fn all_children(&self) -> &[CatalogNode] {
        self.children.all()
    }

    pub fn children_state(&self) -> &Children {
        &self.children
    }

    /// Swaps between the expanded and collapsed child lists without
    /// touching the subtree itself.
    pub fn toggle_expanded(&mut self, expanded: bool) {
        if self.children.is_expanded() == expanded {
            return;
        }
        let nodes = std::mem::take(&mut self.children).into_vec();
        self.children = if expanded {
            Children::Expanded(nodes)
        } else {
            Children::Collapsed(nodes)
        };
    }

    /// Children in either state.
    pub fn children_mut(&mut self) -> &mut [CatalogNode] {
        self.children.all_mut()
    }

    pub fn take_children(&mut self) -> Children {
        std::mem::take(&mut self.children)
    }

    /// Replaces the child list and scopes the new subtree under this node.
    pub fn set_children(&mut self, children: Children) {
        self.children = children;
        let id = self.id;
        for child in self.children.all_mut() {
            child.rescope(id);
        }
    }

    /// Content identity shared by every placement of this node.
    pub fn key(&self) -> NodeId {
        self.key
    }

    fn rescope(&mut self, parent: NodeId) {
        self.id = NodeId::scoped(parent, self.key);
        let id = self.id;
        for child in self.children.all_mut() {
            child.rescope(id);
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Raw symbol name the matcher compares against; containers and aliases
    /// match on their display name.
    pub fn match_text(&self) -> Cow<'_, str> {
        match &self.kind {
            NodeKind::Type(ty) => Cow::Borrowed(ty.name.as_str()),
            NodeKind::Member(member) => Cow::Borrowed(member.symbol.match_name()),
            NodeKind::CustomAction(action) => Cow::Borrowed(action.label.as_str()),
            NodeKind::MemberAlias(alias) => Cow::Borrowed(alias.name.as_str()),
            NodeKind::Category
            | NodeKind::Namespace(_)
            | NodeKind::GroupedLazy(_)
            | NodeKind::SearchTrigger(_) => Cow::Borrowed(self.display_name.as_str()),
        }
    }

    pub fn assign_depths(&mut self, depth: i32) {
        self.depth = depth;
        let child_depth = depth + 1;
        match &mut self.children {
            Children::Expanded(nodes) | Children::Collapsed(nodes) => {
                for node in nodes {
                    node.assign_depths(child_depth);
                }
            }
        }
    }

    /// Depth-first lookup through expanded and collapsed children alike.
    pub fn find(&self, id: NodeId) -> Option<&CatalogNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.all().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut CatalogNode> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.children {
            Children::Expanded(nodes) | Children::Collapsed(nodes) => {
                nodes.iter_mut().find_map(|child| child.find_mut(id))
            }
        }
    }

    /// Number of nodes in this subtree, including collapsed ones.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .all()
            .iter()
            .map(CatalogNode::subtree_len)
            .sum::<usize>()
    }
}

pub fn find_in(nodes: &[CatalogNode], id: NodeId) -> Option<&CatalogNode> {
    nodes.iter().find_map(|node| node.find(id))
}

pub fn find_in_mut(nodes: &mut [CatalogNode], id: NodeId) -> Option<&mut CatalogNode> {
    nodes.iter_mut().find_map(|node| node.find_mut(id))
}
