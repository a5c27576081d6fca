use crate::error::NavigationError;
use crate::error::Result;
use crate::generics::ConstraintChoice;
use crate::generics::Intent;
use crate::generics::PendingResolution;
use crate::generics::TypeArgumentRequest;
use crate::generics::constraint_candidates;
use crate::resolve::resolve;
use crate::rules::is_selectable;
use crate::rules::is_steppable;
use crate::stack::DrillStack;
use picker_catalog::AliasTarget;
use picker_catalog::CatalogNode;
use picker_catalog::CatalogProvider;
use picker_catalog::MemberBinding;
use picker_catalog::MemberFilter;
use picker_catalog::MemberKind;
use picker_catalog::NamespaceMap;
use picker_catalog::NodeKind;
use picker_catalog::ResolvedReference;
use picker_catalog::SelectionFilter;
use picker_catalog::TypeRef;
use std::sync::Arc;
use tracing::debug;
use tracing::warn;

/// Result of stepping, selecting or supplying a type argument.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The node was pushed; these are the members of the new scope.
    Entered(Vec<CatalogNode>),
    /// Selection finished and the drill stack was cleared.
    Resolved(ResolvedReference),
    /// An open generic needs another type argument before it can continue.
    NeedsTypeArguments(TypeArgumentRequest),
}

/// Drill-down state of one picker session.
pub struct Navigator {
    provider: Arc<dyn CatalogProvider>,
    filter: SelectionFilter,
    stack: DrillStack,
    pending: Option<PendingResolution>,
}

impl Navigator {
    pub fn new(provider: Arc<dyn CatalogProvider>, filter: SelectionFilter) -> Self {
        Self {
            provider,
            filter,
            stack: DrillStack::new(),
            pending: None,
        }
    }

    pub fn filter(&self) -> &SelectionFilter {
        &self.filter
    }

    pub fn stack(&self) -> &DrillStack {
        &self.stack
    }

    pub fn breadcrumb(&self) -> Vec<String> {
        self.stack.breadcrumb()
    }

    pub fn pending(&self) -> Option<&PendingResolution> {
        self.pending.as_ref()
    }

    pub fn is_selectable(&self, node: &CatalogNode) -> bool {
        is_selectable(&node.kind, &self.filter)
    }

    pub fn is_steppable(&self, node: &CatalogNode) -> bool {
        is_steppable(&node.kind)
    }

    /// Pushes `node` and lists the members of the new scope, or pauses when
    /// `node` is an open generic.
    pub fn step_into(&mut self, node: &CatalogNode) -> Result<StepOutcome> {
        if !self.is_steppable(node) {
            return Err(NavigationError::NotSteppable(node.display_name.clone()));
        }
        self.pending = None;
        if let Some(pending) = PendingResolution::for_node(node, Intent::Step) {
            return Ok(self.pause(pending));
        }
        self.enter(node.clone())
    }

    /// Resolves the drill stack plus `node` into a reference.
    pub fn select(&mut self, node: &CatalogNode) -> Result<StepOutcome> {
        if !self.is_selectable(node) {
            return Err(NavigationError::NotSelectable(node.display_name.clone()));
        }
        self.pending = None;
        if let Some(pending) = PendingResolution::for_node(node, Intent::Select) {
            return Ok(self.pause(pending));
        }
        self.finish(node.clone())
    }

    /// Binds the current generic parameter of the pending step or select.
    /// A rejected argument leaves the request open.
    pub fn supply_type_argument(&mut self, argument: TypeRef) -> Result<StepOutcome> {
        let Some(pending) = self.pending.as_mut() else {
            return Err(NavigationError::NoPendingResolution);
        };
        pending.supply(argument)?;
        if let Some(request) = pending.request() {
            return Ok(StepOutcome::NeedsTypeArguments(request));
        }
        let closed = pending.close()?;
        let intent = pending.intent();
        self.pending = None;
        match intent {
            Intent::Step => self.enter(closed),
            Intent::Select => self.finish(closed),
        }
    }

    /// Abandons a pending generic resolution. Returns whether one existed.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Types in `universe` able to close the parameter currently requested.
    pub fn constraint_candidates(&self, universe: &NamespaceMap) -> Result<ConstraintChoice> {
        let filter = self
            .pending
            .as_ref()
            .and_then(PendingResolution::current_filter)
            .ok_or(NavigationError::NoPendingResolution)?;
        Ok(constraint_candidates(&filter, universe))
    }

    /// Leaves the innermost scope. A pending generic resolution is abandoned
    /// first without popping. Returns `None` once back at the root.
    pub fn back(&mut self) -> Result<Option<Vec<CatalogNode>>> {
        if self.cancel_pending() {
            return self.scope();
        }
        if let Some(node) = self.stack.pop() {
            debug!("left {}", node.display_name);
        }
        self.scope()
    }

    /// Members of the innermost scope, `None` at the root.
    pub fn scope(&self) -> Result<Option<Vec<CatalogNode>>> {
        Ok(self.stack.top().map(|node| self.members_for(node)))
    }

    pub fn reset(&mut self) {
        self.pending = None;
        self.stack.clear();
    }

    fn pause(&mut self, pending: PendingResolution) -> StepOutcome {
        let request = pending.request();
        debug!("{} needs type arguments", pending.node().display_name);
        self.pending = Some(pending);
        match request {
            Some(request) => StepOutcome::NeedsTypeArguments(request),
            None => StepOutcome::Entered(Vec::new()),
        }
    }

    fn enter(&mut self, node: CatalogNode) -> Result<StepOutcome> {
        let members = self.members_for(&node);
        debug!("stepped into {} ({} members)", node.display_name, members.len());
        self.stack.push(node);
        Ok(StepOutcome::Entered(members))
    }

    fn finish(&mut self, node: CatalogNode) -> Result<StepOutcome> {
        let mut elements = self.stack.entries().to_vec();
        elements.push(node);
        let reference = resolve(&elements)?;
        self.stack.clear();
        Ok(StepOutcome::Resolved(reference))
    }

    /// Stepping into a type lists its static members; stepping into a
    /// value lists the instance members of its type. A failing provider
    /// leaves the scope empty.
    fn members_for(&self, node: &CatalogNode) -> Vec<CatalogNode> {
        let (ty, binding) = match &node.kind {
            NodeKind::Type(ty) => (Some(ty.clone()), MemberBinding::Static),
            NodeKind::Member(member) if member.symbol.kind == MemberKind::NestedType => {
                (Some(member.symbol.value_type.clone()), MemberBinding::Static)
            }
            NodeKind::Member(member) => (Some(member.symbol.value_type.clone()), MemberBinding::Instance),
            NodeKind::MemberAlias(alias) => {
                let ty = match &alias.target {
                    AliasTarget::Composite(reference) => reference.value_type.clone(),
                    _ => alias.value_type.clone(),
                };
                (ty, MemberBinding::Instance)
            }
            NodeKind::CustomAction(action) => (action.value_type.clone(), MemberBinding::Instance),
            NodeKind::Category
            | NodeKind::Namespace(_)
            | NodeKind::GroupedLazy(_)
            | NodeKind::SearchTrigger(_) => (None, MemberBinding::Any),
        };
        let Some(ty) = ty else {
            return Vec::new();
        };
        let filter = MemberFilter {
            binding,
            ..MemberFilter::default()
        };
        self.provider.members_of(&ty, &filter).unwrap_or_else(|err| {
            warn!("member listing for {} failed: {err}", ty.full_name());
            Vec::new()
        })
    }
}
