use crate::error::NavigationError;
use crate::error::Result;
use picker_catalog::CatalogNode;
use picker_catalog::GenericParam;
use picker_catalog::MemberRef;
use picker_catalog::NamespaceMap;
use picker_catalog::NodeKind;
use picker_catalog::TypeFilter;
use picker_catalog::TypeRef;
use std::sync::Arc;

/// What the user was doing when an open generic interrupted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Step,
    Select,
}

/// Asks the caller for the type argument of one generic parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeArgumentRequest {
    /// Display name of the generic definition being closed.
    pub target: String,
    pub parameter: String,
    pub index: usize,
    pub total: usize,
    pub filter: TypeFilter,
}

/// Types able to close a parameter. Several candidates are always handed
/// back to the caller as a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintChoice {
    NoCandidates,
    Unique(TypeRef),
    Ambiguous(Vec<TypeRef>),
}

impl ConstraintChoice {
    pub fn candidates(&self) -> Vec<TypeRef> {
        match self {
            Self::NoCandidates => Vec::new(),
            Self::Unique(ty) => vec![ty.clone()],
            Self::Ambiguous(types) => types.clone(),
        }
    }
}

/// Lists the types in `universe` that satisfy `filter`, ordered by full
/// name.
pub fn constraint_candidates(filter: &TypeFilter, universe: &NamespaceMap) -> ConstraintChoice {
    let mut matching: Vec<TypeRef> = universe
        .values()
        .flatten()
        .filter(|ty| filter.accepts(ty))
        .cloned()
        .collect();
    matching.sort_by_cached_key(|ty| (ty.full_name().to_lowercase(), ty.full_name()));
    matching.dedup_by(|a, b| a.full_name() == b.full_name());
    match matching.len() {
        0 => ConstraintChoice::NoCandidates,
        1 => ConstraintChoice::Unique(matching.remove(0)),
        _ => ConstraintChoice::Ambiguous(matching),
    }
}

/// An interrupted step or select waiting for type arguments, collected one
/// parameter at a time.
#[derive(Debug, Clone)]
pub struct PendingResolution {
    node: CatalogNode,
    params: Vec<GenericParam>,
    supplied: Vec<TypeRef>,
    intent: Intent,
}

impl PendingResolution {
    /// `None` when `node` is not an open generic.
    pub fn for_node(node: &CatalogNode, intent: Intent) -> Option<Self> {
        let params = match &node.kind {
            NodeKind::Type(ty) if ty.generic_args.is_empty() && !ty.generic_params.is_empty() => {
                ty.generic_params.clone()
            }
            NodeKind::Member(member) if member.symbol.is_open_generic() => {
                member.symbol.generic_params.clone()
            }
            _ => return None,
        };
        let mut node = node.clone();
        drop(node.take_children());
        Some(Self {
            node,
            params,
            supplied: Vec::new(),
            intent,
        })
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn node(&self) -> &CatalogNode {
        &self.node
    }

    pub fn supplied(&self) -> &[TypeRef] {
        &self.supplied
    }

    pub fn is_complete(&self) -> bool {
        self.supplied.len() == self.params.len()
    }

    pub fn current_filter(&self) -> Option<TypeFilter> {
        self.params.get(self.supplied.len()).map(TypeFilter::from_param)
    }

    pub fn request(&self) -> Option<TypeArgumentRequest> {
        let index = self.supplied.len();
        let param = self.params.get(index)?;
        Some(TypeArgumentRequest {
            target: self.node.display_name.clone(),
            parameter: param.name.clone(),
            index,
            total: self.params.len(),
            filter: TypeFilter::from_param(param),
        })
    }

    /// Records the argument for the current parameter after checking it
    /// against the parameter's constraints.
    pub fn supply(&mut self, argument: TypeRef) -> Result<()> {
        let Some(filter) = self.current_filter() else {
            return Err(NavigationError::NoPendingResolution);
        };
        if !filter.accepts(&argument) {
            return Err(NavigationError::ConstraintViolation {
                parameter: filter.parameter,
                argument: argument.display_name(),
            });
        }
        self.supplied.push(argument);
        Ok(())
    }

    /// The closed counterpart of the pending node once every argument is
    /// known.
    pub fn close(&self) -> Result<CatalogNode> {
        let shape = || {
            NavigationError::InvalidReferenceShape(format!(
                "cannot close {} over {} type arguments",
                self.node.display_name,
                self.supplied.len()
            ))
        };
        if !self.is_complete() {
            return Err(shape());
        }
        match &self.node.kind {
            NodeKind::Type(ty) => {
                let closed = ty.make_generic(self.supplied.clone()).ok_or_else(shape)?;
                Ok(CatalogNode::type_node(closed))
            }
            NodeKind::Member(member) => {
                let bound = member.symbol.bind_generic(self.supplied.clone()).ok_or_else(shape)?;
                Ok(CatalogNode::member(MemberRef::new(
                    Arc::new(bound),
                    member.reflected_type.clone(),
                )))
            }
            _ => Err(shape()),
        }
    }
}
