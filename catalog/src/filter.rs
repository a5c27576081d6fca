use crate::symbol::GenericParam;
use crate::symbol::MemberKind;
use crate::symbol::TypeFlavor;
use crate::symbol::TypeRef;
use crate::symbol::TypeSymbol;
use serde::Deserialize;
use serde::Serialize;

/// Narrows which node kinds take part in matching and listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindFilter {
    #[default]
    All,
    Function,
    Variable,
    Property,
    Type,
}

impl KindFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" | "any" => Some(Self::All),
            "function" | "functions" | "method" | "methods" => Some(Self::Function),
            "variable" | "variables" | "field" | "fields" => Some(Self::Variable),
            "property" | "properties" => Some(Self::Property),
            "type" | "types" => Some(Self::Type),
            _ => None,
        }
    }

    pub fn accepts_member(self, kind: MemberKind) -> bool {
        match self {
            Self::All => true,
            Self::Function => matches!(kind, MemberKind::Method | MemberKind::Constructor),
            Self::Variable => matches!(kind, MemberKind::Field),
            Self::Property => matches!(kind, MemberKind::Property),
            Self::Type => matches!(kind, MemberKind::NestedType),
        }
    }

    pub fn accepts_types(self) -> bool {
        matches!(self, Self::All | Self::Type)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemberBinding {
    Static,
    Instance,
    #[default]
    Any,
}

impl MemberBinding {
    pub fn accepts(self, is_static: bool) -> bool {
        match self {
            Self::Static => is_static,
            Self::Instance => !is_static,
            Self::Any => true,
        }
    }
}

/// Arguments of `CatalogProvider::members_of`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFilter {
    pub kind_filter: KindFilter,
    pub declared_only: bool,
    pub binding: MemberBinding,
}

impl MemberFilter {
    pub fn accepts(&self, kind: MemberKind, is_static: bool) -> bool {
        self.kind_filter.accepts_member(kind) && self.binding.accepts(is_static)
    }
}

/// What the consumer of the picker is willing to receive. Drives the
/// selectability rules of the navigation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionFilter {
    pub kind_filter: KindFilter,
    /// Type constants and other value targets may be selected.
    pub accept_values: bool,
    /// Types may be picked directly even when values are not accepted.
    pub allow_type_selection: bool,
    pub require_get: bool,
    pub require_set: bool,
    pub min_params: usize,
    pub max_params: usize,
}

impl Default for SelectionFilter {
    fn default() -> Self {
        Self {
            kind_filter: KindFilter::All,
            accept_values: true,
            allow_type_selection: false,
            require_get: true,
            require_set: false,
            min_params: 0,
            max_params: usize::MAX,
        }
    }
}

impl SelectionFilter {
    pub fn setter() -> Self {
        Self {
            require_get: false,
            require_set: true,
            ..Self::default()
        }
    }

    pub fn with_kind_filter(mut self, kind_filter: KindFilter) -> Self {
        self.kind_filter = kind_filter;
        self
    }

    pub fn with_arity(mut self, min_params: usize, max_params: usize) -> Self {
        self.min_params = min_params;
        self.max_params = max_params;
        self
    }

    pub fn accepts_arity(&self, arity: usize) -> bool {
        (self.min_params..=self.max_params).contains(&arity)
    }
}

/// Filter derived from a generic parameter's constraints; decides which
/// concrete types may be supplied as its argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFilter {
    pub parameter: String,
    pub constraints: Vec<TypeRef>,
    pub value_type_only: bool,
    pub reference_type_only: bool,
    pub needs_default_constructor: bool,
}

impl TypeFilter {
    pub fn from_param(param: &GenericParam) -> Self {
        Self {
            parameter: param.name.clone(),
            constraints: param.constraints.clone(),
            value_type_only: param.value_type_only,
            reference_type_only: param.reference_type_only,
            needs_default_constructor: param.needs_default_constructor,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
            && !self.value_type_only
            && !self.reference_type_only
            && !self.needs_default_constructor
    }

    pub fn accepts(&self, ty: &TypeSymbol) -> bool {
        if ty.is_open_generic() || ty.is_void() || ty.is_static {
            return false;
        }
        if self.value_type_only && !ty.is_value_type() {
            return false;
        }
        if self.reference_type_only && (ty.is_value_type() || ty.flavor == TypeFlavor::Interface) {
            return false;
        }
        if self.needs_default_constructor && !ty.has_default_constructor {
            return false;
        }
        self.constraints
            .iter()
            .all(|constraint| ty.is_assignable_to(constraint))
    }
}
