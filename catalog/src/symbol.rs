use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;

/// Shared handle to a type snapshot. Cloning a node never clones the symbol.
pub type TypeRef = Arc<TypeSymbol>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFlavor {
    Class,
    Struct,
    Enum,
    Interface,
    Void,
    GenericParameter,
}

/// A declared generic parameter together with the constraints that narrow
/// which type arguments may be bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParam {
    pub name: String,
    pub constraints: Vec<TypeRef>,
    pub value_type_only: bool,
    pub reference_type_only: bool,
    pub needs_default_constructor: bool,
}

impl GenericParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
            value_type_only: false,
            reference_type_only: false,
            needs_default_constructor: false,
        }
    }

    pub fn with_constraint(mut self, constraint: TypeRef) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn value_types_only(mut self) -> Self {
        self.value_type_only = true;
        self
    }

    pub fn reference_types_only(mut self) -> Self {
        self.reference_type_only = true;
        self
    }

    pub fn with_default_constructor(mut self) -> Self {
        self.needs_default_constructor = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol {
    /// Raw name without namespace or generic suffix (`List`, `Int32[]`).
    pub name: String,
    pub namespace: Option<String>,
    pub assembly: String,
    pub flavor: TypeFlavor,
    pub base: Option<TypeRef>,
    pub generic_params: Vec<GenericParam>,
    pub generic_args: Vec<TypeRef>,
    /// Element type when this symbol is an array.
    pub element: Option<TypeRef>,
    pub is_static: bool,
    pub has_default_constructor: bool,
}

impl TypeSymbol {
    pub fn new(name: impl Into<String>, flavor: TypeFlavor) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            assembly: String::new(),
            flavor,
            base: None,
            generic_params: Vec::new(),
            generic_args: Vec::new(),
            element: None,
            is_static: false,
            has_default_constructor: matches!(flavor, TypeFlavor::Class | TypeFlavor::Struct),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeFlavor::Class)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeFlavor::Struct)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, TypeFlavor::Enum)
    }

    pub fn void() -> TypeRef {
        Arc::new(Self::new("Void", TypeFlavor::Void).in_namespace("System"))
    }

    pub fn generic_parameter(name: impl Into<String>) -> TypeRef {
        Arc::new(Self::new(name, TypeFlavor::GenericParameter))
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = if namespace.is_empty() {
            None
        } else {
            Some(namespace)
        };
        self
    }

    pub fn in_assembly(mut self, assembly: impl Into<String>) -> Self {
        self.assembly = assembly.into();
        self
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_generic_params(mut self, params: Vec<GenericParam>) -> Self {
        self.generic_params = params;
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self.has_default_constructor = false;
        self
    }

    pub fn without_default_constructor(mut self) -> Self {
        self.has_default_constructor = false;
        self
    }

    pub fn into_ref(self) -> TypeRef {
        Arc::new(self)
    }

    /// Namespace-qualified name without generic arguments; the key members
    /// are registered under.
    pub fn definition_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}.{}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        if let Some(element) = &self.element {
            return format!("{}[]", element.full_name());
        }
        format!("{}{}", self.definition_name(), self.generic_suffix())
    }

    pub fn display_name(&self) -> String {
        if let Some(element) = &self.element {
            return format!("{}[]", element.display_name());
        }
        format!("{}{}", self.name, self.generic_suffix())
    }

    fn generic_suffix(&self) -> String {
        if !self.generic_args.is_empty() {
            let args: Vec<String> = self.generic_args.iter().map(|a| a.display_name()).collect();
            format!("<{}>", args.join(", "))
        } else if !self.generic_params.is_empty() {
            let params: Vec<&str> = self.generic_params.iter().map(|p| p.name.as_str()).collect();
            format!("<{}>", params.join(", "))
        } else {
            String::new()
        }
    }

    pub fn is_enum(&self) -> bool {
        self.flavor == TypeFlavor::Enum
    }

    pub fn is_void(&self) -> bool {
        self.flavor == TypeFlavor::Void
    }

    pub fn is_array(&self) -> bool {
        self.element.is_some()
    }

    pub fn is_value_type(&self) -> bool {
        matches!(self.flavor, TypeFlavor::Struct | TypeFlavor::Enum)
    }

    pub fn is_open_generic(&self) -> bool {
        if self.flavor == TypeFlavor::GenericParameter {
            return true;
        }
        if let Some(element) = &self.element {
            return element.is_open_generic();
        }
        self.generic_args.len() < self.generic_params.len()
            || self.generic_args.iter().any(|arg| arg.is_open_generic())
    }

    /// Array type over `element`, or `None` when no array of it can exist.
    pub fn array_of(element: &TypeRef) -> Option<TypeRef> {
        if element.is_void() || element.is_open_generic() || element.is_static {
            return None;
        }
        Some(Self::array_type(element))
    }

    /// Array type over `element` without the array-ability check; used for
    /// declared signatures such as `T[]`.
    pub fn array_type(element: &TypeRef) -> TypeRef {
        Arc::new(Self {
            name: format!("{}[]", element.name),
            namespace: element.namespace.clone(),
            assembly: element.assembly.clone(),
            flavor: TypeFlavor::Class,
            base: None,
            generic_params: Vec::new(),
            generic_args: Vec::new(),
            element: Some(element.clone()),
            is_static: false,
            has_default_constructor: false,
        })
    }

    /// Closes a generic definition over `args`.
    pub fn make_generic(&self, args: Vec<TypeRef>) -> Option<TypeRef> {
        if self.generic_params.is_empty()
            || !self.generic_args.is_empty()
            || self.generic_params.len() != args.len()
        {
            return None;
        }
        Some(Arc::new(Self {
            generic_args: args,
            ..self.clone()
        }))
    }

    pub fn is_assignable_to(&self, target: &TypeSymbol) -> bool {
        let target_name = target.full_name();
        if self.full_name() == target_name {
            return true;
        }
        let mut current = self.base.clone();
        while let Some(ty) = current {
            if ty.full_name() == target_name {
                return true;
            }
            current = ty.base.clone();
        }
        false
    }
}

/// Replaces generic parameters named in `params` by the matching `args`.
pub fn substitute(ty: &TypeRef, params: &[GenericParam], args: &[TypeRef]) -> TypeRef {
    if params.is_empty() || params.len() != args.len() {
        return ty.clone();
    }
    if ty.flavor == TypeFlavor::GenericParameter {
        return params
            .iter()
            .position(|p| p.name == ty.name)
            .map(|idx| args[idx].clone())
            .unwrap_or_else(|| ty.clone());
    }
    if let Some(element) = &ty.element {
        return TypeSymbol::array_type(&substitute(element, params, args));
    }
    if ty.generic_args.is_empty() {
        return ty.clone();
    }
    Arc::new(TypeSymbol {
        generic_args: ty
            .generic_args
            .iter()
            .map(|arg| substitute(arg, params, args))
            .collect(),
        ..(**ty).clone()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Constructor,
    Event,
    NestedType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value_type: TypeRef,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSymbol {
    pub name: String,
    pub kind: MemberKind,
    pub declaring_type: TypeRef,
    /// Field/property type, method return type, or the constructed type.
    pub value_type: TypeRef,
    pub is_static: bool,
    pub parameters: Vec<Parameter>,
    pub generic_params: Vec<GenericParam>,
    pub generic_args: Vec<TypeRef>,
    pub can_read: bool,
    pub can_write: bool,
}

impl MemberSymbol {
    fn base(
        kind: MemberKind,
        declaring_type: TypeRef,
        name: impl Into<String>,
        value_type: TypeRef,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            declaring_type,
            value_type,
            is_static: false,
            parameters: Vec::new(),
            generic_params: Vec::new(),
            generic_args: Vec::new(),
            can_read: true,
            can_write: false,
        }
    }

    pub fn field(declaring_type: TypeRef, name: impl Into<String>, value_type: TypeRef) -> Self {
        Self {
            can_write: true,
            ..Self::base(MemberKind::Field, declaring_type, name, value_type)
        }
    }

    pub fn property(
        declaring_type: TypeRef,
        name: impl Into<String>,
        value_type: TypeRef,
        can_read: bool,
        can_write: bool,
    ) -> Self {
        Self {
            can_read,
            can_write,
            ..Self::base(MemberKind::Property, declaring_type, name, value_type)
        }
    }

    pub fn method(
        declaring_type: TypeRef,
        name: impl Into<String>,
        returns: TypeRef,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            parameters,
            ..Self::base(MemberKind::Method, declaring_type, name, returns)
        }
    }

    pub fn constructor(declaring_type: TypeRef, parameters: Vec<Parameter>) -> Self {
        let constructed = declaring_type.clone();
        Self {
            parameters,
            is_static: true,
            ..Self::base(MemberKind::Constructor, declaring_type, ".ctor", constructed)
        }
    }

    pub fn event(declaring_type: TypeRef, name: impl Into<String>, handler: TypeRef) -> Self {
        Self::base(MemberKind::Event, declaring_type, name, handler)
    }

    pub fn nested_type(declaring_type: TypeRef, nested: TypeRef) -> Self {
        let name = nested.name.clone();
        Self {
            is_static: true,
            ..Self::base(MemberKind::NestedType, declaring_type, name, nested)
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_generic_params(mut self, params: Vec<GenericParam>) -> Self {
        self.generic_params = params;
        self
    }

    pub fn into_ref(self) -> Arc<MemberSymbol> {
        Arc::new(self)
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_open_generic(&self) -> bool {
        self.generic_args.len() < self.generic_params.len()
    }

    /// Name the matcher compares against. Constructors are found by the
    /// name of the type they build.
    pub fn match_name(&self) -> &str {
        match self.kind {
            MemberKind::Constructor => &self.declaring_type.name,
            MemberKind::NestedType => &self.value_type.name,
            _ => &self.name,
        }
    }

    pub fn display_name(&self) -> String {
        match self.kind {
            MemberKind::Constructor => format!(
                "new {}({})",
                self.declaring_type.display_name(),
                self.parameter_list()
            ),
            MemberKind::Method => format!(
                "{}{}({})",
                self.name,
                self.generic_suffix(),
                self.parameter_list()
            ),
            MemberKind::NestedType => self.value_type.display_name(),
            MemberKind::Field | MemberKind::Property | MemberKind::Event => self.name.clone(),
        }
    }

    /// Overload-distinguishing key used for identity and override folding.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| p.value_type.full_name())
            .collect();
        format!(
            "{}`{}({})",
            self.name,
            self.generic_params.len(),
            params.join(",")
        )
    }

    fn parameter_list(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| p.value_type.display_name())
            .collect();
        params.join(", ")
    }

    fn generic_suffix(&self) -> String {
        if !self.generic_args.is_empty() {
            let args: Vec<String> = self.generic_args.iter().map(|a| a.display_name()).collect();
            format!("<{}>", args.join(", "))
        } else if !self.generic_params.is_empty() {
            let params: Vec<&str> = self.generic_params.iter().map(|p| p.name.as_str()).collect();
            format!("<{}>", params.join(", "))
        } else {
            String::new()
        }
    }

    /// Closes a generic method over `args`, substituting them into the
    /// return and parameter types.
    pub fn bind_generic(&self, args: Vec<TypeRef>) -> Option<MemberSymbol> {
        if !self.is_open_generic() || self.generic_params.len() != args.len() {
            return None;
        }
        let value_type = substitute(&self.value_type, &self.generic_params, &args);
        let parameters = self
            .parameters
            .iter()
            .map(|p| Parameter::new(p.name.clone(), substitute(&p.value_type, &self.generic_params, &args)))
            .collect();
        Some(Self {
            value_type,
            parameters,
            generic_args: args,
            ..self.clone()
        })
    }

    /// Re-expresses this member as seen through a closed generic owner.
    pub fn close_over(&self, owner: &TypeSymbol) -> MemberSymbol {
        let definition = &self.declaring_type;
        if owner.generic_args.is_empty() || definition.generic_params.len() != owner.generic_args.len() {
            return self.clone();
        }
        let params = &definition.generic_params;
        let args = &owner.generic_args;
        let declaring_type = Arc::new(owner.clone());
        let value_type = match self.kind {
            MemberKind::Constructor => declaring_type.clone(),
            _ => substitute(&self.value_type, params, args),
        };
        Self {
            declaring_type,
            value_type,
            parameters: self
                .parameters
                .iter()
                .map(|p| Parameter::new(p.name.clone(), substitute(&p.value_type, params, args)))
                .collect(),
            ..self.clone()
        }
    }
}
