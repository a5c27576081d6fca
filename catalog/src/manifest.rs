//! JSON description of a catalog, loaded into an [`InMemoryCatalog`].
//!
//! Type references are written by definition name (`System.Int32`), by a
//! unique simple name (`Int32`), with an array suffix (`Int32[]`), or by the
//! name of a generic parameter in scope (`T`).

use crate::error::CatalogError;
use crate::error::Result;
use crate::memory::InMemoryCatalog;
use crate::node::AliasSymbol;
use crate::node::AliasTarget;
use crate::symbol::GenericParam;
use crate::symbol::MemberKind;
use crate::symbol::MemberSymbol;
use crate::symbol::Parameter;
use crate::symbol::TypeFlavor;
use crate::symbol::TypeRef;
use crate::symbol::TypeSymbol;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogManifest {
    #[serde(default)]
    pub allowed_assemblies: Option<Vec<String>>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
    #[serde(default)]
    pub aliases: Vec<AliasEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub assembly: String,
    #[serde(default = "default_flavor")]
    pub flavor: TypeFlavor,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub generic_params: Vec<GenericParamEntry>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub members: Vec<MemberEntry>,
}

impl TypeEntry {
    fn definition_name(&self) -> String {
        match self.namespace.as_deref() {
            Some(namespace) if !namespace.is_empty() => format!("{namespace}.{}", self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericParamEntry {
    pub name: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub value_type_only: bool,
    #[serde(default)]
    pub reference_type_only: bool,
    #[serde(default)]
    pub needs_default_constructor: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberEntry {
    #[serde(default)]
    pub name: String,
    pub kind: MemberKind,
    #[serde(default, rename = "type")]
    pub value_type: Option<String>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub parameters: Vec<ParameterEntry>,
    #[serde(default)]
    pub generic_params: Vec<GenericParamEntry>,
    #[serde(default = "default_true")]
    pub can_read: bool,
    #[serde(default = "default_true")]
    pub can_write: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasKind {
    Variable,
    Function,
    Parameter,
    Port,
    ValueConstant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasEntry {
    pub name: String,
    pub kind: AliasKind,
    #[serde(default, rename = "type")]
    pub value_type: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub steppable: Option<bool>,
}

fn default_flavor() -> TypeFlavor {
    TypeFlavor::Class
}

fn default_true() -> bool {
    true
}

impl CatalogManifest {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn into_catalog(self) -> Result<InMemoryCatalog> {
        let mut resolver = Resolver::new(&self.types)?;
        let mut builder = InMemoryCatalog::builder();
        let mut owners = Vec::with_capacity(self.types.len());
        for entry in &self.types {
            let ty = resolver.build(&entry.definition_name())?;
            builder = builder.add_type(ty.clone());
            owners.push(ty);
        }
        let mut member_count = 0usize;
        for (entry, owner) in self.types.iter().zip(owners) {
            for member in &entry.members {
                builder = builder.add_member(resolver.member(&owner, member)?);
                member_count += 1;
            }
        }
        for alias in &self.aliases {
            builder = builder.add_alias(resolver.alias(alias)?);
        }
        if let Some(assemblies) = self.allowed_assemblies {
            builder = builder.allow_assemblies(assemblies);
        }
        info!(
            "loaded catalog manifest with {} types and {member_count} members",
            self.types.len()
        );
        Ok(builder.build())
    }
}

struct Resolver<'a> {
    entries: HashMap<String, &'a TypeEntry>,
    by_simple_name: HashMap<&'a str, Vec<String>>,
    built: HashMap<String, TypeRef>,
    visiting: HashSet<String>,
    void: TypeRef,
}

impl<'a> Resolver<'a> {
    fn new(types: &'a [TypeEntry]) -> Result<Self> {
        let mut entries = HashMap::new();
        let mut by_simple_name: HashMap<&'a str, Vec<String>> = HashMap::new();
        for entry in types {
            let key = entry.definition_name();
            if entries.insert(key.clone(), entry).is_some() {
                return Err(CatalogError::InvalidManifest(format!("duplicate type {key}")));
            }
            by_simple_name.entry(entry.name.as_str()).or_default().push(key);
        }
        Ok(Self {
            entries,
            by_simple_name,
            built: HashMap::new(),
            visiting: HashSet::new(),
            void: TypeSymbol::void(),
        })
    }

    fn canonical(&self, reference: &str) -> Result<String> {
        if self.entries.contains_key(reference) {
            return Ok(reference.to_string());
        }
        match self.by_simple_name.get(reference).map(Vec::as_slice) {
            Some([single]) => Ok(single.clone()),
            Some(many) if many.len() > 1 => Err(CatalogError::InvalidManifest(format!(
                "ambiguous type reference {reference}: {}",
                many.join(", ")
            ))),
            _ => Err(CatalogError::UnknownType(reference.to_string())),
        }
    }

    fn resolve(&mut self, reference: &str, scope: &[GenericParam]) -> Result<TypeRef> {
        let reference = reference.trim();
        if let Some(inner) = reference.strip_suffix("[]") {
            let element = self.resolve(inner, scope)?;
            if element.is_void() {
                return Err(CatalogError::InvalidManifest(format!(
                    "{reference} cannot be an array"
                )));
            }
            return Ok(TypeSymbol::array_type(&element));
        }
        if scope.iter().any(|param| param.name == reference) {
            return Ok(TypeSymbol::generic_parameter(reference));
        }
        if reference.eq_ignore_ascii_case("void") || reference == "System.Void" {
            return Ok(self.void.clone());
        }
        let key = self.canonical(reference)?;
        self.build(&key)
    }

    fn build(&mut self, key: &str) -> Result<TypeRef> {
        if let Some(ty) = self.built.get(key) {
            return Ok(ty.clone());
        }
        let entry = *self
            .entries
            .get(key)
            .ok_or_else(|| CatalogError::UnknownType(key.to_string()))?;
        if !self.visiting.insert(key.to_string()) {
            return Err(CatalogError::CyclicType(key.to_string()));
        }
        let params = self.generic_params(&entry.generic_params, &[])?;
        let base = match entry.base.as_deref() {
            Some(base) => Some(self.resolve(base, &params)?),
            None => None,
        };
        let mut ty = TypeSymbol::new(entry.name.clone(), entry.flavor)
            .in_namespace(entry.namespace.clone().unwrap_or_default())
            .in_assembly(entry.assembly.clone())
            .with_generic_params(params);
        if let Some(base) = base {
            ty = ty.with_base(base);
        }
        if entry.is_static {
            ty = ty.as_static();
        }
        let ty = ty.into_ref();
        self.visiting.remove(key);
        self.built.insert(key.to_string(), ty.clone());
        Ok(ty)
    }

    fn generic_params(
        &mut self,
        entries: &[GenericParamEntry],
        outer: &[GenericParam],
    ) -> Result<Vec<GenericParam>> {
        let mut scope: Vec<GenericParam> = outer.to_vec();
        scope.extend(entries.iter().map(|entry| GenericParam::new(entry.name.clone())));
        let mut params = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut param = GenericParam::new(entry.name.clone());
            for constraint in &entry.constraints {
                param = param.with_constraint(self.resolve(constraint, &scope)?);
            }
            param.value_type_only = entry.value_type_only;
            param.reference_type_only = entry.reference_type_only;
            param.needs_default_constructor = entry.needs_default_constructor;
            params.push(param);
        }
        Ok(params)
    }

    fn member(&mut self, owner: &TypeRef, entry: &MemberEntry) -> Result<MemberSymbol> {
        let method_params = self.generic_params(&entry.generic_params, &owner.generic_params)?;
        let mut scope = owner.generic_params.clone();
        scope.extend(method_params.iter().cloned());

        let value_type = match entry.value_type.as_deref() {
            Some(reference) => Some(self.resolve(reference, &scope)?),
            None => None,
        };
        let mut parameters = Vec::with_capacity(entry.parameters.len());
        for param in &entry.parameters {
            parameters.push(Parameter::new(
                param.name.clone(),
                self.resolve(&param.value_type, &scope)?,
            ));
        }
        let require_type = |value_type: Option<TypeRef>| {
            value_type.ok_or_else(|| {
                CatalogError::InvalidManifest(format!(
                    "member {}.{} needs a type",
                    owner.definition_name(),
                    entry.name
                ))
            })
        };

        let member = match entry.kind {
            MemberKind::Field => {
                MemberSymbol::field(owner.clone(), entry.name.clone(), require_type(value_type)?)
                    .with_static(entry.is_static)
            }
            MemberKind::Property => MemberSymbol::property(
                owner.clone(),
                entry.name.clone(),
                require_type(value_type)?,
                entry.can_read,
                entry.can_write,
            )
            .with_static(entry.is_static),
            MemberKind::Method => MemberSymbol::method(
                owner.clone(),
                entry.name.clone(),
                value_type.unwrap_or_else(|| self.void.clone()),
                parameters,
            )
            .with_static(entry.is_static)
            .with_generic_params(method_params),
            MemberKind::Constructor => MemberSymbol::constructor(owner.clone(), parameters),
            MemberKind::Event => {
                MemberSymbol::event(owner.clone(), entry.name.clone(), require_type(value_type)?)
                    .with_static(entry.is_static)
            }
            MemberKind::NestedType => {
                MemberSymbol::nested_type(owner.clone(), require_type(value_type)?)
            }
        };
        Ok(member)
    }

    fn alias(&mut self, entry: &AliasEntry) -> Result<AliasSymbol> {
        let value_type = match entry.value_type.as_deref() {
            Some(reference) => Some(self.resolve(reference, &[])?),
            None => None,
        };
        let target = match entry.kind {
            AliasKind::Variable => AliasTarget::Variable,
            AliasKind::Function => AliasTarget::Function,
            AliasKind::Parameter => AliasTarget::Parameter,
            AliasKind::Port => AliasTarget::Port,
            AliasKind::ValueConstant => {
                AliasTarget::ValueConstant(entry.value.clone().unwrap_or_default())
            }
        };
        let alias = AliasSymbol::new(entry.name.clone(), target, value_type);
        Ok(match entry.steppable {
            Some(steppable) => alias.with_steppable(steppable),
            None => alias,
        })
    }
}
