use crate::error::Result;
use crate::filter::MemberFilter;
use crate::node::AliasSymbol;
use crate::node::CatalogNode;
use crate::node::CustomAction;
use crate::node::MemberRef;
use crate::node::SearchTrigger;
use crate::provider::CatalogProvider;
use crate::provider::NamespaceKey;
use crate::provider::NamespaceMap;
use crate::provider::NamespaceOptions;
use crate::provider::ProgressSink;
use crate::provider::ScopeContext;
use crate::provider::namespace_tree;
use crate::sort::sort_nodes;
use crate::symbol::MemberKind;
use crate::symbol::MemberSymbol;
use crate::symbol::TypeRef;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub const SEARCH_ALL_TYPES_LABEL: &str = "Search all types";
pub const GRAPH_CATEGORY_LABEL: &str = "Graph";
pub const ACTIONS_CATEGORY_LABEL: &str = "Actions";

const PROGRESS_STRIDE: usize = 256;

/// Provider over an in-memory registry of type and member snapshots.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    inner: Arc<Registry>,
}

#[derive(Default)]
struct Registry {
    types: Vec<TypeRef>,
    /// Declared members keyed by `TypeSymbol::definition_name`.
    members: HashMap<String, Vec<Arc<MemberSymbol>>>,
    allowed_assemblies: Option<HashSet<String>>,
    actions: Vec<CustomAction>,
    aliases: Vec<AliasSymbol>,
}

#[derive(Default)]
pub struct InMemoryCatalogBuilder {
    registry: Registry,
}

impl InMemoryCatalogBuilder {
    pub fn add_type(mut self, ty: TypeRef) -> Self {
        self.registry.types.push(ty);
        self
    }

    pub fn add_member(mut self, member: MemberSymbol) -> Self {
        self.registry
            .members
            .entry(member.declaring_type.definition_name())
            .or_default()
            .push(Arc::new(member));
        self
    }

    pub fn allow_assemblies<I, S>(mut self, assemblies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.allowed_assemblies = Some(assemblies.into_iter().map(Into::into).collect());
        self
    }

    pub fn add_action(mut self, action: CustomAction) -> Self {
        self.registry.actions.push(action);
        self
    }

    pub fn add_alias(mut self, alias: AliasSymbol) -> Self {
        self.registry.aliases.push(alias);
        self
    }

    pub fn build(self) -> InMemoryCatalog {
        InMemoryCatalog {
            inner: Arc::new(self.registry),
        }
    }
}

impl InMemoryCatalog {
    pub fn builder() -> InMemoryCatalogBuilder {
        InMemoryCatalogBuilder::default()
    }

    pub fn type_count(&self) -> usize {
        self.inner.types.len()
    }

    pub fn find_type(&self, name: &str) -> Option<TypeRef> {
        self.inner.find_type(name)
    }
}

impl Registry {
    fn find_type(&self, name: &str) -> Option<TypeRef> {
        self.types
            .iter()
            .find(|ty| ty.definition_name() == name)
            .or_else(|| self.types.iter().find(|ty| ty.name == name))
            .cloned()
    }

    fn is_allowed(&self, ty: &TypeRef, options: NamespaceOptions) -> bool {
        if options.ignore_assembly_allowlist {
            return true;
        }
        self.allowed_assemblies
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&ty.assembly))
    }

    fn types_under(&self, names: &[String], options: NamespaceOptions) -> NamespaceMap {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        let mut map = NamespaceMap::new();
        for ty in &self.types {
            if !self.is_allowed(ty, options) {
                continue;
            }
            let key = NamespaceKey::from_namespace(ty.namespace.as_deref());
            let included = match &key {
                NamespaceKey::Global => options.include_global,
                NamespaceKey::Named(name) => wanted.is_empty() || wanted.contains(name.as_str()),
            };
            if included {
                map.entry(key).or_default().push(ty.clone());
            }
        }
        map
    }

    fn sweep(&self, progress: &dyn ProgressSink) -> NamespaceMap {
        let total = self.types.len();
        let mut map = NamespaceMap::new();
        for (idx, ty) in self.types.iter().enumerate() {
            if idx % PROGRESS_STRIDE == 0 {
                if progress.is_cancelled() {
                    debug!("type sweep cancelled after {idx} of {total} types");
                    break;
                }
                progress.report(idx, total, &ty.definition_name());
            }
            map.entry(NamespaceKey::from_namespace(ty.namespace.as_deref()))
                .or_default()
                .push(ty.clone());
        }
        progress.report(total, total, "done");
        map
    }

    fn members(&self, ty: &TypeRef, filter: &MemberFilter) -> Vec<CatalogNode> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut nodes = Vec::new();
        let mut current = Some(ty.clone());
        let mut is_declaring_level = true;
        while let Some(level) = current {
            if let Some(declared) = self.members.get(&level.definition_name()) {
                for member in declared {
                    // Constructors are never inherited.
                    if !is_declaring_level && member.kind == MemberKind::Constructor {
                        continue;
                    }
                    if !filter.accepts(member.kind, member.is_static) {
                        continue;
                    }
                    // Derived declarations hide base ones with the same signature.
                    if !seen.insert(member.signature()) {
                        continue;
                    }
                    let symbol = if level.generic_args.is_empty() {
                        member.clone()
                    } else {
                        Arc::new(member.close_over(&level))
                    };
                    nodes.push(CatalogNode::member(MemberRef::new(symbol, ty.clone())));
                }
            }
            if filter.declared_only {
                break;
            }
            current = level.base.clone();
            is_declaring_level = false;
        }
        sort_nodes(&mut nodes);
        nodes
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn root_categories(&self, scope: &ScopeContext) -> Result<Vec<CatalogNode>> {
        let mut roots = Vec::new();
        if !self.inner.aliases.is_empty() {
            let mut aliases: Vec<CatalogNode> = self
                .inner
                .aliases
                .iter()
                .cloned()
                .map(CatalogNode::alias)
                .collect();
            sort_nodes(&mut aliases);
            roots.push(CatalogNode::category(GRAPH_CATEGORY_LABEL).with_children(aliases));
        }
        if !self.inner.actions.is_empty() {
            let mut actions: Vec<CatalogNode> = self
                .inner
                .actions
                .iter()
                .cloned()
                .map(CatalogNode::custom_action)
                .collect();
            sort_nodes(&mut actions);
            roots.push(CatalogNode::category(ACTIONS_CATEGORY_LABEL).with_children(actions));
        }

        let options = NamespaceOptions {
            include_global: scope.include_global,
            ignore_assembly_allowlist: false,
        };
        roots.extend(namespace_tree(self.inner.types_under(&scope.namespaces, options)));

        let registry = self.inner.clone();
        roots.push(CatalogNode::search_trigger(
            SEARCH_ALL_TYPES_LABEL,
            SearchTrigger::new(move |progress| Ok(namespace_tree(registry.sweep(progress)))),
        ));

        for root in &mut roots {
            root.assign_depths(0);
        }
        Ok(roots)
    }

    fn members_of(&self, ty: &TypeRef, filter: &MemberFilter) -> Result<Vec<CatalogNode>> {
        Ok(self.inner.members(ty, filter))
    }

    fn types_under_namespaces(
        &self,
        names: &[String],
        options: NamespaceOptions,
    ) -> Result<NamespaceMap> {
        Ok(self.inner.types_under(names, options))
    }

    fn all_types(&self, progress: &dyn ProgressSink) -> Result<NamespaceMap> {
        Ok(self.inner.sweep(progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::KindFilter;
    use crate::filter::MemberBinding;
    use crate::node::NodeKind;
    use crate::provider::NoProgress;
    use crate::symbol::GenericParam;
    use crate::symbol::Parameter;
    use crate::symbol::TypeSymbol;
    use pretty_assertions::assert_eq;

    fn sample() -> (InMemoryCatalog, TypeRef, TypeRef) {
        let int32 = TypeSymbol::structure("Int32").in_namespace("System").in_assembly("core").into_ref();
        let base = TypeSymbol::class("Component").in_namespace("Engine").in_assembly("engine").into_ref();
        let derived = TypeSymbol::class("Renderer")
            .in_namespace("Engine")
            .in_assembly("engine")
            .with_base(base.clone())
            .into_ref();
        let hidden = TypeSymbol::class("Secret").in_namespace("Private").in_assembly("private").into_ref();
        let loose = TypeSymbol::class("Loose").in_assembly("engine").into_ref();
        let catalog = InMemoryCatalog::builder()
            .add_type(int32.clone())
            .add_type(base.clone())
            .add_type(derived.clone())
            .add_type(hidden)
            .add_type(loose)
            .add_member(MemberSymbol::field(base.clone(), "enabled", int32.clone()))
            .add_member(MemberSymbol::constructor(base.clone(), Vec::new()))
            .add_member(MemberSymbol::method(base.clone(), "Reset", TypeSymbol::void(), Vec::new()))
            .add_member(MemberSymbol::constructor(derived.clone(), vec![Parameter::new("order", int32.clone())]))
            .add_member(MemberSymbol::method(derived.clone(), "Reset", TypeSymbol::void(), Vec::new()))
            .add_member(MemberSymbol::property(derived.clone(), "order", int32, true, false).with_static(true))
            .allow_assemblies(["core", "engine"])
            .build();
        (catalog, base, derived)
    }

    fn names(nodes: &[CatalogNode]) -> Vec<String> {
        nodes.iter().map(|n| n.display_name.clone()).collect()
    }

    #[test]
    fn inherited_members_are_listed_under_the_derived_type() {
        let (catalog, _base, derived) = sample();
        let nodes = catalog.members_of(&derived, &MemberFilter::default()).unwrap();
        assert_eq!(names(&nodes), vec!["new Renderer(Int32)", "enabled", "order", "Reset()"]);

        let NodeKind::Member(enabled) = &nodes[1].kind else {
            panic!("expected member");
        };
        assert_eq!(enabled.reflected_type.name, "Renderer");
        assert_eq!(enabled.symbol.declaring_type.name, "Component");
    }

    #[test]
    fn declared_only_and_binding_filters_apply() {
        let (catalog, _base, derived) = sample();
        let filter = MemberFilter {
            kind_filter: KindFilter::All,
            declared_only: true,
            binding: MemberBinding::Instance,
        };
        let nodes = catalog.members_of(&derived, &filter).unwrap();
        assert_eq!(names(&nodes), vec!["Reset()"]);
    }

    #[test]
    fn allowlist_limits_namespaces_unless_ignored() {
        let (catalog, _, _) = sample();
        let scoped = catalog
            .types_under_namespaces(&[], NamespaceOptions::default())
            .unwrap();
        let keys: Vec<String> = scoped.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["Engine", "System"]);

        let everything = catalog
            .types_under_namespaces(
                &[],
                NamespaceOptions {
                    include_global: true,
                    ignore_assembly_allowlist: true,
                },
            )
            .unwrap();
        let keys: Vec<String> = everything.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["(global)", "Engine", "Private", "System"]);
    }

    #[test]
    fn root_categories_end_with_search_trigger() {
        let (catalog, _, _) = sample();
        let roots = catalog.root_categories(&ScopeContext::everything()).unwrap();
        assert_eq!(names(&roots), vec!["(global)", "Engine", "System", SEARCH_ALL_TYPES_LABEL]);
        assert!(roots.iter().all(|r| !r.is_expanded()));

        let NodeKind::SearchTrigger(trigger) = &roots[3].kind else {
            panic!("expected trigger");
        };
        let swept = trigger.produce(&NoProgress).unwrap();
        assert_eq!(swept.len(), 4);
    }

    #[test]
    fn closed_generic_members_are_substituted() {
        let int32 = TypeSymbol::structure("Int32").in_namespace("System").into_ref();
        let list = TypeSymbol::class("List")
            .in_namespace("System.Collections.Generic")
            .with_generic_params(vec![GenericParam::new("T")])
            .into_ref();
        let catalog = InMemoryCatalog::builder()
            .add_type(list.clone())
            .add_member(MemberSymbol::property(
                list.clone(),
                "First",
                TypeSymbol::generic_parameter("T"),
                true,
                false,
            ))
            .build();
        let closed = list.make_generic(vec![int32]).unwrap();
        let nodes = catalog.members_of(&closed, &MemberFilter::default()).unwrap();
        let NodeKind::Member(first) = &nodes[0].kind else {
            panic!("expected member");
        };
        assert_eq!(first.symbol.value_type.display_name(), "Int32");
    }
}
