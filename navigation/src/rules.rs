//! Selectability and steppability of catalog nodes. Both are pure functions
//! of the node kind and the active [`SelectionFilter`].

use picker_catalog::AliasSymbol;
use picker_catalog::AliasTarget;
use picker_catalog::KindFilter;
use picker_catalog::MemberKind;
use picker_catalog::MemberSymbol;
use picker_catalog::NodeKind;
use picker_catalog::SelectionFilter;
use picker_catalog::TypeFlavor;
use picker_catalog::TypeSymbol;

pub fn is_selectable(kind: &NodeKind, filter: &SelectionFilter) -> bool {
    match kind {
        NodeKind::Category
        | NodeKind::Namespace(_)
        | NodeKind::GroupedLazy(_)
        | NodeKind::SearchTrigger(_) => false,
        NodeKind::Type(_) => {
            filter.kind_filter.accepts_types() && (filter.accept_values || filter.allow_type_selection)
        }
        NodeKind::Member(member) => member_selectable(&member.symbol, filter),
        NodeKind::CustomAction(action) => action.is_selectable(filter),
        NodeKind::MemberAlias(alias) => alias_selectable(alias, filter),
    }
}

pub fn is_steppable(kind: &NodeKind) -> bool {
    match kind {
        NodeKind::Category
        | NodeKind::Namespace(_)
        | NodeKind::GroupedLazy(_)
        | NodeKind::SearchTrigger(_) => false,
        NodeKind::Type(ty) => !ty.is_enum(),
        NodeKind::Member(member) => member_steppable(&member.symbol),
        NodeKind::CustomAction(action) => action.steppable,
        NodeKind::MemberAlias(alias) => alias.steppable,
    }
}

fn member_selectable(symbol: &MemberSymbol, filter: &SelectionFilter) -> bool {
    if !filter.kind_filter.accepts_member(symbol.kind) {
        return false;
    }
    match symbol.kind {
        MemberKind::Field => true,
        MemberKind::Property => {
            (!filter.require_get || symbol.can_read) && (!filter.require_set || symbol.can_write)
        }
        MemberKind::Method | MemberKind::Constructor => {
            !filter.require_set && filter.accepts_arity(symbol.arity())
        }
        MemberKind::Event => false,
        MemberKind::NestedType => {
            !filter.require_set && (filter.accept_values || filter.allow_type_selection)
        }
    }
}

fn member_steppable(symbol: &MemberSymbol) -> bool {
    match symbol.kind {
        MemberKind::Field | MemberKind::Method | MemberKind::Constructor => {
            exposes_members(&symbol.value_type)
        }
        // Write-only properties have no value to step through.
        MemberKind::Property => symbol.can_read && exposes_members(&symbol.value_type),
        MemberKind::Event => false,
        MemberKind::NestedType => !symbol.value_type.is_enum(),
    }
}

fn alias_selectable(alias: &AliasSymbol, filter: &SelectionFilter) -> bool {
    let kind_ok = match &alias.target {
        AliasTarget::Function => matches!(filter.kind_filter, KindFilter::All | KindFilter::Function),
        AliasTarget::Variable | AliasTarget::Parameter => {
            matches!(filter.kind_filter, KindFilter::All | KindFilter::Variable)
        }
        AliasTarget::Port | AliasTarget::ValueConstant(_) | AliasTarget::Composite(_) => {
            filter.kind_filter == KindFilter::All
        }
    };
    let writable = !matches!(alias.target, AliasTarget::Function | AliasTarget::ValueConstant(_));
    kind_ok && (!filter.require_set || writable)
}

/// Whether stepping into a value of `ty` would list anything.
pub fn exposes_members(ty: &TypeSymbol) -> bool {
    !ty.is_void() && !ty.is_enum() && ty.flavor != TypeFlavor::GenericParameter
}

#[cfg(test)]
mod tests {
    use super::*;
    use picker_catalog::CustomAction;
    use picker_catalog::MemberRef;
    use picker_catalog::Parameter;
    use picker_catalog::TypeRef;
    use std::sync::Arc;

    fn int32() -> TypeRef {
        TypeSymbol::structure("Int32").in_namespace("System").into_ref()
    }

    fn widget() -> TypeRef {
        TypeSymbol::class("Widget").in_namespace("Engine").into_ref()
    }

    fn member(symbol: MemberSymbol) -> NodeKind {
        NodeKind::Member(MemberRef::declared(symbol.into_ref()))
    }

    #[test]
    fn enums_are_terminal() {
        let color = TypeSymbol::enumeration("Color").into_ref();
        assert!(!is_steppable(&NodeKind::Type(color.clone())));
        assert!(is_steppable(&NodeKind::Type(widget())));
        assert!(!is_steppable(&member(MemberSymbol::field(widget(), "tint", color))));
    }

    #[test]
    fn void_methods_cannot_be_stepped_into() {
        let reset = MemberSymbol::method(widget(), "Reset", TypeSymbol::void(), Vec::new());
        let size = MemberSymbol::method(widget(), "Size", int32(), Vec::new());
        assert!(!is_steppable(&member(reset)));
        assert!(is_steppable(&member(size)));
    }

    #[test]
    fn property_access_follows_the_filter() {
        let write_only = MemberSymbol::property(widget(), "Secret", int32(), false, true);
        let read_only = MemberSymbol::property(widget(), "Count", int32(), true, false);

        let getter = SelectionFilter::default();
        assert!(!is_selectable(&member(write_only.clone()), &getter));
        assert!(is_selectable(&member(read_only.clone()), &getter));
        assert!(!is_steppable(&member(write_only.clone())));

        let setter = SelectionFilter::setter();
        assert!(is_selectable(&member(write_only), &setter));
        assert!(!is_selectable(&member(read_only), &setter));
    }

    #[test]
    fn method_arity_must_fit() {
        let parse = MemberSymbol::method(
            int32(),
            "Parse",
            int32(),
            vec![Parameter::new("s", TypeSymbol::class("String").into_ref())],
        );
        let filter = SelectionFilter::default().with_arity(0, 0);
        assert!(!is_selectable(&member(parse.clone()), &filter));
        assert!(is_selectable(&member(parse.clone()), &SelectionFilter::default().with_arity(1, 2)));
        assert!(!is_selectable(
            &member(parse),
            &SelectionFilter::default().with_kind_filter(KindFilter::Variable)
        ));
    }

    #[test]
    fn types_need_value_or_type_selection() {
        let filter = SelectionFilter {
            accept_values: false,
            ..SelectionFilter::default()
        };
        assert!(!is_selectable(&NodeKind::Type(widget()), &filter));
        let filter = SelectionFilter {
            allow_type_selection: true,
            ..filter
        };
        assert!(is_selectable(&NodeKind::Type(widget()), &filter));
    }

    #[test]
    fn actions_and_aliases_use_their_own_rules() {
        let action = CustomAction::new("create", "Create variable")
            .with_predicate(|filter: &SelectionFilter| filter.require_set);
        let kind = NodeKind::CustomAction(Arc::new(action));
        assert!(!is_selectable(&kind, &SelectionFilter::default()));
        assert!(is_selectable(&kind, &SelectionFilter::setter()));
        assert!(!is_steppable(&kind));

        let function = NodeKind::MemberAlias(Arc::new(AliasSymbol::new(
            "spawn",
            AliasTarget::Function,
            Some(widget()),
        )));
        assert!(is_selectable(
            &function,
            &SelectionFilter::default().with_kind_filter(KindFilter::Function)
        ));
        assert!(!is_selectable(&function, &SelectionFilter::setter()));
        assert!(is_steppable(&function));

        let constant = NodeKind::MemberAlias(Arc::new(AliasSymbol::new(
            "zero",
            AliasTarget::ValueConstant("0".to_string()),
            Some(int32()),
        )));
        assert!(!is_selectable(
            &constant,
            &SelectionFilter::default().with_kind_filter(KindFilter::Variable)
        ));
    }

    #[test]
    fn containers_are_neither() {
        let kind = NodeKind::Category;
        assert!(!is_selectable(&kind, &SelectionFilter::default()));
        assert!(!is_steppable(&kind));
    }
}
