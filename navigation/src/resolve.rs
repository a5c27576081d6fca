//! Folds the drill stack plus the final selection into one
//! [`ResolvedReference`].
//!
//! The first element fixes the root. Ports, value constants, constructors
//! and composite references are complete references on their own: the fold
//! stops there and anything selected after them is ignored. Later
//! composites splice their segments in, everything else appends one
//! segment. When exactly one plain reflected member precedes an appended
//! element, that member's segment is rebound to its declaring type.

use crate::error::NavigationError;
use crate::error::Result;
use picker_catalog::AliasSymbol;
use picker_catalog::AliasTarget;
use picker_catalog::CatalogNode;
use picker_catalog::CustomAction;
use picker_catalog::InstanceBinding;
use picker_catalog::MemberKind;
use picker_catalog::MemberRef;
use picker_catalog::NodeKind;
use picker_catalog::PathSegment;
use picker_catalog::ResolvedReference;
use picker_catalog::SegmentTarget;
use picker_catalog::TypeRef;
use tracing::debug;

/// How an element took part in the fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// A reflected field, property or method bound to a concrete owner.
    Plain,
    /// Carries its own path or stands for a bound value.
    Composite,
    Other,
}

struct Fold {
    reference: ResolvedReference,
    roles: Vec<Role>,
    /// Segment index and declaring type of each `Plain` element.
    plain_segments: Vec<(usize, TypeRef)>,
    rebound: bool,
}

pub fn resolve(elements: &[CatalogNode]) -> Result<ResolvedReference> {
    let Some((first, rest)) = elements.split_first() else {
        return Err(NavigationError::InvalidReferenceShape(
            "nothing was selected".to_string(),
        ));
    };
    let mut fold = Fold::root(first)?;
    if is_complete_root(&first.kind) {
        if !rest.is_empty() {
            debug!("{} is a complete reference, {} later elements ignored", first.display_name, rest.len());
        }
        return Ok(fold.finish());
    }
    for element in rest {
        fold.rebind_single_plain();
        fold.append(element)?;
    }
    Ok(fold.finish())
}

impl Fold {
    fn root(node: &CatalogNode) -> Result<Self> {
        let empty = ResolvedReference {
            is_static: false,
            root_type: None,
            segments: Vec::new(),
            value_type: None,
            instance: None,
        };
        let mut fold = Self {
            reference: empty,
            roles: Vec::new(),
            plain_segments: Vec::new(),
            rebound: false,
        };
        match &node.kind {
            NodeKind::Type(ty) => {
                fold.reference.is_static = true;
                fold.reference.root_type = Some(ty.clone());
                fold.reference.value_type = Some(ty.clone());
                fold.roles.push(Role::Other);
            }
            NodeKind::Member(member) if member.symbol.kind == MemberKind::Constructor => {
                fold.reference.is_static = true;
                fold.reference.root_type = Some(member.symbol.declaring_type.clone());
                fold.push_segment(member_segment(member));
                fold.roles.push(Role::Composite);
            }
            NodeKind::Member(member) => {
                fold.reference.is_static = member.symbol.is_static;
                fold.reference.root_type = Some(member.reflected_type.clone());
                fold.push_member(member);
            }
            NodeKind::MemberAlias(alias) => fold.root_alias(alias),
            NodeKind::CustomAction(action) => {
                fold.reference.is_static = true;
                fold.push_segment(action_segment(action));
                fold.roles.push(Role::Other);
            }
            NodeKind::Category
            | NodeKind::Namespace(_)
            | NodeKind::GroupedLazy(_)
            | NodeKind::SearchTrigger(_) => return Err(container_in_path(node)),
        }
        Ok(fold)
    }

    fn root_alias(&mut self, alias: &AliasSymbol) {
        match &alias.target {
            AliasTarget::Composite(reference) => {
                self.reference = reference.clone();
                self.roles.push(Role::Composite);
            }
            AliasTarget::Port => {
                self.reference.root_type = alias.value_type.clone();
                self.reference.instance = alias.value_type.clone().map(InstanceBinding::Input);
                self.push_segment(alias_segment(alias, SegmentTarget::Port));
                self.roles.push(Role::Composite);
            }
            AliasTarget::ValueConstant(text) => {
                self.reference.is_static = true;
                self.reference.root_type = alias.value_type.clone();
                self.push_segment(alias_segment(alias, SegmentTarget::ValueConstant(text.clone())));
                self.roles.push(Role::Composite);
            }
            AliasTarget::Function => {
                self.reference.is_static = true;
                self.push_segment(alias_segment(alias, SegmentTarget::Function));
                self.roles.push(Role::Other);
            }
            AliasTarget::Variable | AliasTarget::Parameter => {
                self.push_named(alias);
            }
        }
    }

    fn append(&mut self, node: &CatalogNode) -> Result<()> {
        match &node.kind {
            NodeKind::Member(member) => self.push_member(member),
            NodeKind::MemberAlias(alias) => match &alias.target {
                AliasTarget::Composite(reference) => {
                    self.reference.segments.extend(reference.segments.iter().cloned());
                    self.reference.value_type = reference.value_type.clone();
                    if let Some(instance) = &reference.instance {
                        self.capture_instance(instance.clone());
                    }
                    self.roles.push(Role::Composite);
                }
                AliasTarget::Port => {
                    self.push_segment(alias_segment(alias, SegmentTarget::Port));
                    self.roles.push(Role::Composite);
                }
                AliasTarget::ValueConstant(text) => {
                    self.push_segment(alias_segment(alias, SegmentTarget::ValueConstant(text.clone())));
                    self.roles.push(Role::Composite);
                }
                AliasTarget::Function => {
                    self.push_segment(alias_segment(alias, SegmentTarget::Function));
                    self.roles.push(Role::Other);
                }
                AliasTarget::Variable | AliasTarget::Parameter => self.push_named(alias),
            },
            NodeKind::CustomAction(action) => {
                self.push_segment(action_segment(action));
                self.roles.push(Role::Other);
            }
            NodeKind::Type(ty) => {
                return Err(NavigationError::InvalidReferenceShape(format!(
                    "type {} can only start a reference",
                    ty.display_name()
                )));
            }
            NodeKind::Category
            | NodeKind::Namespace(_)
            | NodeKind::GroupedLazy(_)
            | NodeKind::SearchTrigger(_) => return Err(container_in_path(node)),
        }
        Ok(())
    }

    fn push_member(&mut self, member: &MemberRef) {
        let segment = member_segment(member);
        let plain = segment.target.is_reflected_member() && member.symbol.kind != MemberKind::Constructor;
        self.push_segment(segment);
        if plain {
            let index = self.reference.segments.len() - 1;
            self.plain_segments.push((index, member.symbol.declaring_type.clone()));
            self.roles.push(Role::Plain);
        } else {
            self.roles.push(Role::Other);
        }
    }

    fn push_named(&mut self, alias: &AliasSymbol) {
        let target = match alias.target {
            AliasTarget::Parameter => SegmentTarget::Parameter,
            _ => SegmentTarget::Variable,
        };
        self.push_segment(alias_segment(alias, target));
        self.capture_instance(InstanceBinding::Named {
            name: alias.name.clone(),
            value_type: alias.value_type.clone(),
        });
        self.roles.push(Role::Other);
    }

    fn push_segment(&mut self, segment: PathSegment) {
        self.reference.value_type = segment.value_type.clone();
        self.reference.segments.push(segment);
    }

    fn capture_instance(&mut self, instance: InstanceBinding) {
        if !self.reference.is_static && self.reference.instance.is_none() {
            self.reference.instance = Some(instance);
        }
    }

    /// Rebinds the segment of the single plain member seen so far to the
    /// member's declaring type, so inherited members picked from a derived
    /// root keep resolving.
    fn rebind_single_plain(&mut self) {
        if self.rebound || self.roles.contains(&Role::Composite) {
            return;
        }
        let [(index, declaring)] = self.plain_segments.as_slice() else {
            return;
        };
        if let Some(segment) = self.reference.segments.get_mut(*index) {
            segment.bound_type = Some(declaring.clone());
        }
        self.rebound = true;
    }

    fn finish(mut self) -> ResolvedReference {
        if self.reference.instance.is_none()
            && !self.reference.is_static
            && let Some(root) = &self.reference.root_type
        {
            self.reference.instance = Some(InstanceBinding::Input(root.clone()));
        }
        self.reference
    }
}

fn is_complete_root(kind: &NodeKind) -> bool {
    match kind {
        NodeKind::Member(member) => member.symbol.kind == MemberKind::Constructor,
        NodeKind::MemberAlias(alias) => matches!(
            alias.target,
            AliasTarget::Composite(_) | AliasTarget::Port | AliasTarget::ValueConstant(_)
        ),
        _ => false,
    }
}

fn member_segment(member: &MemberRef) -> PathSegment {
    let symbol = &member.symbol;
    let mut segment = PathSegment::new(symbol.name.clone(), SegmentTarget::Member(symbol.kind));
    segment.bound_type = Some(member.reflected_type.clone());
    segment.value_type = Some(symbol.value_type.clone());
    segment.generic_args = symbol.generic_args.clone();
    segment.is_static = symbol.is_static;
    segment
}

fn alias_segment(alias: &AliasSymbol, target: SegmentTarget) -> PathSegment {
    let mut segment = PathSegment::new(alias.name.clone(), target);
    segment.value_type = alias.value_type.clone();
    segment
}

fn action_segment(action: &CustomAction) -> PathSegment {
    let mut segment = PathSegment::new(action.label.clone(), SegmentTarget::Action(action.key.clone()));
    segment.value_type = action.value_type.clone();
    segment.is_static = true;
    segment
}

fn container_in_path(node: &CatalogNode) -> NavigationError {
    NavigationError::InvalidReferenceShape(format!(
        "{} groups other nodes and cannot be part of a reference",
        node.display_name
    ))
}
