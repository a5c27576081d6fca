use crate::symbol::MemberKind;
use crate::symbol::TypeRef;
use std::fmt;

/// What a single path segment binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentTarget {
    Member(MemberKind),
    Type,
    Variable,
    Function,
    Parameter,
    Port,
    ValueConstant(String),
    Action(String),
}

impl SegmentTarget {
    /// Plain reflected members; these bind against a concrete owner type and
    /// are the only targets the declaring-type rewrite applies to.
    pub fn is_reflected_member(&self) -> bool {
        matches!(
            self,
            Self::Member(
                MemberKind::Field | MemberKind::Property | MemberKind::Method | MemberKind::Constructor
            )
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    pub target: SegmentTarget,
    /// Type the segment is looked up on.
    pub bound_type: Option<TypeRef>,
    /// Type of the value the segment produces.
    pub value_type: Option<TypeRef>,
    pub generic_args: Vec<TypeRef>,
    pub is_static: bool,
}

impl PathSegment {
    pub fn new(name: impl Into<String>, target: SegmentTarget) -> Self {
        Self {
            name: name.into(),
            target,
            bound_type: None,
            value_type: None,
            generic_args: Vec::new(),
            is_static: false,
        }
    }
}

/// Where the value at the root of a non-static path comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceBinding {
    /// Supplied by the consumer (typically an input port) of this type.
    Input(TypeRef),
    /// Anchored on a named domain object such as a graph variable.
    Named {
        name: String,
        value_type: Option<TypeRef>,
    },
}

/// The composite, type-checked output of a picker session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub is_static: bool,
    pub root_type: Option<TypeRef>,
    pub segments: Vec<PathSegment>,
    pub value_type: Option<TypeRef>,
    pub instance: Option<InstanceBinding>,
}

impl ResolvedReference {
    pub fn segment_names(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn path(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.segments.len() + 1);
        if let Some(root) = &self.root_type
            && self.is_static
        {
            parts.push(root.display_name());
        }
        parts.extend(self.segments.iter().map(|s| s.name.clone()));
        parts.join(".")
    }
}

impl fmt::Display for ResolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())?;
        if let Some(value_type) = &self.value_type {
            write!(f, " : {}", value_type.display_name())?;
        }
        Ok(())
    }
}
