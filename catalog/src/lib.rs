pub mod error;
pub mod filter;
mod id;
pub mod manifest;
pub mod memory;
pub mod node;
pub mod provider;
pub mod reference;
mod sort;
pub mod symbol;

pub use error::CatalogError;
pub use error::Result;
pub use filter::KindFilter;
pub use filter::MemberBinding;
pub use filter::MemberFilter;
pub use filter::SelectionFilter;
pub use filter::TypeFilter;
pub use id::NodeId;
pub use manifest::CatalogManifest;
pub use memory::InMemoryCatalog;
pub use node::AliasSymbol;
pub use node::AliasTarget;
pub use node::CatalogNode;
pub use node::Children;
pub use node::CustomAction;
pub use node::LazyGroup;
pub use node::MemberRef;
pub use node::NodeKind;
pub use node::SearchTrigger;
pub use node::find_in;
pub use node::find_in_mut;
pub use provider::CatalogProvider;
pub use provider::NamespaceKey;
pub use provider::NamespaceMap;
pub use provider::NamespaceOptions;
pub use provider::NoProgress;
pub use provider::ProgressSink;
pub use provider::ScopeContext;
pub use reference::InstanceBinding;
pub use reference::PathSegment;
pub use reference::ResolvedReference;
pub use reference::SegmentTarget;
pub use sort::compare_nodes;
pub use sort::sort_nodes;
pub use symbol::GenericParam;
pub use symbol::MemberKind;
pub use symbol::MemberSymbol;
pub use symbol::Parameter;
pub use symbol::TypeFlavor;
pub use symbol::TypeRef;
pub use symbol::TypeSymbol;
