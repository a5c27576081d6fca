use picker_catalog::CatalogError;
use picker_catalog::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavigationError {
    /// The drill stack cannot be folded into a reference. Fatal to the
    /// session that produced it.
    #[error("Invalid reference shape: {0}")]
    InvalidReferenceShape(String),

    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("Cannot step into {0}")]
    NotSteppable(String),

    #[error("Cannot select {0}")]
    NotSelectable(String),

    #[error("Type {argument} does not satisfy the constraints of {parameter}")]
    ConstraintViolation { parameter: String, argument: String },

    #[error("No generic resolution is pending")]
    NoPendingResolution,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, NavigationError>;
