use std::fmt::Display;

use thiserror::Error;

/// Errors raised by catalog providers and the manifest loader.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A provider call failed; callers treat the affected subtree as empty.
    #[error("Catalog provider unavailable while {context}: {message}")]
    ProviderUnavailable { context: String, message: String },

    /// A type reference could not be resolved against the catalog
    #[error("Unknown type reference: {0}")]
    UnknownType(String),

    /// A base-type or constraint chain refers back to itself
    #[error("Cyclic type hierarchy at {0}")]
    CyclicType(String),

    /// Structurally invalid manifest content
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn unavailable(context: impl Into<String>, message: impl Display) -> Self {
        Self::ProviderUnavailable {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
