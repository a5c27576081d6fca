use picker_catalog::CatalogError;
use picker_navigation::NavigationError;
use picker_search::SearchError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PickerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("Picker session is closed")]
    SessionClosed,

    #[error("Invalid picker config: {0}")]
    Config(String),

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PickerError>;
