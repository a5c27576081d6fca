use crate::error::PickerError;
use crate::error::Result;
use picker_catalog::KindFilter;
use picker_catalog::ScopeContext;
use picker_catalog::SelectionFilter;
use picker_matcher::MatchMode;
use picker_matcher::RelevanceWeights;
use picker_search::SearchOptions;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;

/// Settings of a picker session, usually read from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerConfig {
    /// Initial match mode for queries
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Initial kind filter for queries
    #[serde(default)]
    pub kind_filter: KindFilter,

    /// Search inside unexpanded types during a pass
    #[serde(default = "default_true")]
    pub deep_member_search: bool,

    /// Matchable query characters needed before types are searched inside
    #[serde(default = "default_min_deep_search_len")]
    pub min_deep_search_len: usize,

    /// Number of depth progress cells reported while searching
    #[serde(default = "default_max_progress_depths")]
    pub max_progress_depths: usize,

    /// Sweep every type in the background when the session opens
    #[serde(default = "default_true")]
    pub preload_catalog: bool,

    #[serde(default)]
    pub weights: RelevanceWeights,

    #[serde(default)]
    pub scope: ScopeConfig,

    #[serde(default)]
    pub selection: SelectionConfig,
}

/// Namespaces listed at the root of the picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Empty means every namespace
    #[serde(default)]
    pub namespaces: Vec<String>,

    #[serde(default = "default_true")]
    pub include_global: bool,
}

/// What the consumer accepts as the final pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_true")]
    pub accept_values: bool,

    #[serde(default)]
    pub allow_type_selection: bool,

    /// Pick something that can be assigned to instead of read
    #[serde(default)]
    pub setter: bool,

    #[serde(default)]
    pub min_params: usize,

    #[serde(default)]
    pub max_params: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_min_deep_search_len() -> usize {
    3
}

fn default_max_progress_depths() -> usize {
    4
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::default(),
            kind_filter: KindFilter::default(),
            deep_member_search: true,
            min_deep_search_len: default_min_deep_search_len(),
            max_progress_depths: default_max_progress_depths(),
            preload_catalog: true,
            weights: RelevanceWeights::default(),
            scope: ScopeConfig::default(),
            selection: SelectionConfig::default(),
        }
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            namespaces: Vec::new(),
            include_global: true,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            accept_values: true,
            allow_type_selection: false,
            setter: false,
            min_params: 0,
            max_params: None,
        }
    }
}

impl PickerConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate().map_err(PickerError::Config)?;

        if self.max_progress_depths == 0 {
            return Err(PickerError::Config(
                "max_progress_depths must be > 0".to_string(),
            ));
        }

        if let Some(max) = self.selection.max_params
            && max < self.selection.min_params
        {
            return Err(PickerError::Config(format!(
                "selection.max_params ({max}) cannot be below selection.min_params ({})",
                self.selection.min_params
            )));
        }

        if self.scope.namespaces.iter().any(|ns| ns.trim().is_empty()) {
            return Err(PickerError::Config(
                "scope.namespaces must not contain empty names".to_string(),
            ));
        }

        Ok(())
    }

    /// Shallow searches only; suited to very large catalogs.
    pub fn fast() -> Self {
        Self {
            deep_member_search: false,
            max_progress_depths: 2,
            preload_catalog: false,
            ..Default::default()
        }
    }

    /// Searches inside types from the first typed character.
    pub fn thorough() -> Self {
        Self {
            deep_member_search: true,
            min_deep_search_len: 1,
            max_progress_depths: 8,
            ..Default::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| PickerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            deep_member_search: self.deep_member_search,
            min_deep_search_len: self.min_deep_search_len,
            max_progress_depths: self.max_progress_depths,
            weights: self.weights,
        }
    }

    pub fn selection_filter(&self) -> SelectionFilter {
        let base = if self.selection.setter {
            SelectionFilter::setter()
        } else {
            SelectionFilter::default()
        };
        SelectionFilter {
            accept_values: self.selection.accept_values,
            allow_type_selection: self.selection.allow_type_selection,
            ..base
        }
        .with_kind_filter(self.kind_filter)
        .with_arity(
            self.selection.min_params,
            self.selection.max_params.unwrap_or(usize::MAX),
        )
    }

    pub fn scope_context(&self) -> ScopeContext {
        ScopeContext {
            namespaces: self.scope.namespaces.clone(),
            include_global: self.scope.include_global,
        }
    }
}
