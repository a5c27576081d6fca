mod render;
mod resolve_cmd;
mod search_cmd;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use picker_catalog::CatalogManifest;
use picker_catalog::InMemoryCatalog;
use picker_catalog::KindFilter;
use picker_matcher::MatchMode;
use picker_session::PickerConfig;
use std::path::Path;
use std::path::PathBuf;

pub use resolve_cmd::ResolveArgs;
pub use search_cmd::SearchArgs;

/// Browse and resolve symbols from a JSON catalog.
#[derive(Debug, Parser)]
#[command(name = "picker", version)]
pub struct Cli {
    /// Catalog manifest (JSON)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,

    /// Picker settings (TOML)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Start from the `fast` or `thorough` preset instead of the defaults
    #[arg(long, value_name = "PRESET", global = true, conflicts_with = "config")]
    pub preset: Option<Preset>,

    #[command(subcommand)]
    pub command: PickerCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    Fast,
    Thorough,
}

#[derive(Debug, Subcommand)]
pub enum PickerCommand {
    /// Filter the catalog tree with a query
    Search(SearchArgs),

    /// Walk a path of names and print the reference it resolves to
    Resolve(ResolveArgs),

    /// Print the effective settings as TOML
    Config,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = self.load_config()?;
        match self.command {
            PickerCommand::Search(args) => {
                let catalog = load_catalog(self.catalog.as_deref())?;
                search_cmd::run(catalog, config, args)
            }
            PickerCommand::Resolve(args) => {
                let catalog = load_catalog(self.catalog.as_deref())?;
                resolve_cmd::run(catalog, config, args)
            }
            PickerCommand::Config => {
                let rendered = toml_string(&config)?;
                print!("{rendered}");
                Ok(())
            }
        }
    }

    fn load_config(&self) -> Result<PickerConfig> {
        if let Some(path) = &self.config {
            return PickerConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()));
        }
        Ok(match self.preset {
            Some(Preset::Fast) => PickerConfig::fast(),
            Some(Preset::Thorough) => PickerConfig::thorough(),
            None => PickerConfig::default(),
        })
    }
}

fn load_catalog(path: Option<&Path>) -> Result<InMemoryCatalog> {
    let path = path.context("A catalog is required (--catalog PATH)")?;
    let manifest = CatalogManifest::load(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    manifest
        .into_catalog()
        .with_context(|| format!("Invalid catalog {}", path.display()))
}

fn toml_string(config: &PickerConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config")
}

pub(crate) fn parse_mode(raw: &str) -> std::result::Result<MatchMode, String> {
    MatchMode::parse(raw).ok_or_else(|| format!("unknown match mode `{raw}`"))
}

pub(crate) fn parse_kind(raw: &str) -> std::result::Result<KindFilter, String> {
    KindFilter::parse(raw).ok_or_else(|| format!("unknown kind filter `{raw}`"))
}
