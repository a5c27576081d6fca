use crate::render;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use picker_catalog::CatalogNode;
use picker_catalog::InMemoryCatalog;
use picker_catalog::NodeKind;
use picker_catalog::ResolvedReference;
use picker_catalog::TypeRef;
use picker_navigation::StepOutcome;
use picker_navigation::TypeArgumentRequest;
use picker_session::CollectingSink;
use picker_session::PickerConfig;
use picker_session::PickerSession;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Parser)]
pub struct ResolveArgs {
    /// Names to walk, e.g. `System Int32 MaxValue`. Every name but the last
    /// is stepped into; the last one is selected. Namespaces and categories
    /// are looked through.
    #[arg(value_name = "NAME", required = true, num_args = 1..)]
    pub path: Vec<String>,

    /// Type arguments for open generics met along the way, in order
    #[arg(long = "type-arg", short = 't', value_name = "TYPE")]
    pub type_args: Vec<String>,

    /// Accept members that can be assigned to
    #[arg(long)]
    pub setter: bool,

    /// Print the reference as JSON
    #[arg(long)]
    pub json: bool,
}

pub(crate) fn run(catalog: InMemoryCatalog, mut config: PickerConfig, args: ResolveArgs) -> Result<()> {
    if args.setter {
        config.selection.setter = true;
    }
    config.preload_catalog = false;
    let mut session = PickerSession::open(
        Arc::new(catalog),
        config,
        Box::new(CollectingSink::new()),
    )
    .context("Failed to open picker")?;

    let reference = walk(&mut session, &args)?;
    if args.json {
        println!("{}", render::reference_json(&reference));
        return Ok(());
    }
    println!("{} {reference}", "✓".bright_green());
    if let Some(instance) = &reference.instance {
        println!("  instance: {}", render::instance_label(instance).bright_cyan());
    }
    Ok(())
}

fn walk(session: &mut PickerSession, args: &ResolveArgs) -> Result<ResolvedReference> {
    let mut type_args = args.type_args.iter();
    let last = args.path.len().saturating_sub(1);
    for (index, name) in args.path.iter().enumerate() {
        let node = named(session.current_tree(), name)
            .with_context(|| format!("No `{name}` under {}", scope_label(session)))?;
        if node.is_container() && index < last {
            continue;
        }
        let id = node.id;
        let mut outcome = if index == last {
            session.select(id)?
        } else {
            session.step_into(id)?
        };
        loop {
            match outcome {
                StepOutcome::Entered(members) => {
                    debug!("entered {name} ({} members)", members.len());
                    break;
                }
                StepOutcome::Resolved(reference) => return Ok(reference),
                StepOutcome::NeedsTypeArguments(request) => {
                    let wanted = type_args.next().with_context(|| missing_argument(&request))?;
                    let argument = type_argument(session, wanted, &request)?;
                    outcome = session.supply_type_argument(argument)?;
                }
            }
        }
    }
    anyhow::bail!("`{}` did not resolve to a reference", args.path.join(" "))
}

/// First node in depth-first order whose display name, or bare symbol
/// name, is `name`.
fn named<'a>(nodes: &'a [CatalogNode], name: &str) -> Option<&'a CatalogNode> {
    nodes.iter().find_map(|node| {
        let bare = match &node.kind {
            NodeKind::Type(ty) => Some(ty.name.as_str()),
            NodeKind::Member(member) => Some(member.symbol.name.as_str()),
            _ => None,
        };
        if node.display_name == name || bare == Some(name) {
            return Some(node);
        }
        if node.is_container() {
            return named(node.all_children(), name);
        }
        None
    })
}

fn type_argument(session: &mut PickerSession, wanted: &str, request: &TypeArgumentRequest) -> Result<TypeRef> {
    let choice = session.constraint_candidates()?;
    choice
        .candidates()
        .into_iter()
        .find(|ty| ty.name == wanted || ty.full_name() == wanted || ty.display_name() == wanted)
        .with_context(|| {
            format!(
                "`{wanted}` cannot close {} of {}",
                request.parameter, request.target
            )
        })
}

fn missing_argument(request: &TypeArgumentRequest) -> String {
    format!(
        "{} needs a type argument for {} ({} of {}); pass --type-arg",
        request.target,
        request.parameter,
        request.index + 1,
        request.total
    )
}

fn scope_label(session: &PickerSession) -> String {
    let crumbs = session.breadcrumb();
    if crumbs.is_empty() {
        "the root".to_string()
    } else {
        crumbs.join(" > ")
    }
}
