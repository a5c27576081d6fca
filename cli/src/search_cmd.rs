use crate::parse_kind;
use crate::parse_mode;
use crate::render;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use picker_catalog::InMemoryCatalog;
use picker_catalog::KindFilter;
use picker_matcher::MatchMode;
use picker_session::CollectingSink;
use picker_session::PickerConfig;
use picker_session::PickerSession;
use picker_session::SinkEvent;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Query; a trailing `[]` asks for array types, dots qualify names
    #[arg(value_name = "QUERY", default_value = "")]
    pub query: String,

    /// contains, starts_with, equals, ends_with or relevant
    #[arg(long, short = 'm', value_parser = parse_mode)]
    pub mode: Option<MatchMode>,

    /// all, function, variable, property or type
    #[arg(long, short = 'k', value_parser = parse_kind)]
    pub kind: Option<KindFilter>,

    /// Do not search inside unexpanded types
    #[arg(long)]
    pub shallow: bool,

    /// Give up on the search after this many milliseconds
    #[arg(long, value_name = "MS", default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Print matches as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Report search progress on stderr
    #[arg(long, short = 'p')]
    pub progress: bool,
}

pub(crate) fn run(catalog: InMemoryCatalog, mut config: PickerConfig, args: SearchArgs) -> Result<()> {
    if let Some(mode) = args.mode {
        config.match_mode = mode;
    }
    if let Some(kind) = args.kind {
        config.kind_filter = kind;
    }
    if args.shallow {
        config.deep_member_search = false;
    }
    config.preload_catalog = false;

    let sink = CollectingSink::new();
    let mut session = PickerSession::open(Arc::new(catalog), config, Box::new(sink.clone()))
        .context("Failed to open picker")?;
    session.set_query(&args.query)?;

    let started = Instant::now();
    let deadline = started + Duration::from_millis(args.timeout_ms);
    while session.is_searching() {
        if Instant::now() >= deadline {
            session.close();
            anyhow::bail!("Search for {:?} did not finish within {}ms", args.query, args.timeout_ms);
        }
        session.wait(Duration::from_millis(50))?;
        if args.progress {
            report_progress(&sink.drain());
        }
    }
    session.pump()?;
    debug!("search for {:?} took {:?}", args.query, started.elapsed());

    let color = !args.json && render::use_color();
    let ids: Vec<_> = session.visible_nodes().iter().map(|node| node.id).collect();
    let spans = ids
        .into_iter()
        .map(|id| session.highlights(id))
        .collect::<picker_session::Result<Vec<_>>>()?;
    let lines: Vec<String> = session
        .visible_nodes()
        .into_iter()
        .zip(&spans)
        .map(|(node, spans)| {
            if args.json {
                render::node_json(node, spans).to_string()
            } else {
                render::tree_line(node, spans, color)
            }
        })
        .collect();

    if lines.is_empty() && !args.json {
        println!("{} No matches for {:?}", "✗".bright_red(), args.query);
    }
    for line in lines {
        println!("{line}");
    }
    session.close();
    Ok(())
}

fn report_progress(events: &[SinkEvent]) {
    for event in events {
        if let SinkEvent::Progress { depth, fraction, label } = event {
            eprintln!("{} {label} ({:.0}%)", format!("[{depth}]").dimmed(), fraction * 100.0);
        }
    }
}
