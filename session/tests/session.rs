use picker_catalog::CatalogError;
use picker_catalog::CatalogNode;
use picker_catalog::CatalogProvider;
use picker_catalog::GenericParam;
use picker_catalog::InMemoryCatalog;
use picker_catalog::MemberFilter;
use picker_catalog::MemberSymbol;
use picker_catalog::NamespaceMap;
use picker_catalog::NamespaceOptions;
use picker_catalog::NodeId;
use picker_catalog::ProgressSink;
use picker_catalog::ScopeContext;
use picker_catalog::SearchTrigger;
use picker_catalog::TypeRef;
use picker_catalog::TypeSymbol;
use picker_catalog::memory::SEARCH_ALL_TYPES_LABEL;
use picker_navigation::ConstraintChoice;
use picker_navigation::NavigationError;
use picker_navigation::StepOutcome;
use picker_session::CollectingSink;
use picker_session::PickerConfig;
use picker_session::PickerError;
use picker_session::PickerSession;
use picker_session::SinkEvent;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

const WAIT: Duration = Duration::from_secs(10);

struct World {
    catalog: InMemoryCatalog,
    int32: TypeRef,
    builder: TypeRef,
    baz: TypeRef,
    special: TypeRef,
}

fn world() -> World {
    let int32 = TypeSymbol::structure("Int32").in_namespace("System").into_ref();
    let builder = TypeSymbol::class("StringBuilder").in_namespace("System").into_ref();
    let baz = TypeSymbol::class("Baz").in_namespace("Game").into_ref();
    let special = TypeSymbol::class("SpecialBaz")
        .in_namespace("Game")
        .with_base(baz.clone())
        .into_ref();
    let pool = TypeSymbol::class("Pool")
        .in_namespace("Game")
        .with_generic_params(vec![GenericParam::new("T").with_constraint(baz.clone())])
        .into_ref();
    let catalog = InMemoryCatalog::builder()
        .add_type(int32.clone())
        .add_type(builder.clone())
        .add_type(baz.clone())
        .add_type(special.clone())
        .add_type(pool)
        .add_member(MemberSymbol::field(int32.clone(), "MaxValue", int32.clone()).with_static(true))
        .build();
    World {
        catalog,
        int32,
        builder,
        baz,
        special,
    }
}

fn quiet() -> PickerConfig {
    PickerConfig {
        preload_catalog: false,
        ..PickerConfig::default()
    }
}

/// Hand-picked roots and extra members over an in-memory catalog.
struct Scripted {
    inner: InMemoryCatalog,
    roots: Vec<CatalogNode>,
    extra_members: Vec<CatalogNode>,
    offline: bool,
}

impl Scripted {
    fn new(inner: InMemoryCatalog, roots: Vec<CatalogNode>) -> Self {
        Self {
            inner,
            roots,
            extra_members: Vec::new(),
            offline: false,
        }
    }
}

impl CatalogProvider for Scripted {
    fn root_categories(&self, _: &ScopeContext) -> picker_catalog::Result<Vec<CatalogNode>> {
        if self.offline {
            return Err(CatalogError::unavailable("roots", "offline"));
        }
        Ok(self.roots.clone())
    }

    fn members_of(&self, ty: &TypeRef, filter: &MemberFilter) -> picker_catalog::Result<Vec<CatalogNode>> {
        if self.offline {
            return Err(CatalogError::unavailable(ty.full_name(), "offline"));
        }
        let mut members = self.inner.members_of(ty, filter)?;
        members.extend(self.extra_members.iter().cloned());
        Ok(members)
    }

    fn types_under_namespaces(
        &self,
        names: &[String],
        options: NamespaceOptions,
    ) -> picker_catalog::Result<NamespaceMap> {
        self.inner.types_under_namespaces(names, options)
    }

    fn all_types(&self, progress: &dyn ProgressSink) -> picker_catalog::Result<NamespaceMap> {
        self.inner.all_types(progress)
    }
}

/// Trigger that reports progress and then blocks until released or
/// cancelled.
fn slow_trigger(found: Vec<CatalogNode>, released: Arc<AtomicBool>) -> CatalogNode {
    let trigger = SearchTrigger::new(move |progress| {
        progress.report(1, 4, "Scanning System");
        while !released.load(Ordering::SeqCst) && !progress.is_cancelled() {
            std::thread::sleep(Duration::from_millis(5));
        }
        Ok(found.clone())
    });
    CatalogNode::search_trigger("Slow search", trigger)
}

fn open(catalog: InMemoryCatalog, config: PickerConfig) -> (PickerSession, CollectingSink) {
    open_provider(catalog, config)
}

fn open_provider(
    provider: impl CatalogProvider + 'static,
    config: PickerConfig,
) -> (PickerSession, CollectingSink) {
    let sink = CollectingSink::new();
    let session = match PickerSession::open(Arc::new(provider), config, Box::new(sink.clone())) {
        Ok(session) => session,
        Err(err) => panic!("session failed to open: {err}"),
    };
    (session, sink)
}

fn render(nodes: &[CatalogNode]) -> Vec<String> {
    fn walk(node: &CatalogNode, lines: &mut Vec<String>) {
        let indent = "  ".repeat(node.depth.max(0) as usize);
        lines.push(format!("{indent}{}", node.display_name));
        for child in node.visible_children() {
            walk(child, lines);
        }
    }
    let mut lines = Vec::new();
    for node in nodes {
        walk(node, &mut lines);
    }
    lines
}

fn trees(events: &[SinkEvent]) -> Vec<Vec<String>> {
    events
        .iter()
        .filter_map(|event| match event {
            SinkEvent::TreeReady(nodes) => Some(render(nodes)),
            _ => None,
        })
        .collect()
}

/// Id of the first node named `name` in the current tree, collapsed
/// subtrees included.
fn id_of(session: &PickerSession, name: &str) -> NodeId {
    fn find(nodes: &[CatalogNode], name: &str) -> Option<NodeId> {
        nodes.iter().find_map(|node| {
            if node.display_name == name {
                Some(node.id)
            } else {
                find(node.all_children(), name)
            }
        })
    }
    find(session.current_tree(), name).unwrap_or_else(|| panic!("{name} is not in the current tree"))
}

fn collect_ids(nodes: &[CatalogNode], ids: &mut Vec<NodeId>) {
    for node in nodes {
        ids.push(node.id);
        collect_ids(node.all_children(), ids);
    }
}

/// Pumps until a progress event labelled `label` arrives. Returns every
/// progress label seen on the way.
fn pump_until_progress(session: &mut PickerSession, sink: &CollectingSink, label: &str) -> Vec<String> {
    let deadline = Instant::now() + WAIT;
    let mut labels = Vec::new();
    while !labels.iter().any(|seen| seen == label) {
        assert!(Instant::now() < deadline, "no `{label}` progress within {WAIT:?}, saw {labels:?}");
        session.pump().unwrap();
        labels.extend(sink.drain().into_iter().filter_map(|event| match event {
            SinkEvent::Progress { label, .. } => Some(label),
            _ => None,
        }));
        std::thread::sleep(Duration::from_millis(5));
    }
    labels
}

#[test]
fn opening_reports_the_root_tree() {
    let (session, sink) = open(world().catalog, quiet());
    assert_eq!(
        trees(&sink.drain()),
        vec![vec!["Game", "System", SEARCH_ALL_TYPES_LABEL]]
    );
    assert_eq!(session.current_tree().len(), 3);
    assert!(session.breadcrumb().is_empty());
    assert!(!session.is_closed());
}

#[test]
fn queries_deliver_filtered_trees_through_the_sink() {
    let world = world();
    let (mut session, sink) = open(world.catalog, quiet());
    sink.drain();

    session.set_query("strb").unwrap();
    assert!(session.wait(WAIT).unwrap());
    let delivered = trees(&sink.drain());
    assert_eq!(
        delivered.last().cloned(),
        Some(vec![
            "System".to_string(),
            "  StringBuilder".to_string(),
            SEARCH_ALL_TYPES_LABEL.to_string(),
        ])
    );

    let builder = id_of(&session, "StringBuilder");
    let spans = session.highlights(builder).unwrap();
    assert!(!spans.is_empty());
    assert_eq!(session.highlights(builder).unwrap(), spans);
    assert_eq!(session.state().highlights.len(), 1);

    session.set_query("").unwrap();
    assert_eq!(
        trees(&sink.drain()),
        vec![vec!["Game", "System", SEARCH_ALL_TYPES_LABEL]]
    );
    assert!(session.state().highlights.is_empty());
}

#[test]
fn expansion_survives_a_round_trip_through_a_type() {
    let world = world();
    let (mut session, _sink) = open(world.catalog, quiet());
    let system = id_of(&session, "System");

    session.toggle_expanded(system, true).unwrap();
    let visible: Vec<String> = session
        .visible_nodes()
        .iter()
        .map(|n| n.display_name.clone())
        .collect();
    assert_eq!(
        visible,
        vec!["Game", "System", "Int32", "StringBuilder", SEARCH_ALL_TYPES_LABEL]
    );

    let int32 = id_of(&session, "Int32");
    let StepOutcome::Entered(members) = session.step_into(int32).unwrap() else {
        panic!("expected to enter Int32");
    };
    assert_eq!(render(&members), vec!["MaxValue"]);
    assert_eq!(session.breadcrumb(), vec!["Int32"]);
    assert_eq!(render(session.current_tree()), vec!["MaxValue"]);

    session.back().unwrap();
    assert!(session.breadcrumb().is_empty());
    assert_eq!(
        render(session.current_tree()),
        vec![
            "Game",
            "System",
            "  Int32",
            "  StringBuilder",
            SEARCH_ALL_TYPES_LABEL
        ]
    );
}

#[test]
fn selecting_resolves_and_ends_the_session() {
    let world = world();
    let (mut session, sink) = open(world.catalog, quiet());
    session.step_into(id_of(&session, "Int32")).unwrap();
    let max_value = session.current_tree()[0].id;
    sink.drain();

    let StepOutcome::Resolved(reference) = session.select(max_value).unwrap() else {
        panic!("expected a resolved reference");
    };
    assert_eq!(reference.path(), "Int32.MaxValue");
    assert!(session.is_closed());

    let events = sink.drain();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], SinkEvent::Resolved(r) if r.path() == "Int32.MaxValue"));

    assert!(matches!(session.set_query("x"), Err(PickerError::SessionClosed)));
    session.close();
    assert!(sink.is_empty());
}

#[test]
fn closing_reports_cancellation_once() {
    let (mut session, sink) = open(world().catalog, quiet());
    session.set_query("int").unwrap();
    sink.drain();

    session.close();
    session.close();
    let cancelled = sink
        .drain()
        .iter()
        .filter(|event| matches!(event, SinkEvent::Cancelled))
        .count();
    assert_eq!(cancelled, 1);
    assert!(matches!(session.pump(), Err(PickerError::SessionClosed)));
    assert!(matches!(session.back(), Err(PickerError::SessionClosed)));
}

#[test]
fn open_generics_are_closed_from_constraint_candidates() {
    let world = world();
    let (mut session, _sink) = open(world.catalog, PickerConfig::default());

    let outcome = session.step_into(id_of(&session, "Pool")).unwrap();
    let StepOutcome::NeedsTypeArguments(request) = outcome else {
        panic!("expected a type argument request");
    };
    assert_eq!(request.target, "Pool<T>");

    let ConstraintChoice::Ambiguous(choices) = session.constraint_candidates().unwrap() else {
        panic!("expected several candidates");
    };
    let names: Vec<String> = choices.iter().map(|t| t.name.clone()).collect();
    assert_eq!(names, vec!["Baz", "SpecialBaz"]);
    assert_eq!(choices[0].full_name(), world.baz.full_name());

    let outcome = session.supply_type_argument(world.special).unwrap();
    assert!(matches!(outcome, StepOutcome::Entered(_)));
    assert_eq!(session.breadcrumb(), vec!["Pool<SpecialBaz>"]);
}

#[test]
fn unknown_nodes_and_bad_configs_are_rejected() {
    let (mut session, _sink) = open(world().catalog, quiet());
    let missing = NodeId(u64::MAX);
    assert!(matches!(
        session.toggle_expanded(missing, true),
        Err(PickerError::Navigation(NavigationError::UnknownNode(_)))
    ));
    assert!(matches!(
        session.step_into(missing),
        Err(PickerError::Navigation(NavigationError::UnknownNode(_)))
    ));

    let config = PickerConfig {
        max_progress_depths: 0,
        ..quiet()
    };
    let opened = PickerSession::open(
        Arc::new(world().catalog),
        config,
        Box::new(CollectingSink::new()),
    );
    assert!(matches!(opened, Err(PickerError::Config(_))));
}

#[test]
fn expanded_search_trigger_keeps_ids_unique() {
    let (mut session, _sink) = open(world().catalog, quiet());
    session
        .toggle_expanded(id_of(&session, SEARCH_ALL_TYPES_LABEL), true)
        .unwrap();
    session.set_query("strb").unwrap();
    assert!(session.wait(WAIT).unwrap());
    assert_eq!(
        render(session.current_tree()),
        vec![
            "System",
            "  StringBuilder",
            SEARCH_ALL_TYPES_LABEL,
            "  System",
            "    StringBuilder",
        ]
    );

    let mut ids = Vec::new();
    collect_ids(session.current_tree(), &mut ids);
    let unique: HashSet<NodeId> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());

    let nested_system = session.current_tree()[1].all_children()[0].id;
    session.toggle_expanded(nested_system, false).unwrap();
    assert_eq!(
        render(session.current_tree()),
        vec!["System", "  StringBuilder", SEARCH_ALL_TYPES_LABEL, "  System"]
    );
}

#[test]
fn running_passes_report_progress_through_the_sink() {
    let world = world();
    let released = Arc::new(AtomicBool::new(false));
    let provider = Scripted::new(
        world.catalog,
        vec![
            slow_trigger(vec![CatalogNode::type_node(world.builder)], Arc::clone(&released)),
            CatalogNode::type_node(world.int32),
        ],
    );
    let (mut session, sink) = open_provider(provider, quiet());
    session.toggle_expanded(id_of(&session, "Slow search"), true).unwrap();
    sink.drain();

    session.set_query("strb").unwrap();
    let labels = pump_until_progress(&mut session, &sink, "Scanning System");
    assert!(labels.iter().any(|label| label.starts_with("Searching: ")), "{labels:?}");
    assert!(session.is_searching());

    released.store(true, Ordering::SeqCst);
    assert!(session.wait(WAIT).unwrap());
    assert_eq!(render(session.current_tree()), vec!["Slow search", "  StringBuilder"]);
}

#[test]
fn stepping_in_mid_pass_never_delivers_the_old_scope() {
    let world = world();
    let released = Arc::new(AtomicBool::new(false));
    let provider = Scripted::new(
        world.catalog,
        vec![
            slow_trigger(vec![CatalogNode::type_node(world.int32.clone())], Arc::clone(&released)),
            CatalogNode::type_node(world.int32),
        ],
    );
    let (mut session, sink) = open_provider(provider, quiet());
    session.toggle_expanded(id_of(&session, "Slow search"), true).unwrap();
    session.set_query("int").unwrap();
    pump_until_progress(&mut session, &sink, "Scanning System");

    let StepOutcome::Entered(members) = session.step_into(id_of(&session, "Int32")).unwrap() else {
        panic!("expected to enter Int32");
    };
    assert_eq!(render(&members), vec!["MaxValue"]);
    released.store(true, Ordering::SeqCst);

    assert!(!session.wait(Duration::from_millis(300)).unwrap());
    assert!(!session.pump().unwrap());
    assert!(!session.is_searching());
    assert_eq!(trees(&sink.drain()), vec![vec!["MaxValue"]]);
    assert_eq!(render(session.current_tree()), vec!["MaxValue"]);
}

#[test]
fn provider_failures_leave_scopes_empty() {
    let world = world();
    let mut provider = Scripted::new(world.catalog, Vec::new());
    provider.offline = true;
    let (session, sink) = open_provider(provider, quiet());
    assert!(session.current_tree().is_empty());
    assert_eq!(trees(&sink.drain()), vec![Vec::<String>::new()]);
    assert!(!session.is_closed());
}

#[test]
fn unresolvable_selections_end_the_session() {
    let world = world();
    let mut provider = Scripted::new(world.catalog, vec![CatalogNode::type_node(world.int32)]);
    provider.extra_members = vec![CatalogNode::type_node(world.baz)];
    let (mut session, sink) = open_provider(provider, quiet());
    session.step_into(id_of(&session, "Int32")).unwrap();
    assert_eq!(render(session.current_tree()), vec!["MaxValue", "Baz"]);
    sink.drain();

    let baz = id_of(&session, "Baz");
    assert!(matches!(
        session.select(baz),
        Err(PickerError::Navigation(NavigationError::InvalidReferenceShape(_)))
    ));
    assert!(session.is_closed());
    assert!(session.breadcrumb().is_empty());
    assert!(sink.is_empty());
    assert!(matches!(session.set_query("x"), Err(PickerError::SessionClosed)));
}
