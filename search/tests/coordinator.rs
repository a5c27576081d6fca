use picker_catalog::CatalogError;
use picker_catalog::CatalogNode;
use picker_catalog::CustomAction;
use picker_catalog::GenericParam;
use picker_catalog::InMemoryCatalog;
use picker_catalog::LazyGroup;
use picker_catalog::MemberSymbol;
use picker_catalog::NamespaceKey;
use picker_catalog::Parameter;
use picker_catalog::SearchTrigger;
use picker_catalog::TypeRef;
use picker_catalog::TypeSymbol;
use picker_matcher::Matcher;
use picker_matcher::RelevanceWeights;
use picker_matcher::SearchQuery;
use picker_matcher::Span;
use picker_search::SearchCoordinator;
use picker_search::SearchOptions;
use picker_search::SearchState;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

const WAIT: Duration = Duration::from_secs(10);

fn class(name: &str, namespace: &str) -> TypeRef {
    TypeSymbol::class(name).in_namespace(namespace).into_ref()
}

fn namespace(name: &str, types: Vec<TypeRef>) -> CatalogNode {
    let children = types.into_iter().map(CatalogNode::type_node).collect();
    let mut node = CatalogNode::namespace(NamespaceKey::Named(name.to_string())).with_children(children);
    node.assign_depths(0);
    node
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

fn coordinator(catalog: InMemoryCatalog) -> SearchCoordinator {
    SearchCoordinator::new(Arc::new(catalog), SearchOptions::default())
}

#[test]
fn strb_keeps_only_string_builder_inside_a_huge_namespace() {
    let mut types: Vec<TypeRef> = (0..4999).map(|i| class(&format!("Type{i:04}"), "System")).collect();
    types.insert(2500, class("StringBuilder", "System"));
    let snapshot = Arc::new(vec![namespace("System", types)]);

    let coordinator = coordinator(InMemoryCatalog::default());
    coordinator
        .start(Arc::clone(&snapshot), SearchQuery::parse("strb"))
        .unwrap();
    let delivery = coordinator.wait(WAIT).unwrap();

    assert_eq!(render(&delivery.nodes), vec!["System", "  StringBuilder"]);
    assert!(delivery.nodes[0].is_expanded());

    let original = &snapshot[0];
    assert!(!original.is_expanded());
    assert!(original.visible_children().is_empty());
    assert_eq!(original.all_children().len(), 5000);
}

#[test]
fn a_superseded_pass_never_delivers() {
    let calls = Arc::new(AtomicUsize::new(0));
    let trigger_calls = Arc::clone(&calls);
    let trigger = SearchTrigger::new(move |progress| {
        if trigger_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            let deadline = Instant::now() + WAIT;
            while !progress.is_cancelled() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(2));
            }
        }
        Ok(vec![
            CatalogNode::type_node(class("StringBuilder", "System.Text")),
            CatalogNode::type_node(TypeSymbol::structure("Int32").in_namespace("System").into_ref()),
        ])
    });
    let snapshot = Arc::new(vec![
        CatalogNode::search_trigger("Search all types", trigger).expanded(),
    ]);

    let coordinator = coordinator(InMemoryCatalog::default());
    let first = coordinator
        .start(Arc::clone(&snapshot), SearchQuery::parse("strb"))
        .unwrap();
    let deadline = Instant::now() + WAIT;
    while calls.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(coordinator.state(), SearchState::Searching);

    let second = coordinator.start(snapshot, SearchQuery::parse("int")).unwrap();
    assert!(second > first);

    let delivery = coordinator.wait(WAIT).unwrap();
    assert_eq!(delivery.generation, second);
    assert_eq!(delivery.query.raw, "int");
    assert_eq!(render(&delivery.nodes), vec!["Search all types", "  Int32"]);

    thread::sleep(Duration::from_millis(50));
    assert!(coordinator.poll().is_none());
    assert_eq!(coordinator.state(), SearchState::Delivered);
}

#[test]
fn cancelling_discards_the_running_pass() {
    let trigger = SearchTrigger::new(|progress| {
        let deadline = Instant::now() + WAIT;
        while !progress.is_cancelled() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        Ok(Vec::new())
    });
    let snapshot = Arc::new(vec![CatalogNode::search_trigger("Search all types", trigger).expanded()]);
    let coordinator = coordinator(InMemoryCatalog::default());
    coordinator.start(snapshot, SearchQuery::parse("abc")).unwrap();
    coordinator.cancel();

    assert_eq!(coordinator.state(), SearchState::Cancelled);
    assert!(coordinator.wait(Duration::from_millis(100)).is_none());
    thread::sleep(Duration::from_millis(50));
    assert!(coordinator.poll().is_none());
}

fn sample_tree(expanded: bool) -> Vec<CatalogNode> {
    let mut roots = vec![
        namespace(
            "Engine",
            vec![class("Renderer", "Engine"), class("StreamReader", "Engine"), class("Camera", "Engine")],
        ),
        namespace(
            "System.Text",
            vec![class("StringBuilder", "System.Text"), class("Encoding", "System.Text")],
        ),
        CatalogNode::category("Actions")
            .with_children(vec![CatalogNode::custom_action(CustomAction::new("sr", "Set Reference"))]),
    ];
    if expanded {
        for root in &mut roots {
            root.toggle_expanded(true);
        }
    }
    roots
}

#[test]
fn collapsed_and_expanded_trees_give_the_same_matches() {
    let coordinator = coordinator(InMemoryCatalog::default());
    coordinator
        .start(Arc::new(sample_tree(false)), SearchQuery::parse("sr"))
        .unwrap();
    let collapsed = coordinator.wait(WAIT).unwrap();

    coordinator
        .start(Arc::new(sample_tree(true)), SearchQuery::parse("sr"))
        .unwrap();
    let expanded = coordinator.wait(WAIT).unwrap();

    assert_eq!(render(&collapsed.nodes), render(&expanded.nodes));
    assert_eq!(
        render(&collapsed.nodes),
        vec![
            "Engine",
            "  StreamReader",
            "System.Text",
            "  StringBuilder",
            "Actions",
            "  Set Reference",
        ]
    );
}

#[test]
fn repeated_queries_are_idempotent() {
    let coordinator = coordinator(InMemoryCatalog::default());
    let snapshot = Arc::new(sample_tree(false));
    let highlights = |nodes: &[CatalogNode]| -> Vec<Vec<Span>> {
        let matcher = Matcher::new(SearchQuery::parse("str"), RelevanceWeights::default());
        let mut spans = Vec::new();
        for node in nodes {
            spans.push(matcher.highlight(node));
            for child in node.visible_children() {
                spans.push(matcher.highlight(child));
            }
        }
        spans
    };

    coordinator
        .start(Arc::clone(&snapshot), SearchQuery::parse("str"))
        .unwrap();
    let first = coordinator.wait(WAIT).unwrap();
    coordinator.start(snapshot, SearchQuery::parse("str")).unwrap();
    let second = coordinator.wait(WAIT).unwrap();

    assert_eq!(render(&first.nodes), render(&second.nodes));
    assert_eq!(highlights(&first.nodes), highlights(&second.nodes));
    let ids = |nodes: &[CatalogNode]| -> Vec<u64> { nodes.iter().map(|n| n.id.0).collect() };
    assert_eq!(ids(&first.nodes), ids(&second.nodes));
}

fn numeric_catalog() -> (InMemoryCatalog, TypeRef, TypeRef) {
    let string = class("String", "System");
    let int32 = TypeSymbol::structure("Int32").in_namespace("System").into_ref();
    let double = TypeSymbol::structure("Double").in_namespace("System").into_ref();
    let parse = |owner: &TypeRef| {
        MemberSymbol::method(owner.clone(), "Parse", owner.clone(), vec![Parameter::new("s", string.clone())])
            .with_static(true)
    };
    let catalog = InMemoryCatalog::builder()
        .add_type(int32.clone())
        .add_type(double.clone())
        .add_member(parse(&int32))
        .add_member(parse(&double))
        .add_member(MemberSymbol::field(int32.clone(), "MaxValue", int32.clone()).with_static(true))
        .build();
    (catalog, int32, double)
}

#[test]
fn qualified_queries_search_inside_unexpanded_types() {
    let (catalog, int32, double) = numeric_catalog();
    let snapshot = Arc::new(vec![namespace("System", vec![double, int32])]);

    let coordinator = coordinator(catalog.clone());
    coordinator
        .start(Arc::clone(&snapshot), SearchQuery::parse("Int32.Parse"))
        .unwrap();
    let delivery = coordinator.wait(WAIT).unwrap();
    assert_eq!(
        render(&delivery.nodes),
        vec!["System", "  Int32", "    Parse(String)"]
    );

    let shallow = SearchCoordinator::new(
        Arc::new(catalog),
        SearchOptions {
            deep_member_search: false,
            ..SearchOptions::default()
        },
    );
    shallow.start(snapshot, SearchQuery::parse("Int32.Parse")).unwrap();
    assert!(shallow.wait(WAIT).unwrap().nodes.is_empty());
}

#[test]
fn failing_subtrees_are_treated_as_empty() {
    let broken = LazyGroup::new(|| Err(CatalogError::unavailable("listing favourites", "disk offline")));
    let snapshot = Arc::new(vec![
        CatalogNode::lazy_group("Favourites", broken),
        namespace("System.Text", vec![class("StringBuilder", "System.Text")]),
    ]);
    let coordinator = coordinator(InMemoryCatalog::default());
    coordinator.start(snapshot, SearchQuery::parse("strb")).unwrap();
    let delivery = coordinator.wait(WAIT).unwrap();
    assert_eq!(render(&delivery.nodes), vec!["System.Text", "  StringBuilder"]);
}

#[test]
fn array_suffix_keeps_only_array_capable_types() {
    let list = TypeSymbol::class("List")
        .in_namespace("System")
        .with_generic_params(vec![GenericParam::new("T")])
        .into_ref();
    let int32 = TypeSymbol::structure("Int32").in_namespace("System").into_ref();
    let snapshot = Arc::new(vec![
        namespace("System", vec![int32, list, TypeSymbol::void()]),
        CatalogNode::category("Actions")
            .with_children(vec![CatalogNode::custom_action(CustomAction::new("i", "Invoke"))]),
    ]);
    let coordinator = coordinator(InMemoryCatalog::default());
    coordinator.start(snapshot, SearchQuery::parse("i[]")).unwrap();
    let delivery = coordinator.wait(WAIT).unwrap();
    assert_eq!(render(&delivery.nodes), vec!["System", "  Int32[]"]);
}
