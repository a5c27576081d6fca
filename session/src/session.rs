use crate::config::PickerConfig;
use crate::error::PickerError;
use crate::error::Result;
use crate::sink::PickerSink;
use crate::state::SessionState;
use picker_catalog::CatalogNode;
use picker_catalog::CatalogProvider;
use picker_catalog::Children;
use picker_catalog::KindFilter;
use picker_catalog::NamespaceMap;
use picker_catalog::NoProgress;
use picker_catalog::NodeId;
use picker_catalog::NodeKind;
use picker_catalog::TypeRef;
use picker_catalog::find_in;
use picker_catalog::find_in_mut;
use picker_matcher::MatchMode;
use picker_matcher::Matcher;
use picker_matcher::SearchQuery;
use picker_matcher::Span;
use picker_navigation::ConstraintChoice;
use picker_navigation::NavigationError;
use picker_navigation::Navigator;
use picker_navigation::StepOutcome;
use picker_search::CatalogLoader;
use picker_search::Delivery;
use picker_search::DepthProgress;
use picker_search::SearchCoordinator;
use picker_search::SearchState;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// One interactive picker: a scope tree, the query over it, the drill-down
/// stack and the sink everything is reported to.
///
/// All methods run on the thread that owns the session. Search passes run
/// on a worker and are handed over by [`PickerSession::pump`].
pub struct PickerSession {
    provider: Arc<dyn CatalogProvider>,
    config: PickerConfig,
    state: SessionState,
    /// Unfiltered tree of the current scope. Shared with running passes and
    /// copied on write.
    live: Arc<Vec<CatalogNode>>,
    /// Latest delivered pass for the current query.
    filtered: Option<Vec<CatalogNode>>,
    query: SearchQuery,
    coordinator: SearchCoordinator,
    navigator: Navigator,
    loader: Option<CatalogLoader>,
    universe: Option<NamespaceMap>,
    reported: Vec<DepthProgress>,
    sink: Box<dyn PickerSink>,
    closed: bool,
}

impl PickerSession {
    pub fn open(
        provider: Arc<dyn CatalogProvider>,
        config: PickerConfig,
        sink: Box<dyn PickerSink>,
    ) -> Result<Self> {
        config.validate()?;
        let loader = if config.preload_catalog {
            Some(CatalogLoader::spawn(Arc::clone(&provider))?)
        } else {
            None
        };
        let coordinator = SearchCoordinator::new(Arc::clone(&provider), config.search_options());
        let navigator = Navigator::new(Arc::clone(&provider), config.selection_filter());
        let query = SearchQuery::new("", config.match_mode, config.kind_filter);
        let mut session = Self {
            provider,
            config,
            state: SessionState::new(),
            live: Arc::new(Vec::new()),
            filtered: None,
            query,
            coordinator,
            navigator,
            loader,
            universe: None,
            reported: Vec::new(),
            sink,
            closed: false,
        };
        session.show_root()?;
        info!("picker session opened with {} root nodes", session.live.len());
        Ok(session)
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn search_state(&self) -> SearchState {
        self.coordinator.state()
    }

    pub fn is_searching(&self) -> bool {
        self.coordinator.is_searching()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn breadcrumb(&self) -> Vec<String> {
        self.navigator.breadcrumb()
    }

    /// The tree currently on screen: the delivered pass when there is one,
    /// the scope tree otherwise.
    pub fn current_tree(&self) -> &[CatalogNode] {
        self.filtered.as_deref().unwrap_or(self.live.as_slice())
    }

    /// Depth-first walk of the current tree that skips collapsed children.
    pub fn visible_nodes(&self) -> Vec<&CatalogNode> {
        fn walk<'a>(nodes: &'a [CatalogNode], out: &mut Vec<&'a CatalogNode>) {
            for node in nodes {
                out.push(node);
                walk(node.visible_children(), out);
            }
        }
        let mut out = Vec::new();
        walk(self.current_tree(), &mut out);
        out
    }

    pub fn set_query(&mut self, raw: &str) -> Result<()> {
        self.ensure_open()?;
        self.query = SearchQuery::new(raw, self.config.match_mode, self.config.kind_filter);
        self.state.highlights.sync_query(raw);
        self.refresh()
    }

    pub fn set_match_mode(&mut self, mode: MatchMode) -> Result<()> {
        self.ensure_open()?;
        self.config.match_mode = mode;
        self.state.highlights.clear();
        let raw = self.query.raw.clone();
        self.set_query(&raw)
    }

    pub fn set_kind_filter(&mut self, kind_filter: KindFilter) -> Result<()> {
        self.ensure_open()?;
        self.config.kind_filter = kind_filter;
        self.state.highlights.clear();
        let raw = self.query.raw.clone();
        self.set_query(&raw)
    }

    /// Expands or collapses a node in both the scope tree and the delivered
    /// tree. Expanding a lazy group materializes it; expanding a search
    /// trigger restarts the running query so the trigger takes part.
    pub fn toggle_expanded(&mut self, id: NodeId, expanded: bool) -> Result<()> {
        self.ensure_open()?;
        let mut found = false;
        if let Some(filtered) = self.filtered.as_mut()
            && let Some(node) = find_in_mut(filtered, id)
        {
            node.toggle_expanded(expanded);
            found = true;
        }

        let mut restart = false;
        if let Some(node) = find_in_mut(Arc::make_mut(&mut self.live).as_mut_slice(), id) {
            if expanded {
                materialize(node);
            }
            node.toggle_expanded(expanded);
            restart = matches!(node.kind, NodeKind::SearchTrigger(_));
            found = true;
        }

        if !found {
            return Err(NavigationError::UnknownNode(id).into());
        }
        self.state.remember_expanded(id, expanded);
        if restart && self.needs_pass() {
            return self.refresh();
        }
        Ok(())
    }

    pub fn step_into(&mut self, id: NodeId) -> Result<StepOutcome> {
        self.ensure_open()?;
        let node = self.lookup(id)?;
        self.coordinator.cancel();
        self.navigate(|navigator| navigator.step_into(&node))
    }

    pub fn select(&mut self, id: NodeId) -> Result<StepOutcome> {
        self.ensure_open()?;
        let node = self.lookup(id)?;
        self.coordinator.cancel();
        self.navigate(|navigator| navigator.select(&node))
    }

    pub fn supply_type_argument(&mut self, argument: TypeRef) -> Result<StepOutcome> {
        self.ensure_open()?;
        self.navigate(|navigator| navigator.supply_type_argument(argument))
    }

    /// Candidate arguments for the generic parameter currently requested.
    /// Uses the background sweep when it has finished, a direct sweep
    /// otherwise.
    pub fn constraint_candidates(&mut self) -> Result<ConstraintChoice> {
        self.ensure_open()?;
        self.poll_loader();
        let universe = match self.universe.take() {
            Some(universe) => universe,
            None => self.provider.all_types(&NoProgress)?,
        };
        let choice = self.navigator.constraint_candidates(&universe);
        self.universe = Some(universe);
        Ok(choice?)
    }

    pub fn back(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.coordinator.cancel();
        match self.navigator.back()? {
            Some(members) => self.show_scope(members),
            None => self.show_root(),
        }
    }

    /// Ends the session without a result.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.shutdown();
        self.sink.on_cancelled();
        info!("picker session closed");
    }

    /// Hands finished work to the sink: changed progress cells, the
    /// delivered tree and the background sweep. Returns whether a tree was
    /// delivered.
    pub fn pump(&mut self) -> Result<bool> {
        self.ensure_open()?;
        self.poll_loader();
        self.report_progress();
        match self.coordinator.poll() {
            Some(delivery) => {
                self.deliver(delivery);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Like [`PickerSession::pump`] but blocks up to `timeout` for the
    /// running pass.
    pub fn wait(&mut self, timeout: Duration) -> Result<bool> {
        self.ensure_open()?;
        match self.coordinator.wait(timeout) {
            Some(delivery) => {
                self.poll_loader();
                self.deliver(delivery);
                Ok(true)
            }
            None => self.pump(),
        }
    }

    /// Display-name spans of `id` under the current query, cached until
    /// the query changes.
    pub fn highlights(&mut self, id: NodeId) -> Result<Vec<Span>> {
        self.ensure_open()?;
        let tree = self.filtered.as_deref().unwrap_or(self.live.as_slice());
        let node = find_in(tree, id).ok_or(NavigationError::UnknownNode(id))?;
        self.state.highlights.sync_query(&self.query.raw);
        let matcher = Matcher::new(self.query.clone(), self.config.weights);
        Ok(self
            .state
            .highlights
            .get_or_compute(id, || matcher.highlight(node))
            .to_vec())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(PickerError::SessionClosed);
        }
        Ok(())
    }

    fn needs_pass(&self) -> bool {
        !self.query.is_empty()
            || self.query.array_suffixed
            || self.query.kind_filter != KindFilter::All
    }

    /// Starts a pass for the current query, or shows the scope tree when
    /// there is nothing to filter.
    fn refresh(&mut self) -> Result<()> {
        self.reported.clear();
        if self.needs_pass() {
            let generation = self
                .coordinator
                .start(Arc::clone(&self.live), self.query.clone())?;
            debug!("query {:?} started pass {generation}", self.query.raw);
            return Ok(());
        }
        self.coordinator.cancel();
        self.filtered = None;
        self.sink.on_filtered_tree_ready(&self.live);
        Ok(())
    }

    fn show_root(&mut self) -> Result<()> {
        let roots = self
            .provider
            .root_categories(&self.config.scope_context())
            .unwrap_or_else(|err| {
                warn!("root categories unavailable: {err}");
                Vec::new()
            });
        self.show_scope(roots)
    }

    fn show_scope(&mut self, mut nodes: Vec<CatalogNode>) -> Result<()> {
        for node in &mut nodes {
            node.assign_depths(0);
        }
        self.state.restore_expanded(&mut nodes);
        self.live = Arc::new(nodes);
        self.filtered = None;
        self.query = SearchQuery::new("", self.config.match_mode, self.config.kind_filter);
        self.state.highlights.sync_query("");
        self.refresh()
    }

    /// Runs one navigator step. A stack that cannot be folded into a
    /// reference ends the session.
    fn navigate<F>(&mut self, step: F) -> Result<StepOutcome>
    where
        F: FnOnce(&mut Navigator) -> picker_navigation::Result<StepOutcome>,
    {
        match step(&mut self.navigator) {
            Ok(outcome) => self.apply(outcome),
            Err(err @ NavigationError::InvalidReferenceShape(_)) => {
                warn!("picker aborted: {err}");
                self.shutdown();
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn apply(&mut self, outcome: StepOutcome) -> Result<StepOutcome> {
        match &outcome {
            StepOutcome::Entered(members) => self.show_scope(members.clone())?,
            StepOutcome::Resolved(reference) => {
                info!("picker resolved {reference}");
                self.sink.on_resolved(reference);
                self.shutdown();
            }
            StepOutcome::NeedsTypeArguments(request) => debug!(
                "{} waits for argument {} of {}",
                request.target,
                request.index + 1,
                request.total
            ),
        }
        Ok(outcome)
    }

    fn lookup(&self, id: NodeId) -> Result<CatalogNode> {
        find_in(self.current_tree(), id)
            .or_else(|| find_in(&self.live, id))
            .cloned()
            .ok_or_else(|| NavigationError::UnknownNode(id).into())
    }

    fn deliver(&mut self, delivery: Delivery) {
        debug!(
            "pass {} for {:?} delivered in {:?}",
            delivery.generation, delivery.query.raw, delivery.elapsed
        );
        self.reported.clear();
        self.sink.on_filtered_tree_ready(&delivery.nodes);
        self.filtered = Some(delivery.nodes);
    }

    fn report_progress(&mut self) {
        let cells = self.coordinator.progress();
        if cells == self.reported {
            return;
        }
        for cell in &cells {
            self.sink.on_progress(cell.depth, cell.fraction(), &cell.label);
        }
        self.reported = cells;
    }

    fn poll_loader(&mut self) {
        let Some(loader) = &self.loader else {
            return;
        };
        match loader.poll() {
            Some(Ok(universe)) => self.universe = Some(universe),
            Some(Err(err)) => warn!("background catalog sweep failed: {err}"),
            None => {}
        }
    }

    fn shutdown(&mut self) {
        self.coordinator.cancel();
        if let Some(loader) = &self.loader {
            loader.cancel();
        }
        self.navigator.reset();
        self.closed = true;
    }
}

impl Drop for PickerSession {
    fn drop(&mut self) {
        self.coordinator.cancel();
    }
}

/// Produces the children of an empty lazy group. Failures leave it empty.
fn materialize(node: &mut CatalogNode) {
    let NodeKind::GroupedLazy(group) = &node.kind else {
        return;
    };
    if !node.all_children().is_empty() {
        return;
    }
    match group.produce() {
        Ok(children) => {
            node.set_children(Children::Collapsed(children));
            node.assign_depths(node.depth);
        }
        Err(err) => warn!("lazy group {} failed: {err}", node.display_name),
    }
}
