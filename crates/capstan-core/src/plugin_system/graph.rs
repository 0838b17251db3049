use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::sync::Arc;

use crate::plugin_system::error::{Rejection, RejectionReason};
use crate::plugin_system::node::PluginNode;
use crate::plugin_system::version::max_satisfying;

/// Reporting boundary for one resolution run.
///
/// Resolution itself holds no logger state; the host passes in whatever
/// sink it wants. The graph emits only rejection events — the accepted
/// list is encoded in the returned [`Resolution`], and the host-facing
/// manager announces it from there (total count once, then each plugin
/// once, in final order).
pub trait ResolutionSink {
    fn plugin_rejected(&mut self, _plugin_id: &str, _reason: &RejectionReason) {}
    fn plugin_accepted(&mut self, _node: &PluginNode) {}
    fn batch_complete(&mut self, _accepted_count: usize) {}
}

/// Sink that discards every event.
impl ResolutionSink for () {}

/// Routes resolution events to the `log` facade.
pub struct LogSink;

impl ResolutionSink for LogSink {
    fn plugin_rejected(&mut self, plugin_id: &str, reason: &RejectionReason) {
        log::warn!("plugin '{}' rejected: {}", plugin_id, reason);
    }

    fn plugin_accepted(&mut self, node: &PluginNode) {
        log::info!("plugin '{}' accepted", node.id());
    }

    fn batch_complete(&mut self, accepted_count: usize) {
        log::info!("resolution complete: {} plugin(s) accepted", accepted_count);
    }
}

/// Result of one resolution run: the input partitioned exactly into an
/// ordered accepted list and a reasoned reject list.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Accepted plugins, providers before their consumers.
    pub accepted: Vec<Arc<PluginNode>>,
    /// Excluded plugins in input order, one terminal reason each.
    pub rejected: Vec<Rejection>,
}

impl Resolution {
    pub fn is_fully_accepted(&self) -> bool {
        self.rejected.is_empty()
    }
}

struct Entry {
    node: PluginNode,
    /// Later-seen definition under an identifier already taken.
    duplicate: bool,
}

/// The dependency/version resolution engine.
///
/// Accumulates plugin nodes and their import edges, then resolves the
/// whole batch in [`process_imports`](DependencyGraph::process_imports):
/// local validation, import satisfiability against exposed service
/// versions, cascading rejection, cycle detection, and topological
/// ordering of the survivors. No individual failure escapes the run;
/// every input ends up accepted or rejected with one reason.
pub struct DependencyGraph {
    /// All added nodes, in first-seen insertion order.
    entries: Vec<Entry>,
    /// Identifier -> first-seen entry index.
    index: HashMap<String, usize>,
    /// Previously-accepted plugins that may serve as providers but are
    /// never re-validated, re-ordered, or rejected.
    baseline: HashMap<String, Arc<PluginNode>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            baseline: HashMap::new(),
        }
    }

    /// Seeds the graph with an already-accepted provider set, for
    /// incremental resolution on top of a running host.
    pub fn with_baseline(baseline: impl IntoIterator<Item = Arc<PluginNode>>) -> Self {
        let mut graph = Self::new();
        for node in baseline {
            graph.baseline.insert(node.id().to_string(), node);
        }
        graph
    }

    /// Registers a node. A second definition under an already-seen
    /// identifier is recorded but flagged; it is excluded at output time
    /// with `DuplicateIdentifier` and never overwrites the first.
    pub fn add_plugin(&mut self, node: PluginNode) {
        let duplicate =
            self.index.contains_key(node.id()) || self.baseline.contains_key(node.id());
        if !duplicate {
            self.index.insert(node.id().to_string(), self.entries.len());
        }
        self.entries.push(Entry { node, duplicate });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The single resolution entry point. Deterministic for a given input
    /// set: no randomness, and insertion order is the only (explicit)
    /// tie-break.
    pub fn process_imports(mut self, sink: &mut dyn ResolutionSink) -> Resolution {
        self.reject_invalid_definitions(sink);
        self.resolve_edges(sink);
        self.cascade_rejections(sink);

        let cyclic = self.find_cycle_members();
        for idx in cyclic {
            self.reject(idx, RejectionReason::CyclicDependency, sink);
        }
        self.cascade_rejections(sink);

        let order = self.topological_order();
        self.into_resolution(order)
    }

    /// Pass 1: duplicates and definitions that failed local validation.
    /// Neither can provide services to anyone else.
    fn reject_invalid_definitions(&mut self, sink: &mut dyn ResolutionSink) {
        for idx in 0..self.entries.len() {
            if self.entries[idx].duplicate {
                self.reject(idx, RejectionReason::DuplicateIdentifier, sink);
            } else if let Some(message) = self.entries[idx].node.definition_error() {
                let reason = RejectionReason::InvalidDefinition {
                    message: message.to_string(),
                };
                self.reject(idx, reason, sink);
            }
        }
    }

    /// Pass 2: every import of every surviving node is checked against the
    /// post-validation survivor snapshot. One unresolved import rejects
    /// the consuming plugin, never the provider.
    ///
    /// The snapshot is fixed before any edge rejection lands, so the
    /// verdicts do not depend on the order nodes were added in.
    fn resolve_edges(&mut self, sink: &mut dyn ResolutionSink) {
        let snapshot: Vec<bool> = self
            .entries
            .iter()
            .map(|e| !e.node.is_rejected())
            .collect();
        let mut failures: Vec<(usize, RejectionReason)> = Vec::new();
        for idx in 0..self.entries.len() {
            if !snapshot[idx] {
                continue;
            }
            if let Some(reason) = self.first_unresolved_import(idx, &snapshot) {
                failures.push((idx, reason));
            }
        }
        for (idx, reason) in failures {
            self.reject(idx, reason, sink);
        }
    }

    /// Finds the first import of `consumer` that no provider satisfies,
    /// in declaration order.
    fn first_unresolved_import(
        &self,
        consumer: usize,
        snapshot: &[bool],
    ) -> Option<RejectionReason> {
        for request in self.entries[consumer].node.imports() {
            let provider = match self.index.get(&request.source_plugin) {
                Some(&p) if snapshot[p] => Some(&self.entries[p].node),
                // Present but rejected during validation: not a usable
                // provider, the import is simply unresolved.
                Some(_) => None,
                None => self
                    .baseline
                    .get(&request.source_plugin)
                    .map(|node| node.as_ref()),
            };
            let resolved = provider
                .and_then(|p| p.exposed_group(&request.source_name))
                .and_then(|group| max_satisfying(group.versions(), &request.version_range))
                .is_some();
            if !resolved {
                return Some(RejectionReason::UnresolvedImport {
                    source_plugin: request.source_plugin.clone(),
                    source_name: request.source_name.clone(),
                    version_range: request.version_range.constraint_string().to_string(),
                });
            }
        }
        None
    }

    /// Pass 3 (and post-cycle pass): rejection propagates forward until a
    /// fixed point. Each round strictly shrinks the surviving set, so
    /// with N nodes this terminates within N rounds.
    fn cascade_rejections(&mut self, sink: &mut dyn ResolutionSink) {
        loop {
            let mut newly: Vec<(usize, RejectionReason)> = Vec::new();
            for idx in 0..self.entries.len() {
                if self.entries[idx].node.is_rejected() {
                    continue;
                }
                for request in self.entries[idx].node.imports() {
                    let provider_rejected = self
                        .index
                        .get(&request.source_plugin)
                        .is_some_and(|&p| self.entries[p].node.is_rejected());
                    if provider_rejected {
                        newly.push((
                            idx,
                            RejectionReason::DependsOnRejectedPlugin {
                                plugin_id: request.source_plugin.clone(),
                            },
                        ));
                        break;
                    }
                }
            }
            if newly.is_empty() {
                break;
            }
            for (idx, reason) in newly {
                self.reject(idx, reason, sink);
            }
        }
    }

    /// Pass 4: strongly connected components over the surviving subgraph.
    /// Every node on an import cycle (including a self-import) is a cycle
    /// member; plugins merely downstream of a cycle are left for the
    /// cascade that follows.
    fn find_cycle_members(&self) -> Vec<usize> {
        let n = self.entries.len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        for idx in 0..n {
            if self.entries[idx].node.is_rejected() {
                continue;
            }
            for request in self.entries[idx].node.imports() {
                if let Some(&p) = self.index.get(&request.source_plugin) {
                    if !self.entries[p].node.is_rejected() {
                        adjacency[idx].push(p);
                    }
                }
            }
        }

        let mut state = SccState::new(n);
        for root in 0..n {
            if self.entries[root].node.is_rejected() {
                continue;
            }
            if state.indices[root].is_none() {
                state.strongconnect(root, &adjacency);
            }
        }
        let mut cyclic = state.cyclic;
        cyclic.sort_unstable();
        cyclic
    }

    /// Pass 5: Kahn's algorithm over the surviving acyclic subgraph.
    /// Among nodes whose providers are all placed, the lowest first-seen
    /// insertion index goes next — the explicit tie-break that makes the
    /// order stable.
    fn topological_order(&self) -> Vec<usize> {
        let n = self.entries.len();
        let mut in_degree: Vec<usize> = vec![0; n];
        let mut consumers: Vec<Vec<usize>> = vec![Vec::new(); n];
        let surviving = |idx: usize| !self.entries[idx].node.is_rejected();

        for idx in 0..n {
            if !surviving(idx) {
                continue;
            }
            // Distinct surviving providers only; several imports from the
            // same provider still form one edge.
            let providers: BTreeSet<usize> = self.entries[idx]
                .node
                .imports()
                .iter()
                .filter_map(|request| self.index.get(&request.source_plugin).copied())
                .filter(|&p| surviving(p))
                .collect();
            for p in providers {
                consumers[p].push(idx);
                in_degree[idx] += 1;
            }
        }

        let mut ready = BinaryHeap::new();
        for idx in 0..n {
            if surviving(idx) && in_degree[idx] == 0 {
                ready.push(Reverse(idx));
            }
        }

        let mut order = Vec::new();
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(idx);
            for &consumer in &consumers[idx] {
                in_degree[consumer] -= 1;
                if in_degree[consumer] == 0 {
                    ready.push(Reverse(consumer));
                }
            }
        }
        // Cycles were eliminated before ordering, so every survivor is
        // placed.
        debug_assert_eq!(
            order.len(),
            (0..n).filter(|&idx| surviving(idx)).count()
        );
        order
    }

    fn into_resolution(mut self, order: Vec<usize>) -> Resolution {
        for &idx in &order {
            self.entries[idx].node.mark_accepted();
        }

        let mut rejected = Vec::new();
        for entry in &self.entries {
            if let Some(reason) = entry.node.rejection() {
                rejected.push(Rejection {
                    plugin_id: entry.node.id().to_string(),
                    reason: reason.clone(),
                });
            }
        }

        let mut slots: Vec<Option<Entry>> = self.entries.into_iter().map(Some).collect();
        let mut accepted = Vec::with_capacity(order.len());
        for idx in order {
            if let Some(entry) = slots[idx].take() {
                accepted.push(Arc::new(entry.node));
            }
        }

        Resolution { accepted, rejected }
    }

    fn reject(&mut self, idx: usize, reason: RejectionReason, sink: &mut dyn ResolutionSink) {
        if self.entries[idx].node.is_rejected() {
            return;
        }
        sink.plugin_rejected(self.entries[idx].node.id(), &reason);
        self.entries[idx].node.mark_rejected(reason);
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Tarjan bookkeeping for [`DependencyGraph::find_cycle_members`].
struct SccState {
    counter: usize,
    indices: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    cyclic: Vec<usize>,
}

impl SccState {
    fn new(n: usize) -> Self {
        Self {
            counter: 0,
            indices: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            cyclic: Vec::new(),
        }
    }

    fn strongconnect(&mut self, v: usize, adjacency: &[Vec<usize>]) {
        self.indices[v] = Some(self.counter);
        self.lowlink[v] = self.counter;
        self.counter += 1;
        self.stack.push(v);
        self.on_stack[v] = true;

        for &w in &adjacency[v] {
            if self.indices[w].is_none() {
                self.strongconnect(w, adjacency);
                self.lowlink[v] = self.lowlink[v].min(self.lowlink[w]);
            } else if self.on_stack[w] {
                if let Some(w_index) = self.indices[w] {
                    self.lowlink[v] = self.lowlink[v].min(w_index);
                }
            }
        }

        if Some(self.lowlink[v]) == self.indices[v] {
            let mut component = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            let self_loop = component.len() == 1 && adjacency[v].contains(&v);
            if component.len() > 1 || self_loop {
                self.cyclic.extend(component);
            }
        }
    }
}
