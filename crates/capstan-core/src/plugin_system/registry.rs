use std::collections::HashMap;
use std::sync::Arc;

use semver::Version;

use crate::plugin_system::descriptor::ImportRequest;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::graph::{DependencyGraph, Resolution, ResolutionSink};
use crate::plugin_system::manifest::RawPluginDefinition;
use crate::plugin_system::node::PluginNode;
use crate::plugin_system::version::max_satisfying;

/// Host-facing registry: turns raw definitions into resolved, ordered
/// plugin sets and carries the accepted baseline between calls.
///
/// Contains no graph algorithm itself — it builds nodes, feeds them to a
/// fresh [`DependencyGraph`] per call, and keeps the accepted set. The
/// accepted set is extended (never rewritten) by incremental additions.
pub struct PluginRegistry {
    accepted: Vec<Arc<PluginNode>>,
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            accepted: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Resolves a full startup batch. Always completes: the result
    /// partitions the input exactly into accepted (ordered) and rejected
    /// (reasoned). The accepted list becomes the registry's baseline for
    /// later incremental additions.
    pub fn resolve_batch(
        &mut self,
        definitions: &[RawPluginDefinition],
        sink: &mut dyn ResolutionSink,
    ) -> Resolution {
        let mut graph = DependencyGraph::new();
        for definition in definitions {
            graph.add_plugin(PluginNode::from_definition(definition));
        }
        let resolution = graph.process_imports(sink);

        self.accepted = resolution.accepted.clone();
        self.index = self
            .accepted
            .iter()
            .enumerate()
            .map(|(position, node)| (node.id().to_string(), position))
            .collect();
        resolution
    }

    /// Adds one plugin after startup. Its imports are resolved only
    /// against the already-accepted set — accepted plugins are immutable
    /// providers here and are never re-validated or re-ordered. On any
    /// failure the registry is left untouched.
    pub fn resolve_incremental(
        &mut self,
        definition: &RawPluginDefinition,
        sink: &mut dyn ResolutionSink,
    ) -> Result<Arc<PluginNode>, PluginSystemError> {
        if self.index.contains_key(&definition.id) {
            return Err(PluginSystemError::AlreadyRegistered {
                plugin_id: definition.id.clone(),
            });
        }

        let mut graph = DependencyGraph::with_baseline(self.accepted.iter().cloned());
        graph.add_plugin(PluginNode::from_definition(definition));
        let mut resolution = graph.process_imports(sink);

        match resolution.accepted.pop() {
            Some(node) => {
                self.index.insert(node.id().to_string(), self.accepted.len());
                self.accepted.push(Arc::clone(&node));
                Ok(node)
            }
            None => match resolution.rejected.into_iter().next() {
                Some(rejection) => Err(PluginSystemError::Rejected {
                    plugin_id: rejection.plugin_id,
                    reason: rejection.reason,
                }),
                // The graph partitions its input exactly; a one-plugin run
                // yields one accepted or one rejected entry.
                None => Err(PluginSystemError::InternalError(format!(
                    "resolution of '{}' produced neither acceptance nor rejection",
                    definition.id
                ))),
            },
        }
    }

    /// Resolves an import request against the accepted set, returning the
    /// providing plugin and the concrete version the import binds to: the
    /// highest exposed version satisfying the range.
    pub fn resolve_import(
        &self,
        request: &ImportRequest,
    ) -> Option<(Arc<PluginNode>, Version)> {
        let provider = self.get(&request.source_plugin)?;
        let group = provider.exposed_group(&request.source_name)?;
        let version = max_satisfying(group.versions(), &request.version_range)?.clone();
        Some((Arc::clone(provider), version))
    }

    /// Accepted plugins in initialization order.
    pub fn accepted(&self) -> &[Arc<PluginNode>] {
        &self.accepted
    }

    pub fn get(&self, id: &str) -> Option<&Arc<PluginNode>> {
        self.index.get(id).map(|&position| &self.accepted[position])
    }

    pub fn is_accepted(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
