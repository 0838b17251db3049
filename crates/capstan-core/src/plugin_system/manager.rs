use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::plugin_system::config::{merged_plugin_config, ConfigData};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::graph::{LogSink, Resolution, ResolutionSink};
use crate::plugin_system::loader::DefinitionLoader;
use crate::plugin_system::manifest::RawPluginDefinition;
use crate::plugin_system::node::PluginNode;
use crate::plugin_system::registry::PluginRegistry;

/// Host-facing orchestration surface for the plugin system.
#[async_trait]
pub trait PluginManager: Send + Sync {
    /// Scan a directory and resolve everything found as one batch.
    async fn resolve_directory(&self, dir: &Path) -> Resolution;

    /// Resolve an already-collected batch of definitions.
    async fn resolve_batch(&self, definitions: Vec<RawPluginDefinition>) -> Resolution;

    /// Add one plugin after startup, resolved against the accepted
    /// baseline only.
    async fn add_plugin(
        &self,
        definition: RawPluginDefinition,
    ) -> Result<Arc<PluginNode>, PluginSystemError>;

    /// Get an accepted plugin by identifier.
    async fn get_plugin(&self, id: &str) -> Option<Arc<PluginNode>>;

    /// Accepted plugins in initialization order.
    async fn accepted_plugins(&self) -> Vec<Arc<PluginNode>>;

    /// Check whether an identifier is in the accepted set.
    async fn is_accepted(&self, id: &str) -> bool;

    /// Run the host initialization loop: per accepted plugin in final
    /// order, kind-specific validation then initialization with the
    /// plugin's merged configuration. Returns the number of initialized
    /// plugins.
    async fn initialize_all(
        &self,
        server_config: &ConfigData,
        site_config: &ConfigData,
    ) -> Result<usize, PluginSystemError>;
}

/// Default implementation backed by a mutex-serialized registry: one
/// resolution in flight per registry instance, full-batch and incremental
/// modes never interleave.
pub struct DefaultPluginManager {
    registry: Arc<Mutex<PluginRegistry>>,
    sink: Mutex<Box<dyn ResolutionSink + Send>>,
}

impl DefaultPluginManager {
    /// Create a manager reporting through the `log` facade.
    pub fn new() -> Self {
        Self::with_sink(Box::new(LogSink))
    }

    /// Create a manager reporting through a caller-supplied sink.
    pub fn with_sink(sink: Box<dyn ResolutionSink + Send>) -> Self {
        Self {
            registry: Arc::new(Mutex::new(PluginRegistry::new())),
            sink: Mutex::new(sink),
        }
    }

    /// Get reference to the registry Arc<Mutex>
    pub fn registry(&self) -> &Arc<Mutex<PluginRegistry>> {
        &self.registry
    }

    /// Announces a finished batch: total accepted count once, then each
    /// accepted plugin once, in final order.
    fn announce(sink: &mut (dyn ResolutionSink + Send), resolution: &Resolution) {
        sink.batch_complete(resolution.accepted.len());
        for node in &resolution.accepted {
            sink.plugin_accepted(node);
        }
    }
}

impl Debug for DefaultPluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultPluginManager").finish_non_exhaustive()
    }
}

impl Default for DefaultPluginManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginManager for DefaultPluginManager {
    async fn resolve_directory(&self, dir: &Path) -> Resolution {
        let mut loader = DefinitionLoader::new();
        loader.add_search_path(dir);
        let outcome = loader.scan().await;
        if !outcome.skipped.is_empty() {
            log::warn!(
                "{} definition file(s) skipped under '{}'",
                outcome.skipped.len(),
                dir.display()
            );
        }
        self.resolve_batch(outcome.definitions).await
    }

    async fn resolve_batch(&self, definitions: Vec<RawPluginDefinition>) -> Resolution {
        let mut registry = self.registry.lock().await;
        let mut sink = self.sink.lock().await;
        let resolution = registry.resolve_batch(&definitions, sink.as_mut());
        Self::announce(sink.as_mut(), &resolution);
        resolution
    }

    async fn add_plugin(
        &self,
        definition: RawPluginDefinition,
    ) -> Result<Arc<PluginNode>, PluginSystemError> {
        let mut registry = self.registry.lock().await;
        let mut sink = self.sink.lock().await;
        let node = registry.resolve_incremental(&definition, sink.as_mut())?;
        sink.plugin_accepted(&node);
        Ok(node)
    }

    async fn get_plugin(&self, id: &str) -> Option<Arc<PluginNode>> {
        let registry = self.registry.lock().await;
        registry.get(id).cloned()
    }

    async fn accepted_plugins(&self) -> Vec<Arc<PluginNode>> {
        let registry = self.registry.lock().await;
        registry.accepted().to_vec()
    }

    async fn is_accepted(&self, id: &str) -> bool {
        let registry = self.registry.lock().await;
        registry.is_accepted(id)
    }

    async fn initialize_all(
        &self,
        server_config: &ConfigData,
        site_config: &ConfigData,
    ) -> Result<usize, PluginSystemError> {
        let registry = self.registry.lock().await;
        let mut initialized = 0;
        for node in registry.accepted() {
            let plugin_config = ConfigData::from_value(node.config());
            let merged = merged_plugin_config(server_config, site_config, &plugin_config);

            // A plugin failing its kind check (e.g. an authentication
            // scheme the host never asked for) is skipped, not torn down.
            if let Err(e) = node.kind().validate(node.id(), &merged) {
                log::warn!("Skipping plugin '{}': {}", node.id(), e);
                continue;
            }
            node.kind().initialize(node.id(), &merged)?;
            initialized += 1;
        }
        log::info!("Initialized {} plugin(s)", initialized);
        Ok(initialized)
    }
}
