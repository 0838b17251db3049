pub mod plugin_system;

// Re-export key public types for easier use by the binary and hosts.
pub use plugin_system::config::ConfigData;
pub use plugin_system::error::{PluginSystemError, Rejection, RejectionReason};
pub use plugin_system::graph::{DependencyGraph, Resolution, ResolutionSink};
pub use plugin_system::manager::{DefaultPluginManager, PluginManager};
pub use plugin_system::manifest::{DefinitionBuilder, RawPluginDefinition};
pub use plugin_system::node::PluginNode;
pub use plugin_system::registry::PluginRegistry;
pub use plugin_system::version::VersionRange;
