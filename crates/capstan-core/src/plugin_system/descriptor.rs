use std::fmt;

use semver::Version;

use crate::plugin_system::version::VersionRange;

/// The kind of capability a service entry describes.
///
/// Everything except `Import` is an exposed capability; `Import` entries are
/// carried separately as [`ImportRequest`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Plain in-process service
    Service,
    /// Service backed by host-side node code
    NodeService,
    /// HTTP route handler contributed to the host router
    Router,
    /// Capability satisfied outside the plugin system
    External,
    /// Placeholder kind for import entries
    Import,
}

impl ServiceKind {
    /// Parses the kind string used in plugin definitions.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "service" => Some(ServiceKind::Service),
            "nodeService" => Some(ServiceKind::NodeService),
            "router" => Some(ServiceKind::Router),
            "external" => Some(ServiceKind::External),
            "import" => Some(ServiceKind::Import),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Service => "service",
            ServiceKind::NodeService => "nodeService",
            ServiceKind::Router => "router",
            ServiceKind::External => "external",
            ServiceKind::Import => "import",
        }
    }

    /// Whether this kind is offered to other plugins (all but `Import`).
    pub fn is_exposed(&self) -> bool {
        !matches!(self, ServiceKind::Import)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named, versioned capability a plugin offers to others.
///
/// Created once from the plugin's raw definition and never mutated after
/// validation.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Logical service name
    pub name: String,
    /// Concrete exposed version
    pub version: Version,
    /// Capability kind
    pub kind: ServiceKind,
    /// Identifier of the plugin exposing the service
    pub owning_plugin: String,
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}'@{} from '{}'",
            self.kind, self.name, self.version, self.owning_plugin
        )
    }
}

/// A plugin's declared dependency on another plugin's exposed service,
/// constrained by a version range.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Name the importing plugin binds the service to locally
    pub local_name: String,
    /// Identifier of the providing plugin
    pub source_plugin: String,
    /// Service name on the provider side
    pub source_name: String,
    /// Acceptable provider versions
    pub version_range: VersionRange,
    /// Identifier of the importing plugin
    pub owning_plugin: String,
}

impl fmt::Display for ImportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "import '{}' from '{}' (version: {})",
            self.source_name,
            self.source_plugin,
            self.version_range.constraint_string()
        )
    }
}

/// Opaque token for a plugin's backing implementation.
///
/// The host's code loader turns this into runnable code after the owning
/// plugin has been accepted; the core stores it untouched and never
/// inspects or executes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationHandle(String);

impl ImplementationHandle {
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self(entry_point.into())
    }

    pub fn entry_point(&self) -> &str {
        &self.0
    }
}
