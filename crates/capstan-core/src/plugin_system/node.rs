use semver::Version;
use serde_json::Value;

use crate::plugin_system::descriptor::{ImplementationHandle, ImportRequest};
use crate::plugin_system::error::RejectionReason;
use crate::plugin_system::kinds::PluginKind;
use crate::plugin_system::manifest::RawPluginDefinition;
use crate::plugin_system::services::{ServiceCatalog, ServiceGroup};
use crate::plugin_system::version::parse_version;

/// Lifecycle state of a plugin within one resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Pending,
    Accepted,
    Rejected,
}

/// One plugin definition inside a resolution run.
///
/// Constructed once from a raw definition; afterwards only the dependency
/// graph flips `status`/`rejection`, and those flips are one-way
/// (`Rejected` is terminal). The accessor-only surface keeps nodes
/// effectively immutable once a resolution result has been handed to the
/// host.
#[derive(Debug, Clone)]
pub struct PluginNode {
    id: String,
    declared_version: Option<Version>,
    kind: PluginKind,
    catalog: ServiceCatalog,
    config: Value,
    implementation: Option<ImplementationHandle>,
    status: NodeStatus,
    rejection: Option<RejectionReason>,
    definition_error: Option<String>,
}

impl PluginNode {
    /// Builds a node from a raw definition.
    ///
    /// Syntax problems do not fail the call: the first one is recorded on
    /// the node so the graph can reject it with `InvalidDefinition` while
    /// the rest of the batch proceeds.
    pub fn from_definition(definition: &RawPluginDefinition) -> Self {
        let mut definition_error: Option<String> = None;
        let mut record = |message: String| {
            // first cause wins
            definition_error.get_or_insert(message);
        };

        if definition.id.trim().is_empty() {
            record("missing plugin identifier".to_string());
        }

        let declared_version = match parse_version(&definition.version) {
            Ok(version) => Some(version),
            Err(e) => {
                record(e.to_string());
                None
            }
        };

        let kind = match PluginKind::parse(&definition.kind, &definition.config) {
            Ok(kind) => kind,
            Err(e) => {
                record(e.to_string());
                PluginKind::Library
            }
        };

        let mut catalog = ServiceCatalog::new();
        for entry in &definition.services {
            match entry.to_descriptor(&definition.id) {
                Ok(descriptor) => catalog.add_exposed(descriptor),
                Err(e) => record(e.to_string()),
            }
        }
        for entry in &definition.imports {
            match entry.to_request(&definition.id) {
                Ok(request) => catalog.add_import(request),
                Err(e) => record(e.to_string()),
            }
        }

        Self {
            id: definition.id.clone(),
            declared_version,
            kind,
            catalog,
            config: definition.config.clone(),
            implementation: definition
                .entry_point
                .as_deref()
                .map(ImplementationHandle::new),
            status: NodeStatus::Pending,
            rejection: None,
            definition_error,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The declared plugin version. Always present on accepted nodes;
    /// `None` only when the definition failed validation.
    pub fn declared_version(&self) -> Option<&Version> {
        self.declared_version.as_ref()
    }

    pub fn kind(&self) -> &PluginKind {
        &self.kind
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn exposed_group(&self, name: &str) -> Option<&ServiceGroup> {
        self.catalog.group(name)
    }

    pub fn imports(&self) -> &[ImportRequest] {
        self.catalog.imports()
    }

    /// The resolved per-plugin configuration block, passed through
    /// unchanged from the definition source.
    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn implementation(&self) -> Option<&ImplementationHandle> {
        self.implementation.as_ref()
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        self.rejection.as_ref()
    }

    /// Local validation failure recorded at construction, if any.
    pub fn definition_error(&self) -> Option<&str> {
        self.definition_error.as_deref()
    }

    pub fn is_accepted(&self) -> bool {
        self.status == NodeStatus::Accepted
    }

    pub fn is_rejected(&self) -> bool {
        self.status == NodeStatus::Rejected
    }

    /// Marks the node rejected. Rejection is terminal: a second call
    /// keeps the first reason.
    pub(crate) fn mark_rejected(&mut self, reason: RejectionReason) {
        if self.status == NodeStatus::Rejected {
            return;
        }
        self.status = NodeStatus::Rejected;
        self.rejection = Some(reason);
    }

    pub(crate) fn mark_accepted(&mut self) {
        debug_assert_eq!(self.status, NodeStatus::Pending);
        self.status = NodeStatus::Accepted;
    }
}
