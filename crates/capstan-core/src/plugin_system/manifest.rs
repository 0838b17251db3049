use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::plugin_system::descriptor::{ImportRequest, ServiceDescriptor, ServiceKind};
use crate::plugin_system::error::DefinitionError;
use crate::plugin_system::version::{parse_version, VersionRange};

/// Parsed plugin definition as supplied by the definition source.
///
/// The core only consumes these already-parsed records; reading files and
/// dealing with the on-disk dialect is the loader's job. Field syntax is
/// validated when the record is turned into a
/// [`PluginNode`](crate::plugin_system::node::PluginNode).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPluginDefinition {
    /// Unique identifier for the plugin
    pub id: String,

    /// Declared plugin version
    pub version: String,

    /// Plugin type ("library", "application", "windowManager", ...)
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Services this plugin exposes
    #[serde(default)]
    pub services: Vec<RawServiceEntry>,

    /// Services this plugin imports from other plugins
    #[serde(default)]
    pub imports: Vec<RawImportEntry>,

    /// Resolved per-plugin configuration block, passed through unchanged
    #[serde(default)]
    pub config: Value,

    /// Where the definition was found (set by the loader)
    #[serde(default)]
    pub location: Option<PathBuf>,

    /// Entry point of the backing implementation (opaque to the core)
    #[serde(default)]
    pub entry_point: Option<String>,
}

fn default_kind() -> String {
    "library".to_string()
}

/// One exposed-service line of a raw definition.
#[derive(Debug, Clone, Deserialize)]
pub struct RawServiceEntry {
    pub name: String,
    pub version: String,
    #[serde(default = "default_service_kind")]
    pub kind: String,
}

fn default_service_kind() -> String {
    "service".to_string()
}

impl RawServiceEntry {
    /// Builds the typed descriptor; fails on version syntax or an unknown
    /// or non-exposed kind.
    pub fn to_descriptor(&self, owning_plugin: &str) -> Result<ServiceDescriptor, DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::MissingField { field: "name" });
        }
        let kind = ServiceKind::parse(&self.kind)
            .filter(ServiceKind::is_exposed)
            .ok_or_else(|| DefinitionError::UnknownServiceKind {
                kind: self.kind.clone(),
            })?;
        let version = parse_version(&self.version)?;
        Ok(ServiceDescriptor {
            name: self.name.clone(),
            version,
            kind,
            owning_plugin: owning_plugin.to_string(),
        })
    }
}

/// One import line of a raw definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImportEntry {
    /// Local name the importing plugin binds the service to
    pub name: String,

    /// Identifier of the providing plugin
    pub from: String,

    /// Service name on the provider; defaults to the local name
    #[serde(default)]
    pub service: Option<String>,

    /// Version range constraint; defaults to any version
    #[serde(default = "default_range")]
    pub range: String,
}

fn default_range() -> String {
    "*".to_string()
}

impl RawImportEntry {
    /// Builds the typed import request; fails on range syntax.
    pub fn to_request(&self, owning_plugin: &str) -> Result<ImportRequest, DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::MissingField { field: "name" });
        }
        if self.from.trim().is_empty() {
            return Err(DefinitionError::MissingField { field: "from" });
        }
        let version_range = VersionRange::from_constraint(&self.range)?;
        Ok(ImportRequest {
            local_name: self.name.clone(),
            source_plugin: self.from.clone(),
            source_name: self.service.clone().unwrap_or_else(|| self.name.clone()),
            version_range,
            owning_plugin: owning_plugin.to_string(),
        })
    }
}

/// Builder for assembling definitions programmatically (hosts and tests).
pub struct DefinitionBuilder {
    definition: RawPluginDefinition,
}

impl DefinitionBuilder {
    /// Create a new definition builder; the kind defaults to "library".
    pub fn new(id: &str, version: &str) -> Self {
        Self {
            definition: RawPluginDefinition {
                id: id.to_string(),
                version: version.to_string(),
                kind: default_kind(),
                services: Vec::new(),
                imports: Vec::new(),
                config: Value::Null,
                location: None,
                entry_point: None,
            },
        }
    }

    /// Set the plugin type.
    pub fn kind(mut self, kind: &str) -> Self {
        self.definition.kind = kind.to_string();
        self
    }

    /// Expose a service with the default "service" kind.
    pub fn service(self, name: &str, version: &str) -> Self {
        self.service_kind(name, version, "service")
    }

    /// Expose a service with an explicit kind.
    pub fn service_kind(mut self, name: &str, version: &str, kind: &str) -> Self {
        self.definition.services.push(RawServiceEntry {
            name: name.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        });
        self
    }

    /// Import a service under its provider-side name.
    pub fn import(self, name: &str, from: &str, range: &str) -> Self {
        self.import_renamed(name, from, name, range)
    }

    /// Import a service, binding it to a different local name.
    pub fn import_renamed(mut self, local: &str, from: &str, service: &str, range: &str) -> Self {
        self.definition.imports.push(RawImportEntry {
            name: local.to_string(),
            from: from.to_string(),
            service: Some(service.to_string()),
            range: range.to_string(),
        });
        self
    }

    /// Attach the resolved per-plugin configuration block.
    pub fn config(mut self, config: Value) -> Self {
        self.definition.config = config;
        self
    }

    /// Set the implementation entry point.
    pub fn entry_point(mut self, entry_point: &str) -> Self {
        self.definition.entry_point = Some(entry_point.to_string());
        self
    }

    /// Record where the definition came from.
    pub fn location(mut self, location: impl Into<PathBuf>) -> Self {
        self.definition.location = Some(location.into());
        self
    }

    /// Build the definition.
    pub fn build(self) -> RawPluginDefinition {
        self.definition
    }
}
