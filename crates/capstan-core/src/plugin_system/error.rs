//! # Capstan Plugin System Errors
//!
//! Defines the error types of the plugin system: [`RejectionReason`], the
//! single terminal reason attached to every plugin excluded from a
//! resolution run, [`DefinitionError`] for field-level problems inside one
//! raw definition, and [`PluginSystemError`] for operations that fail as a
//! whole (incremental registration, definition loading, initialization).
use std::path::PathBuf;

use crate::plugin_system::version::VersionError;

/// Terminal reason a plugin was excluded from the accepted set.
///
/// Exactly one reason is recorded per rejected plugin, even when several
/// causes would apply; the first cause found in pass order wins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    /// The plugin's own definition failed local validation.
    #[error("invalid definition: {message}")]
    InvalidDefinition { message: String },

    /// Another plugin with the same identifier was seen earlier in the run.
    #[error("duplicate plugin identifier")]
    DuplicateIdentifier,

    /// An import request could not be satisfied by any provider.
    #[error("unresolved import of '{source_name}' from '{source_plugin}' (range '{version_range}')")]
    UnresolvedImport {
        source_plugin: String,
        source_name: String,
        version_range: String,
    },

    /// A provider this plugin imports from was itself rejected.
    #[error("depends on rejected plugin '{plugin_id}'")]
    DependsOnRejectedPlugin { plugin_id: String },

    /// The plugin participates in an import cycle.
    #[error("cyclic dependency")]
    CyclicDependency,
}

/// One excluded plugin together with its terminal reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub plugin_id: String,
    pub reason: RejectionReason,
}

/// Field-level problem inside one raw plugin definition. Any of these
/// invalidates the owning plugin as a whole.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("unknown service kind '{kind}'")]
    UnknownServiceKind { kind: String },

    #[error("unknown plugin type '{kind}'")]
    UnknownPluginType { kind: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    /// Incremental registration of an identifier that is already accepted.
    #[error("plugin '{plugin_id}' is already registered")]
    AlreadyRegistered { plugin_id: String },

    /// Incremental registration failed resolution; the accepted set is
    /// unchanged.
    #[error("plugin '{plugin_id}' was rejected: {reason}")]
    Rejected {
        plugin_id: String,
        reason: RejectionReason,
    },

    /// A definition file could not be read or parsed.
    #[error("definition loading failed for '{path}': {message}")]
    LoadingError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Kind-specific initialization failed for an accepted plugin.
    #[error("plugin initialization error for '{plugin_id}': {message}")]
    InitializationError { plugin_id: String, message: String },

    #[error("internal plugin system error: {0}")]
    InternalError(String),
}
