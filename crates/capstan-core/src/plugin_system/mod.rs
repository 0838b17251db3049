//! # Capstan Plugin System
//!
//! Turns a set of independently-authored plugin definitions into a
//! validated, dependency-ordered, version-resolved registry usable by a
//! host process. Each plugin declares the services it exposes, the
//! services it imports from other plugins (by name and version range),
//! and its metadata; this module decides, deterministically, which
//! plugins survive and in what order they initialize.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`version`]**: semver parsing, range matching, and
//!   highest-satisfying selection.
//! - **[`descriptor`]**: the service vocabulary — exposed capabilities,
//!   import requests, and the opaque implementation handle.
//! - **[`kinds`]**: the plugin type ([`PluginKind`]) as a tagged variant
//!   with kind-specific validation and initialization dispatch.
//! - **[`services`]**: per-plugin service tables ([`ServiceCatalog`]) with
//!   highest-version tracking per logical name.
//! - **[`node`]**: one plugin per resolution run ([`PluginNode`]), its
//!   status, and its single terminal rejection reason.
//! - **[`graph`]**: the resolution engine ([`DependencyGraph`]) — import
//!   satisfiability, cascading rejection, cycle detection, topological
//!   ordering.
//! - **[`registry`]**: the host-facing [`PluginRegistry`] with full-batch
//!   and incremental resolution paths.
//! - **[`manifest`]**: raw definition records as handed over by the
//!   definition source, plus a builder for programmatic construction.
//! - **[`loader`]**: the definition source — directory scanning and JSON
//!   parsing, with per-file failure isolation.
//! - **[`config`]**: layered configuration data merged per plugin.
//! - **[`manager`]**: async host orchestration and the initialization
//!   loop over the accepted order.
//! - **[`error`]**: rejection reasons and operational error types.
pub mod config;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod kinds;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod node;
pub mod registry;
pub mod services;
pub mod version;

pub use descriptor::{ImplementationHandle, ImportRequest, ServiceDescriptor, ServiceKind};
pub use error::{PluginSystemError, Rejection, RejectionReason};
pub use graph::{DependencyGraph, LogSink, Resolution, ResolutionSink};
pub use kinds::PluginKind;
pub use manager::{DefaultPluginManager, PluginManager};
pub use manifest::{DefinitionBuilder, RawPluginDefinition};
pub use node::{NodeStatus, PluginNode};
pub use registry::PluginRegistry;
pub use services::{ServiceCatalog, ServiceGroup};
pub use version::{VersionError, VersionRange};

// Test module declaration
#[cfg(test)]
mod tests;
