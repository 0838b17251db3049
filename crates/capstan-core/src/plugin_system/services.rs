use std::collections::{BTreeMap, HashMap};

use semver::Version;

use crate::plugin_system::descriptor::{ImportRequest, ServiceDescriptor};

/// All versions a plugin exposes under one logical service name, plus the
/// highest among them.
///
/// Invariant: `highest` is always the maximum key present in `versions`;
/// it is recomputed (never decreased) whenever a new version is inserted.
#[derive(Debug, Clone)]
pub struct ServiceGroup {
    logical_name: String,
    highest: Version,
    versions: BTreeMap<Version, ServiceDescriptor>,
}

impl ServiceGroup {
    /// Creates a group from its first exposed descriptor.
    pub fn new(descriptor: ServiceDescriptor) -> Self {
        let mut versions = BTreeMap::new();
        let logical_name = descriptor.name.clone();
        let highest = descriptor.version.clone();
        versions.insert(descriptor.version.clone(), descriptor);
        Self {
            logical_name,
            highest,
            versions,
        }
    }

    /// Inserts another exposed version. Re-exposing an existing version
    /// replaces its descriptor; `highest` only ever moves up.
    pub fn insert(&mut self, descriptor: ServiceDescriptor) {
        if descriptor.version > self.highest {
            self.highest = descriptor.version.clone();
        }
        self.versions.insert(descriptor.version.clone(), descriptor);
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn highest_version(&self) -> &Version {
        &self.highest
    }

    /// Exposed versions in ascending order.
    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.versions.keys()
    }

    pub fn descriptor(&self, version: &Version) -> Option<&ServiceDescriptor> {
        self.versions.get(version)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Per-plugin service table: exposed groups keyed by logical name plus the
/// ordered sequence of import requests.
///
/// Import targets are not required to exist at insertion time; resolution
/// happens later against the whole batch.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    groups: HashMap<String, ServiceGroup>,
    imports: Vec<ImportRequest>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an exposed descriptor into the group keyed by its name,
    /// creating the group on first insert.
    pub fn add_exposed(&mut self, descriptor: ServiceDescriptor) {
        match self.groups.get_mut(&descriptor.name) {
            Some(group) => group.insert(descriptor),
            None => {
                self.groups
                    .insert(descriptor.name.clone(), ServiceGroup::new(descriptor));
            }
        }
    }

    /// Appends an import request in declaration order.
    pub fn add_import(&mut self, request: ImportRequest) {
        self.imports.push(request);
    }

    pub fn group(&self, name: &str) -> Option<&ServiceGroup> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &ServiceGroup> {
        self.groups.values()
    }

    /// Exposed service names, sorted for deterministic display.
    pub fn exposed_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn imports(&self) -> &[ImportRequest] {
        &self.imports
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
