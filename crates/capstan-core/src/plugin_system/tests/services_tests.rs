// crates/capstan-core/src/plugin_system/tests/services_tests.rs
#![cfg(test)]

use semver::Version;

use crate::plugin_system::descriptor::{ImportRequest, ServiceDescriptor, ServiceKind};
use crate::plugin_system::services::{ServiceCatalog, ServiceGroup};
use crate::plugin_system::version::VersionRange;

fn descriptor(name: &str, version: &str) -> ServiceDescriptor {
    ServiceDescriptor {
        name: name.to_string(),
        version: Version::parse(version).unwrap(),
        kind: ServiceKind::Service,
        owning_plugin: "owner".to_string(),
    }
}

fn import(name: &str, from: &str) -> ImportRequest {
    ImportRequest {
        local_name: name.to_string(),
        source_plugin: from.to_string(),
        source_name: name.to_string(),
        version_range: VersionRange::any(),
        owning_plugin: "owner".to_string(),
    }
}

#[test]
fn test_group_tracks_highest_version() {
    let mut group = ServiceGroup::new(descriptor("svc", "1.0.0"));
    assert_eq!(*group.highest_version(), Version::new(1, 0, 0));

    group.insert(descriptor("svc", "2.0.0"));
    assert_eq!(*group.highest_version(), Version::new(2, 0, 0));

    // Highest never decreases when a lower version arrives later.
    group.insert(descriptor("svc", "1.5.0"));
    assert_eq!(*group.highest_version(), Version::new(2, 0, 0));
    assert_eq!(group.len(), 3);
}

#[test]
fn test_group_reinsert_replaces_descriptor() {
    let mut group = ServiceGroup::new(descriptor("svc", "1.0.0"));
    group.insert(descriptor("svc", "1.0.0"));
    assert_eq!(group.len(), 1);
    assert!(!group.is_empty());
}

#[test]
fn test_group_versions_ascending() {
    let mut group = ServiceGroup::new(descriptor("svc", "2.0.0"));
    group.insert(descriptor("svc", "1.0.0"));
    group.insert(descriptor("svc", "1.5.0"));

    let versions: Vec<String> = group.versions().map(|v| v.to_string()).collect();
    assert_eq!(versions, vec!["1.0.0", "1.5.0", "2.0.0"]);
    assert!(group.descriptor(&Version::new(1, 5, 0)).is_some());
    assert!(group.descriptor(&Version::new(9, 9, 9)).is_none());
}

#[test]
fn test_catalog_groups_by_name() {
    let mut catalog = ServiceCatalog::new();
    catalog.add_exposed(descriptor("auth", "1.0.0"));
    catalog.add_exposed(descriptor("auth", "1.2.0"));
    catalog.add_exposed(descriptor("store", "0.1.0"));

    assert_eq!(catalog.group_count(), 2);
    assert_eq!(catalog.exposed_names(), vec!["auth", "store"]);

    let auth = catalog.group("auth").unwrap();
    assert_eq!(auth.logical_name(), "auth");
    assert_eq!(auth.len(), 2);
    assert_eq!(*auth.highest_version(), Version::new(1, 2, 0));
    assert!(catalog.group("missing").is_none());
}

#[test]
fn test_catalog_keeps_import_order() {
    let mut catalog = ServiceCatalog::new();
    catalog.add_import(import("b", "beta"));
    catalog.add_import(import("a", "alpha"));

    // Imports must not exist as exposed targets yet; resolution is later.
    let names: Vec<&str> = catalog
        .imports()
        .iter()
        .map(|r| r.local_name.as_str())
        .collect();
    assert_eq!(names, vec!["b", "a"]);
}
