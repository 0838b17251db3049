// crates/capstan-core/src/plugin_system/tests/manifest_tests.rs
#![cfg(test)]

use serde_json::json;

use crate::plugin_system::descriptor::ServiceKind;
use crate::plugin_system::error::DefinitionError;
use crate::plugin_system::manifest::{DefinitionBuilder, RawPluginDefinition};

#[test]
fn test_deserialize_definition_with_defaults() {
    let text = r#"{
        "id": "alpha",
        "version": "1.0.0",
        "services": [
            { "name": "auth", "version": "1.0.0" },
            { "name": "routes", "version": "0.3.0", "kind": "router" }
        ],
        "imports": [
            { "name": "store", "from": "beta" }
        ]
    }"#;
    let definition: RawPluginDefinition = serde_json::from_str(text).unwrap();

    assert_eq!(definition.id, "alpha");
    assert_eq!(definition.kind, "library"); // default plugin type
    assert_eq!(definition.services.len(), 2);
    assert_eq!(definition.services[0].kind, "service"); // default service kind
    assert_eq!(definition.imports[0].range, "*"); // default range
    assert!(definition.imports[0].service.is_none());
    assert!(definition.location.is_none());
    assert!(definition.entry_point.is_none());
}

#[test]
fn test_deserialize_camel_case_fields() {
    let text = r#"{
        "id": "gamma",
        "version": "2.0.0",
        "kind": "application",
        "entryPoint": "dist/main.js",
        "imports": [
            { "name": "authLocal", "from": "alpha", "service": "auth", "range": "^1.0.0" }
        ]
    }"#;
    let definition: RawPluginDefinition = serde_json::from_str(text).unwrap();
    assert_eq!(definition.entry_point.as_deref(), Some("dist/main.js"));
    assert_eq!(definition.imports[0].service.as_deref(), Some("auth"));
}

#[test]
fn test_service_entry_to_descriptor() {
    let definition = DefinitionBuilder::new("alpha", "1.0.0")
        .service_kind("auth", "1.2.0", "nodeService")
        .build();
    let descriptor = definition.services[0].to_descriptor("alpha").unwrap();
    assert_eq!(descriptor.name, "auth");
    assert_eq!(descriptor.kind, ServiceKind::NodeService);
    assert_eq!(descriptor.owning_plugin, "alpha");
    assert_eq!(descriptor.version.to_string(), "1.2.0");
}

#[test]
fn test_service_entry_rejects_bad_version() {
    let definition = DefinitionBuilder::new("alpha", "1.0.0")
        .service("auth", "one-point-oh")
        .build();
    let err = definition.services[0].to_descriptor("alpha").unwrap_err();
    assert!(matches!(err, DefinitionError::Version(_)));
}

#[test]
fn test_service_entry_rejects_import_kind() {
    // "import" is a reserved kind; import lines live in `imports`.
    let definition = DefinitionBuilder::new("alpha", "1.0.0")
        .service_kind("auth", "1.0.0", "import")
        .build();
    let err = definition.services[0].to_descriptor("alpha").unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::UnknownServiceKind { kind } if kind == "import"
    ));
}

#[test]
fn test_import_entry_to_request() {
    let definition = DefinitionBuilder::new("beta", "1.0.0")
        .import("auth", "alpha", "^1.0.0")
        .build();
    let request = definition.imports[0].to_request("beta").unwrap();
    assert_eq!(request.local_name, "auth");
    assert_eq!(request.source_name, "auth"); // defaults to the local name
    assert_eq!(request.source_plugin, "alpha");
    assert_eq!(request.owning_plugin, "beta");
    assert_eq!(request.version_range.constraint_string(), "^1.0.0");
}

#[test]
fn test_import_entry_rejects_bad_range() {
    let definition = DefinitionBuilder::new("beta", "1.0.0")
        .import("auth", "alpha", "not a range")
        .build();
    let err = definition.imports[0].to_request("beta").unwrap_err();
    assert!(matches!(err, DefinitionError::Version(_)));
}

#[test]
fn test_builder_renamed_import() {
    let definition = DefinitionBuilder::new("beta", "1.0.0")
        .kind("desktop")
        .import_renamed("authLocal", "alpha", "auth", "~1.2")
        .config(json!({ "theme": "dark" }))
        .entry_point("main.js")
        .location("/plugins/beta")
        .build();

    assert_eq!(definition.kind, "desktop");
    let request = definition.imports[0].to_request("beta").unwrap();
    assert_eq!(request.local_name, "authLocal");
    assert_eq!(request.source_name, "auth");
    assert_eq!(definition.config["theme"], "dark");
    assert_eq!(definition.entry_point.as_deref(), Some("main.js"));
    assert!(definition.location.is_some());
}
