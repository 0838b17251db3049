// crates/capstan-core/src/plugin_system/tests/graph_tests.rs
#![cfg(test)]

use crate::plugin_system::error::RejectionReason;
use crate::plugin_system::graph::{DependencyGraph, Resolution};
use crate::plugin_system::manifest::{DefinitionBuilder, RawPluginDefinition};
use crate::plugin_system::node::PluginNode;

fn resolve(definitions: &[RawPluginDefinition]) -> Resolution {
    let mut graph = DependencyGraph::new();
    for definition in definitions {
        graph.add_plugin(PluginNode::from_definition(definition));
    }
    graph.process_imports(&mut ())
}

fn accepted_ids(resolution: &Resolution) -> Vec<&str> {
    resolution.accepted.iter().map(|n| n.id()).collect()
}

fn rejection_of<'a>(resolution: &'a Resolution, id: &str) -> &'a RejectionReason {
    &resolution
        .rejected
        .iter()
        .find(|r| r.plugin_id == id)
        .unwrap_or_else(|| panic!("no rejection recorded for '{id}'"))
        .reason
}

#[test]
fn test_provider_before_consumer() {
    let resolution = resolve(&[
        DefinitionBuilder::new("pluginA", "1.0.0")
            .service("auth", "1.0.0")
            .build(),
        DefinitionBuilder::new("pluginB", "1.0.0")
            .import("auth", "pluginA", ">=1.0.0, <2.0.0")
            .build(),
    ]);

    assert_eq!(accepted_ids(&resolution), vec!["pluginA", "pluginB"]);
    assert!(resolution.rejected.is_empty());
    assert!(resolution.is_fully_accepted());
}

#[test]
fn test_missing_provider_rejects_consumer() {
    let resolution = resolve(&[DefinitionBuilder::new("pluginC", "1.0.0")
        .import("x", "pluginZ", "*")
        .build()]);

    assert!(resolution.accepted.is_empty());
    assert_eq!(resolution.rejected.len(), 1);
    assert_eq!(
        *rejection_of(&resolution, "pluginC"),
        RejectionReason::UnresolvedImport {
            source_plugin: "pluginZ".to_string(),
            source_name: "x".to_string(),
            version_range: "*".to_string(),
        }
    );
}

#[test]
fn test_no_satisfying_version_rejects_consumer() {
    let resolution = resolve(&[
        DefinitionBuilder::new("provider", "1.0.0")
            .service("svc", "1.0.0")
            .build(),
        DefinitionBuilder::new("consumer", "1.0.0")
            .import("svc", "provider", "^2.0.0")
            .build(),
    ]);

    assert_eq!(accepted_ids(&resolution), vec!["provider"]);
    assert!(matches!(
        rejection_of(&resolution, "consumer"),
        RejectionReason::UnresolvedImport { source_name, .. } if source_name == "svc"
    ));
}

#[test]
fn test_missing_service_group_rejects_consumer() {
    let resolution = resolve(&[
        DefinitionBuilder::new("provider", "1.0.0")
            .service("other", "1.0.0")
            .build(),
        DefinitionBuilder::new("consumer", "1.0.0")
            .import("svc", "provider", "*")
            .build(),
    ]);

    assert_eq!(accepted_ids(&resolution), vec!["provider"]);
    assert!(matches!(
        rejection_of(&resolution, "consumer"),
        RejectionReason::UnresolvedImport { .. }
    ));
}

#[test]
fn test_invalid_definition_rejected_locally() {
    let resolution = resolve(&[DefinitionBuilder::new("broken", "not-a-version").build()]);

    assert!(resolution.accepted.is_empty());
    assert!(matches!(
        rejection_of(&resolution, "broken"),
        RejectionReason::InvalidDefinition { .. }
    ));
}

#[test]
fn test_consumer_of_invalid_definition_gets_unresolved_import() {
    // A provider that never passed validation cannot provide; its
    // consumer sees a plain unresolved import, not a cascade.
    let resolution = resolve(&[
        DefinitionBuilder::new("broken", "nope")
            .service("svc", "1.0.0")
            .build(),
        DefinitionBuilder::new("consumer", "1.0.0")
            .import("svc", "broken", "*")
            .build(),
    ]);

    assert!(resolution.accepted.is_empty());
    assert!(matches!(
        rejection_of(&resolution, "broken"),
        RejectionReason::InvalidDefinition { .. }
    ));
    assert!(matches!(
        rejection_of(&resolution, "consumer"),
        RejectionReason::UnresolvedImport { .. }
    ));
}

#[test]
fn test_duplicate_identifier_rejects_later_definition() {
    let resolution = resolve(&[
        DefinitionBuilder::new("dup", "1.0.0")
            .service("svc", "1.0.0")
            .build(),
        DefinitionBuilder::new("dup", "2.0.0").build(),
        DefinitionBuilder::new("consumer", "1.0.0")
            .import("svc", "dup", "^1.0.0")
            .build(),
    ]);

    // The first-seen definition survives and keeps providing.
    assert_eq!(accepted_ids(&resolution), vec!["dup", "consumer"]);
    assert_eq!(resolution.rejected.len(), 1);
    assert_eq!(
        *rejection_of(&resolution, "dup"),
        RejectionReason::DuplicateIdentifier
    );
}

#[test]
fn test_cascading_rejection_chain() {
    let resolution = resolve(&[
        DefinitionBuilder::new("a", "1.0.0")
            .service("asvc", "1.0.0")
            .import("gone", "nowhere", "*")
            .build(),
        DefinitionBuilder::new("b", "1.0.0")
            .service("bsvc", "1.0.0")
            .import("asvc", "a", "^1.0.0")
            .build(),
        DefinitionBuilder::new("c", "1.0.0")
            .import("bsvc", "b", "^1.0.0")
            .build(),
    ]);

    assert!(resolution.accepted.is_empty());
    assert!(matches!(
        rejection_of(&resolution, "a"),
        RejectionReason::UnresolvedImport { .. }
    ));
    assert_eq!(
        *rejection_of(&resolution, "b"),
        RejectionReason::DependsOnRejectedPlugin {
            plugin_id: "a".to_string()
        }
    );
    assert_eq!(
        *rejection_of(&resolution, "c"),
        RejectionReason::DependsOnRejectedPlugin {
            plugin_id: "b".to_string()
        }
    );
}

#[test]
fn test_mutual_cycle_rejects_both() {
    let resolution = resolve(&[
        DefinitionBuilder::new("a", "1.0.0")
            .service("y", "1.0.0")
            .import("x", "b", "*")
            .build(),
        DefinitionBuilder::new("b", "1.0.0")
            .service("x", "1.0.0")
            .import("y", "a", "*")
            .build(),
    ]);

    assert!(resolution.accepted.is_empty());
    assert_eq!(*rejection_of(&resolution, "a"), RejectionReason::CyclicDependency);
    assert_eq!(*rejection_of(&resolution, "b"), RejectionReason::CyclicDependency);
}

#[test]
fn test_self_import_is_a_cycle() {
    let resolution = resolve(&[DefinitionBuilder::new("selfish", "1.0.0")
        .service("svc", "1.0.0")
        .import("svc", "selfish", "*")
        .build()]);

    assert!(resolution.accepted.is_empty());
    assert_eq!(
        *rejection_of(&resolution, "selfish"),
        RejectionReason::CyclicDependency
    );
}

#[test]
fn test_cycle_consumer_rejected_by_cascade() {
    let resolution = resolve(&[
        DefinitionBuilder::new("a", "1.0.0")
            .service("asvc", "1.0.0")
            .import("bsvc", "b", "*")
            .build(),
        DefinitionBuilder::new("b", "1.0.0")
            .service("bsvc", "1.0.0")
            .import("asvc", "a", "*")
            .build(),
        DefinitionBuilder::new("downstream", "1.0.0")
            .import("asvc", "a", "*")
            .build(),
    ]);

    assert!(resolution.accepted.is_empty());
    assert_eq!(*rejection_of(&resolution, "a"), RejectionReason::CyclicDependency);
    assert_eq!(*rejection_of(&resolution, "b"), RejectionReason::CyclicDependency);
    assert_eq!(
        *rejection_of(&resolution, "downstream"),
        RejectionReason::DependsOnRejectedPlugin {
            plugin_id: "a".to_string()
        }
    );
}

#[test]
fn test_unrelated_plugins_keep_insertion_order() {
    let resolution = resolve(&[
        DefinitionBuilder::new("zeta", "1.0.0").build(),
        DefinitionBuilder::new("alpha", "1.0.0").build(),
        DefinitionBuilder::new("mira", "1.0.0").build(),
    ]);

    // No import relationships: first-seen order is the explicit tie-break.
    assert_eq!(accepted_ids(&resolution), vec!["zeta", "alpha", "mira"]);
}

#[test]
fn test_topological_validity_with_diamond() {
    let resolution = resolve(&[
        DefinitionBuilder::new("app", "1.0.0")
            .import("left", "l", "*")
            .import("right", "r", "*")
            .build(),
        DefinitionBuilder::new("l", "1.0.0")
            .service("left", "1.0.0")
            .import("base", "core", "*")
            .build(),
        DefinitionBuilder::new("r", "1.0.0")
            .service("right", "1.0.0")
            .import("base", "core", "*")
            .build(),
        DefinitionBuilder::new("core", "1.0.0")
            .service("base", "1.0.0")
            .build(),
    ]);

    let ids = accepted_ids(&resolution);
    assert_eq!(ids.len(), 4);
    let position = |id: &str| ids.iter().position(|x| *x == id).unwrap();
    assert!(position("core") < position("l"));
    assert!(position("core") < position("r"));
    assert!(position("l") < position("app"));
    assert!(position("r") < position("app"));
}

#[test]
fn test_partition_completeness() {
    let definitions = vec![
        DefinitionBuilder::new("ok", "1.0.0").build(),
        DefinitionBuilder::new("bad", "x.y.z").build(),
        DefinitionBuilder::new("lonely", "1.0.0")
            .import("svc", "ghost", "*")
            .build(),
    ];
    let resolution = resolve(&definitions);

    assert_eq!(
        resolution.accepted.len() + resolution.rejected.len(),
        definitions.len()
    );
    for node in &resolution.accepted {
        assert!(
            !resolution.rejected.iter().any(|r| r.plugin_id == node.id()),
            "'{}' appears in both partitions",
            node.id()
        );
    }
}

#[test]
fn test_resolution_is_deterministic_across_runs() {
    let definitions = vec![
        DefinitionBuilder::new("core", "1.0.0")
            .service("base", "1.0.0")
            .build(),
        DefinitionBuilder::new("app", "1.0.0")
            .import("base", "core", "^1.0.0")
            .build(),
        DefinitionBuilder::new("solo1", "1.0.0").build(),
        DefinitionBuilder::new("solo2", "1.0.0").build(),
    ];

    let first = resolve(&definitions);
    let second = resolve(&definitions);
    assert_eq!(accepted_ids(&first), accepted_ids(&second));
    assert_eq!(first.rejected, second.rejected);
}

#[test]
fn test_permuting_unrelated_siblings_keeps_graph_outcome() {
    // Providers/consumers fixed, unrelated siblings permuted: the verdicts
    // and the provider-before-consumer property must not change; only the
    // documented first-seen tie-break among the siblings may.
    let core = || {
        DefinitionBuilder::new("core", "1.0.0")
            .service("base", "1.0.0")
            .build()
    };
    let app = || {
        DefinitionBuilder::new("app", "1.0.0")
            .import("base", "core", "^1.0.0")
            .build()
    };
    let solo1 = || DefinitionBuilder::new("solo1", "1.0.0").build();
    let solo2 = || DefinitionBuilder::new("solo2", "1.0.0").build();

    let forward = resolve(&[solo1(), core(), app(), solo2()]);
    let backward = resolve(&[solo2(), core(), app(), solo1()]);

    for resolution in [&forward, &backward] {
        let ids = accepted_ids(resolution);
        assert_eq!(ids.len(), 4);
        assert!(resolution.rejected.is_empty());
        let position = |id: &str| ids.iter().position(|x| *x == id).unwrap();
        assert!(position("core") < position("app"));
    }

    let mut forward_set: Vec<&str> = accepted_ids(&forward);
    let mut backward_set: Vec<&str> = accepted_ids(&backward);
    forward_set.sort_unstable();
    backward_set.sort_unstable();
    assert_eq!(forward_set, backward_set);
}

#[test]
fn test_one_reason_per_rejected_plugin() {
    // "broken" qualifies for InvalidDefinition and participates in what
    // would be a cycle; the first cause in pass order wins.
    let resolution = resolve(&[
        DefinitionBuilder::new("broken", "bad-version")
            .service("x", "1.0.0")
            .import("y", "other", "*")
            .build(),
        DefinitionBuilder::new("other", "1.0.0")
            .service("y", "1.0.0")
            .import("x", "broken", "*")
            .build(),
    ]);

    assert!(matches!(
        rejection_of(&resolution, "broken"),
        RejectionReason::InvalidDefinition { .. }
    ));
    // "other" imported from a validation-rejected provider.
    assert!(matches!(
        rejection_of(&resolution, "other"),
        RejectionReason::UnresolvedImport { .. }
    ));
    assert_eq!(resolution.rejected.len(), 2);
}

#[test]
fn test_import_resolves_against_highest_satisfying_version() {
    let resolution = resolve(&[
        DefinitionBuilder::new("provider", "1.0.0")
            .service("svc", "1.0.0")
            .service("svc", "1.2.0")
            .service("svc", "2.0.0")
            .build(),
        DefinitionBuilder::new("consumer", "1.0.0")
            .import("svc", "provider", "^1.0.0")
            .build(),
    ]);

    assert_eq!(accepted_ids(&resolution), vec!["provider", "consumer"]);
    let provider = &resolution.accepted[0];
    let group = provider.exposed_group("svc").unwrap();
    assert_eq!(group.highest_version().to_string(), "2.0.0");
    assert_eq!(group.len(), 3);
}

#[test]
fn test_accepted_node_carries_opaque_implementation() {
    let resolution = resolve(&[DefinitionBuilder::new("impl", "1.0.0")
        .entry_point("dist/main.js")
        .build()]);

    let node = &resolution.accepted[0];
    // The handle is stored untouched; the core never interprets it.
    assert_eq!(node.implementation().unwrap().entry_point(), "dist/main.js");
    assert_eq!(node.declared_version().unwrap().to_string(), "1.0.0");
}

#[test]
fn test_zero_import_plugin_always_orderable() {
    let resolution = resolve(&[
        DefinitionBuilder::new("island", "1.0.0").build(),
        DefinitionBuilder::new("sink", "1.0.0")
            .import("svc", "ghost", "*")
            .build(),
    ]);

    assert_eq!(accepted_ids(&resolution), vec!["island"]);
    assert_eq!(resolution.rejected.len(), 1);
}
