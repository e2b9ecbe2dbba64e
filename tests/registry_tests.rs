//! Plugin registry and discovery integration tests

use std::sync::Arc;

use packages_core::{GetConfiguredPluginsRequest, PackagesPlugin, PluginRef};
use packages_gateway::Error;
use packages_gateway::plugins::{
    LIBRARY_EXTENSION, PluginBinding, PluginRegistry, PluginsServer, discover_plugin_libraries,
};
use pretty_assertions::assert_eq;

mod common;
use common::{FakePlugin, test_registry, test_resolver};

fn registry_of(refs: &[(&str, &str)]) -> Arc<PluginRegistry> {
    let fakes: Vec<Arc<FakePlugin>> = refs
        .iter()
        .map(|(name, version)| Arc::new(FakePlugin::new(name, version)))
        .collect();
    test_registry(&fakes)
}

fn refs(items: &[(&str, &str)]) -> Vec<PluginRef> {
    items
        .iter()
        .map(|(name, version)| PluginRef::new(*name, *version))
        .collect()
}

#[test]
fn plugins_are_sorted_by_name() {
    let registry = registry_of(&[
        ("kapp_controller.packages", "v1alpha1"),
        ("fluxv2.packages", "v1alpha1"),
    ]);

    assert_eq!(
        registry.plugins(),
        refs(&[
            ("fluxv2.packages", "v1alpha1"),
            ("kapp_controller.packages", "v1alpha1"),
        ])
    );
}

#[test]
fn versions_sort_byte_wise_not_semantically() {
    let registry = registry_of(&[
        ("fluxv2.packages", "v1beta1"),
        ("fluxv2.packages", "v1alpha2"),
        ("fluxv2.packages", "v1"),
        ("fluxv2.packages", "v1alpha1"),
    ]);

    assert_eq!(
        registry.plugins(),
        refs(&[
            ("fluxv2.packages", "v1"),
            ("fluxv2.packages", "v1alpha1"),
            ("fluxv2.packages", "v1alpha2"),
            ("fluxv2.packages", "v1beta1"),
        ])
    );
}

#[test]
fn lookup_requires_exact_name_and_version() {
    let registry = registry_of(&[("plugin-1", "v1alpha1"), ("plugin-2", "v1")]);

    let found = registry.lookup(&PluginRef::new("plugin-1", "v1alpha1")).unwrap();
    assert_eq!(found.plugin(), &PluginRef::new("plugin-1", "v1alpha1"));

    assert!(registry.lookup(&PluginRef::new("plugin-1", "v1alpha2")).is_none());
    assert!(registry.lookup(&PluginRef::new("plugin-1", "v1")).is_none());
    assert!(registry.lookup(&PluginRef::new("plugin", "v1alpha1")).is_none());
}

#[test]
fn duplicate_identity_is_rejected() {
    let bindings = ["v1alpha1", "v1alpha1"]
        .into_iter()
        .map(|version| {
            let fake: Arc<dyn PackagesPlugin> = Arc::new(FakePlugin::new("dup", version));
            PluginBinding::new(PluginRef::new("dup", version), fake)
        })
        .collect();

    let err = PluginRegistry::new(bindings).unwrap_err();
    assert!(matches!(err, Error::DuplicatePlugin(ref p) if p == &PluginRef::new("dup", "v1alpha1")));
}

#[test]
fn configured_plugins_are_returned_in_registry_order() {
    let server = PluginsServer::new(registry_of(&[
        ("kapp_controller.packages", "v1alpha1"),
        ("fluxv2.packages", "v1alpha1"),
        ("fluxv2.packages", "v1"),
    ]));

    let response = server
        .get_configured_plugins(GetConfiguredPluginsRequest {})
        .unwrap();

    assert_eq!(
        response.plugins,
        refs(&[
            ("fluxv2.packages", "v1"),
            ("fluxv2.packages", "v1alpha1"),
            ("kapp_controller.packages", "v1alpha1"),
        ])
    );
}

#[test]
fn discovery_keeps_directory_order() {
    let plugins = tempfile::tempdir().unwrap();
    let other = tempfile::tempdir().unwrap();
    for name in ["foo", "bar"] {
        std::fs::write(plugins.path().join(format!("{name}.{LIBRARY_EXTENSION}")), b"").unwrap();
    }
    std::fs::write(other.path().join(format!("zap.{LIBRARY_EXTENSION}")), b"").unwrap();

    let found = discover_plugin_libraries(&[plugins.path(), other.path()]).unwrap();

    assert_eq!(
        found,
        vec![
            plugins.path().join(format!("bar.{LIBRARY_EXTENSION}")),
            plugins.path().join(format!("foo.{LIBRARY_EXTENSION}")),
            other.path().join(format!("zap.{LIBRARY_EXTENSION}")),
        ]
    );
}

#[test]
fn load_all_with_no_libraries_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

    let registry = PluginRegistry::load_all(&[dir.path()], &test_resolver()).unwrap();

    assert!(registry.is_empty());
}

#[test]
fn load_all_fails_on_a_broken_library() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(format!("broken.{LIBRARY_EXTENSION}")),
        b"not a shared library",
    )
    .unwrap();

    let err = PluginRegistry::load_all(&[dir.path()], &test_resolver()).unwrap_err();

    assert!(matches!(err, Error::PluginLoad { .. }));
}
