use crate::fetch::{HttpRegistry, PackageMetadata};

#[test]
fn packument_url_joins_plain_names() {
    let reg = HttpRegistry::new(Some("https://mirror.example/npm/".into()));
    assert_eq!(
        reg.packument_url("left-pad"),
        "https://mirror.example/npm/left-pad"
    );
}

#[test]
fn packument_url_encodes_scoped_names() {
    let reg = HttpRegistry::new(Some("https://registry.npmjs.org".into()));
    assert_eq!(
        reg.packument_url("@types/node"),
        "https://registry.npmjs.org/@types%2Fnode"
    );
}

#[test]
fn deserialization_drops_everything_but_dependencies() {
    let raw = serde_json::json!({
        "name": "a",
        "description": "a package",
        "dist-tags": { "latest": "1.2.0" },
        "versions": {
            "1.2.0": {
                "version": "1.2.0",
                "description": "a package",
                "dependencies": { "b": "^2.0.0" },
                "devDependencies": { "jest": "^29.0.0" },
                "dist": {
                    "tarball": "https://registry.npmjs.org/a/-/a-1.2.0.tgz",
                    "shasum": "abc123"
                }
            }
        }
    });

    let meta: PackageMetadata = serde_json::from_value(raw).unwrap();
    assert_eq!(meta.versions.len(), 1);
    let manifest = &meta.versions["1.2.0"];
    assert_eq!(manifest.dependencies["b"], "^2.0.0");
    assert_eq!(manifest.dependencies.len(), 1);

    // The persisted shape carries nothing beyond the dependency manifests.
    let round = serde_json::to_value(&meta).unwrap();
    assert_eq!(
        round,
        serde_json::json!({
            "versions": { "1.2.0": { "dependencies": { "b": "^2.0.0" } } }
        })
    );
}

#[test]
fn missing_dependencies_field_means_no_dependencies() {
    let raw = serde_json::json!({ "versions": { "1.0.0": {} } });
    let meta: PackageMetadata = serde_json::from_value(raw).unwrap();
    assert!(meta.versions["1.0.0"].dependencies.is_empty());
}
