use super::mock::StaticRegistry;
use crate::cache::{MetadataCache, MetadataSource};
use crate::error::PlanError;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

fn one_package_registry() -> Arc<StaticRegistry> {
    Arc::new(StaticRegistry::new().package("a", &[("1.0.0", &[("b", "^1.0.0")])]))
}

#[test]
fn repeated_lookups_hit_the_registry_once() {
    let registry = one_package_registry();
    let cache = MetadataCache::new(registry.clone());

    let first = cache.package_metadata("a").unwrap();
    let second = cache.package_metadata("a").unwrap();
    assert_eq!(first, second);
    assert_eq!(registry.calls(), 1);
}

#[test]
fn concurrent_first_requests_collapse_into_one_fetch() {
    let registry = one_package_registry();
    let cache = MetadataCache::new(registry.clone());

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                cache.package_metadata("a").unwrap();
            });
        }
    });
    assert_eq!(registry.calls(), 1);
}

#[test]
fn failed_fetches_are_memoized_too() {
    let registry = Arc::new(StaticRegistry::new());
    let cache = MetadataCache::new(registry.clone());

    let first = cache.package_metadata("ghost").unwrap_err();
    let second = cache.package_metadata("ghost").unwrap_err();
    assert!(matches!(first, PlanError::Fetch { .. }));
    assert_eq!(first, second);
    assert_eq!(registry.calls(), 1);
}

#[test]
fn persistent_tier_survives_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metadata-cache.json");

    let registry = one_package_registry();
    let cache = MetadataCache::with_disk_cache(registry.clone(), path.clone());
    cache.package_metadata("a").unwrap();
    assert_eq!(registry.calls(), 1);
    drop(cache);

    // A fresh process with the same cache file never touches the registry.
    let cold_registry = Arc::new(StaticRegistry::new());
    let cache = MetadataCache::with_disk_cache(cold_registry.clone(), path);
    let meta = cache.package_metadata("a").unwrap();
    assert_eq!(meta.versions["1.0.0"].dependencies["b"], "^1.0.0");
    assert_eq!(cold_registry.calls(), 0);
}

#[test]
fn malformed_cache_file_is_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metadata-cache.json");
    std::fs::write(&path, "{ not json").unwrap();

    let registry = one_package_registry();
    let cache = MetadataCache::with_disk_cache(registry.clone(), path.clone());
    cache.package_metadata("a").unwrap();
    assert_eq!(registry.calls(), 1);

    // The rewrite after the miss repaired the file.
    let repaired: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(repaired.contains_key("a"));
}

#[test]
fn unwritable_cache_path_does_not_fail_resolution() {
    let dir = tempfile::tempdir().unwrap();
    // The parent of the cache path is a regular file, so every write fails.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let path = blocker.join("metadata-cache.json");

    let registry = one_package_registry();
    let cache = MetadataCache::with_disk_cache(registry.clone(), path);
    let meta = cache.package_metadata("a").unwrap();
    assert_eq!(meta.versions.len(), 1);

    // Still memoized in memory despite the failed persist.
    cache.package_metadata("a").unwrap();
    assert_eq!(registry.calls(), 1);
}
