use dirs::data_local_dir;
use std::path::PathBuf;

pub fn data_root() -> PathBuf {
    let mut root = data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    root.push("hoist");
    root.push("v1");
    root
}

/// Default location of the persistent metadata cache file.
pub fn metadata_cache_path() -> PathBuf {
    let mut p = data_root();
    p.push("metadata-cache.json");
    p
}
