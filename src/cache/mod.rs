use crate::error::{CacheError, PlanError};
use crate::fetch::{PackageMetadata, RegistryClient};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Capability the planner consumes: some source of per-package metadata.
/// The planner never learns whether an answer came from memory, disk or the
/// network.
pub trait MetadataSource: Send + Sync {
    fn package_metadata(&self, name: &str) -> Result<Arc<PackageMetadata>, PlanError>;
}

type FetchOutcome = Result<Arc<PackageMetadata>, PlanError>;

/// Two-tier read-through cache in front of a registry client.
///
/// The in-memory tier memoizes one fetch outcome per package name through a
/// single-flight cell: concurrent first requests for the same name collapse
/// into one registry call and every caller shares its result, success or
/// failure. A package name therefore triggers at most one registry request
/// per process lifetime.
///
/// The optional persistent tier is a JSON file read once at construction and
/// rewritten whole after every successfully fetched miss. It is strictly an
/// optimization: read and write failures are logged and resolution carries
/// on with the in-memory tier alone.
pub struct MetadataCache<R> {
    registry: R,
    flights: Mutex<HashMap<String, Arc<OnceCell<FetchOutcome>>>>,
    disk: Option<Mutex<DiskCache>>,
}

impl<R: RegistryClient> MetadataCache<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            flights: Mutex::new(HashMap::new()),
            disk: None,
        }
    }

    pub fn with_disk_cache(registry: R, path: PathBuf) -> Self {
        Self {
            registry,
            flights: Mutex::new(HashMap::new()),
            disk: Some(Mutex::new(DiskCache::load(path))),
        }
    }

    fn lookup(&self, name: &str) -> FetchOutcome {
        let cell = {
            let mut flights = self.flights.lock();
            flights.entry(name.to_string()).or_default().clone()
        };
        // Late arrivals block here until the first caller's fill completes.
        cell.get_or_init(|| self.fill(name)).clone()
    }

    fn fill(&self, name: &str) -> FetchOutcome {
        if let Some(disk) = &self.disk {
            if let Some(meta) = disk.lock().get(name) {
                debug!(package = name, "metadata served from persistent cache");
                return Ok(Arc::new(meta));
            }
        }
        let meta = self.registry.fetch_packument(name)?;
        if let Some(disk) = &self.disk {
            let mut disk = disk.lock();
            disk.insert(name, &meta);
            if let Err(err) = disk.persist() {
                warn!(package = name, error = %err, "continuing without persistent cache");
            }
        }
        Ok(Arc::new(meta))
    }
}

impl<R: RegistryClient> MetadataSource for MetadataCache<R> {
    fn package_metadata(&self, name: &str) -> Result<Arc<PackageMetadata>, PlanError> {
        self.lookup(name)
    }
}

struct DiskCache {
    path: PathBuf,
    entries: BTreeMap<String, PackageMetadata>,
}

impl DiskCache {
    fn load(path: PathBuf) -> Self {
        let entries = match Self::read(&path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "persistent cache unreadable; starting empty");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    fn read(path: &Path) -> Result<BTreeMap<String, PackageMetadata>, CacheError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(path).map_err(|e| CacheError::read(path, e))?;
        serde_json::from_str(&data).map_err(|e| CacheError::read(path, e))
    }

    fn get(&self, name: &str) -> Option<PackageMetadata> {
        self.entries.get(name).cloned()
    }

    fn insert(&mut self, name: &str, meta: &PackageMetadata) {
        self.entries.insert(name.to_string(), meta.clone());
    }

    fn persist(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::write(&self.path, e))?;
        }
        let data =
            serde_json::to_string(&self.entries).map_err(|e| CacheError::write(&self.path, e))?;
        fs::write(&self.path, data).map_err(|e| CacheError::write(&self.path, e))
    }
}
