pub mod plan;

use crate::cache::{MetadataCache, MetadataSource};
use crate::error::Result;
use crate::fetch::HttpRegistry;
use crate::hoist;
use crate::resolver::{self, RangeSet};
use parking_lot::Mutex;
use plan::{
    InstallLocation, InstallationPlan, PendingResolution, PlanEntry, ResolutionKey, UsageLedger,
};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Nodes deeper than this are recorded but not expanded. Dependency cycles
/// would otherwise unroll into an unbounded nested tree, since every level
/// of nesting is a fresh set of resolution keys.
const MAX_DEPTH: usize = 100;

/// How the planner schedules metadata fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// One fetch at a time, in traversal order.
    #[default]
    Serial,
    /// Prefetch each node's child packuments in parallel before recursing.
    /// The walk itself stays sequential and the metadata cache memoizes
    /// prefetch outcomes, so plans are identical to `Serial` mode.
    Parallel,
}

/// Settings for [`construct_installation_plan`].
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Registry base URL; `None` falls back to `HOIST_REGISTRY`, then the
    /// npm default.
    pub registry: Option<String>,
    /// Persistent metadata cache file; `None` disables the persistent tier.
    pub cache_path: Option<PathBuf>,
    pub fetch_mode: FetchMode,
}

impl PlanOptions {
    /// Enable the persistent metadata cache at its default location.
    pub fn with_default_cache(mut self) -> Self {
        self.cache_path = Some(crate::fsutil::metadata_cache_path());
        self
    }
}

/// The recursive resolution engine: walks the dependency graph from the
/// top-level manifest, resolves each slot to a concrete version, and
/// accumulates the installation plan and usage ledger the hoisting pass
/// consumes.
pub struct Planner<S> {
    source: S,
    fetch_mode: FetchMode,
}

#[derive(Default)]
struct PlanState {
    pending: HashMap<ResolutionKey, PendingResolution>,
    ledger: UsageLedger,
    plan: InstallationPlan,
}

impl<S: MetadataSource> Planner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            fetch_mode: FetchMode::Serial,
        }
    }

    pub fn with_fetch_mode(source: S, fetch_mode: FetchMode) -> Self {
        Self { source, fetch_mode }
    }

    /// Compute the installation plan for a top-level dependency map.
    ///
    /// Fails with the first fatal error anywhere in the transitive graph;
    /// no partial plan is returned.
    pub fn plan(&self, top_level: &BTreeMap<String, String>) -> Result<InstallationPlan> {
        self.plan_entries(top_level.iter().map(|(n, r)| (n.as_str(), r.as_str())))
    }

    /// Like [`Planner::plan`], but accepts an ordered sequence that may
    /// declare the same package name more than once; repeated declarations
    /// of one slot merge instead of resolving twice.
    pub fn plan_entries<'a, I>(&self, top_level: I) -> Result<InstallationPlan>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let declared: Vec<(&str, &str)> = top_level.into_iter().collect();
        let state = Mutex::new(PlanState::default());

        if self.fetch_mode == FetchMode::Parallel && declared.len() > 1 {
            declared.par_iter().for_each(|(name, _)| {
                let _ = self.source.package_metadata(name);
            });
        }
        for (name, range) in &declared {
            self.visit(&state, name, range, InstallLocation::Root, 0)?;
        }

        let mut state = state.into_inner();
        let hoisted = hoist::hoist_to_root(&state.ledger, &mut state.plan);
        debug!(
            entries = state.plan.len(),
            hoisted, "installation plan complete"
        );
        Ok(state.plan)
    }

    fn visit(
        &self,
        state: &Mutex<PlanState>,
        name: &str,
        range: &str,
        location: InstallLocation,
        depth: usize,
    ) -> Result<()> {
        let key = ResolutionKey {
            location: location.clone(),
            name: name.to_string(),
        };

        // Atomic check-and-insert: either this sighting owns the slot, or
        // the slot already has an owner and only its recorded range widens.
        {
            let mut st = state.lock();
            if let Some(pending) = st.pending.get_mut(&key) {
                let merged = format!("{} || {}", pending.merged_range, range);
                // Re-validate the textual form only. The merged range is
                // never consulted again: the slot keeps the version it
                // resolved at first sighting.
                RangeSet::parse(name, &merged)?;
                debug!(package = name, slot = %key.location, %merged, "slot revisited; range widened");
                pending.merged_range = merged;
                return Ok(());
            }
            st.pending.insert(
                key,
                PendingResolution {
                    name: name.to_string(),
                    merged_range: range.to_string(),
                    location: location.clone(),
                },
            );
        }

        let range_set = RangeSet::parse(name, range)?;
        let meta = self.source.package_metadata(name)?;
        let available = resolver::known_versions(&meta);
        let version = resolver::pick_version(name, &available, &range_set)?;
        let manifest = meta
            .versions
            .get(&version.to_string())
            .map(|m| m.dependencies.clone())
            .unwrap_or_default();

        {
            let mut st = state.lock();
            let record = st
                .ledger
                .entry((name.to_string(), version.clone()))
                .or_default();
            record.count += 1;
            record.locations.push(location.clone());
            st.plan.push(PlanEntry {
                name: name.to_string(),
                version,
                location: location.clone(),
            });
        }

        if depth >= MAX_DEPTH {
            warn!(package = name, depth, "dependency tree too deep; not expanding further");
            return Ok(());
        }

        if self.fetch_mode == FetchMode::Parallel && manifest.len() > 1 {
            manifest.par_iter().for_each(|(dep, _)| {
                let _ = self.source.package_metadata(dep);
            });
        }
        let child_location = location.child_of(name);
        for (dep_name, dep_range) in &manifest {
            self.visit(state, dep_name, dep_range, child_location.clone(), depth + 1)?;
        }
        Ok(())
    }
}

/// Wire up the default stack (HTTP registry behind the two-tier metadata
/// cache) and compute a plan. This is the whole-crate entry point; callers
/// with their own [`MetadataSource`] use [`Planner`] directly.
pub fn construct_installation_plan(
    top_level: &BTreeMap<String, String>,
    options: &PlanOptions,
) -> Result<InstallationPlan> {
    let registry = HttpRegistry::new(options.registry.clone());
    let cache = match &options.cache_path {
        Some(path) => MetadataCache::with_disk_cache(registry, path.clone()),
        None => MetadataCache::new(registry),
    };
    Planner::with_fetch_mode(cache, options.fetch_mode).plan(top_level)
}
