use semver::Version;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Logical slot in the nested modules tree.
///
/// `Root` is the top-level modules directory. `Nested` holds the path of
/// the package whose private `node_modules` directory encloses the slot,
/// e.g. `"a"` or `"a/node_modules/c"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstallLocation {
    Root,
    Nested(String),
}

impl InstallLocation {
    /// Location assigned to the children of a package named `name` resolved
    /// at `self`: each resolved package owns a nested modules directory for
    /// its own dependencies.
    pub fn child_of(&self, name: &str) -> InstallLocation {
        match self {
            InstallLocation::Root => InstallLocation::Nested(name.to_string()),
            InstallLocation::Nested(path) => {
                InstallLocation::Nested(format!("{path}/node_modules/{name}"))
            }
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, InstallLocation::Root)
    }
}

impl fmt::Display for InstallLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallLocation::Root => f.write_str("root"),
            InstallLocation::Nested(path) => f.write_str(path),
        }
    }
}

impl Serialize for InstallLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identifies one logical slot: a package name at an install location. At
/// most one [`PendingResolution`] exists per key during a plan construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub location: InstallLocation,
    pub name: String,
}

/// Range bookkeeping for one slot. Later sightings of the slot widen
/// `merged_range` with a disjunction; the version resolved at first
/// sighting stands regardless.
#[derive(Debug, Clone)]
pub struct PendingResolution {
    pub name: String,
    pub merged_range: String,
    pub location: InstallLocation,
}

/// One concrete placement decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub name: String,
    pub version: Version,
    #[serde(rename = "installLocation")]
    pub location: InstallLocation,
}

impl PlanEntry {
    /// Directory the materializer would write this package into, relative
    /// to the top-level modules directory.
    pub fn install_path(&self) -> String {
        match &self.location {
            InstallLocation::Root => self.name.clone(),
            InstallLocation::Nested(path) => format!("{path}/node_modules/{}", self.name),
        }
    }
}

impl fmt::Display for PlanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} -> {}", self.name, self.version, self.install_path())
    }
}

/// How often one exact `(name, version)` was placed, and where. Consumed
/// only by the hoisting pass.
#[derive(Debug, Clone, Default)]
pub struct UsageRecord {
    pub count: u32,
    pub locations: Vec<InstallLocation>,
}

pub type UsageLedger = BTreeMap<(String, Version), UsageRecord>;

/// The ordered placement decisions for one plan construction. Entry order
/// reflects discovery order; hoisted entries are appended at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstallationPlan {
    entries: Vec<PlanEntry>,
}

impl InstallationPlan {
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str, version: &Version, location: &InstallLocation) -> bool {
        self.entries
            .iter()
            .any(|e| e.name == name && &e.version == version && &e.location == location)
    }

    pub(crate) fn push(&mut self, entry: PlanEntry) {
        self.entries.push(entry);
    }
}

impl<'a> IntoIterator for &'a InstallationPlan {
    type Item = &'a PlanEntry;
    type IntoIter = std::slice::Iter<'a, PlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
