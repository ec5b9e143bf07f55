pub mod range;

pub use range::RangeSet;

use crate::error::{PlanError, Result};
use crate::fetch::PackageMetadata;
use semver::Version;

/// Pick the highest version in `available` satisfying `range`.
///
/// Pure and deterministic: identical inputs always produce the same answer.
pub fn pick_version(name: &str, available: &[Version], range: &RangeSet) -> Result<Version> {
    let mut candidates: Vec<&Version> = available.iter().collect();
    candidates.sort_unstable_by(|a, b| b.cmp(a));
    candidates
        .into_iter()
        .find(|v| range.matches(v))
        .cloned()
        .ok_or_else(|| PlanError::unsatisfiable(name, range.raw()))
}

/// All well-formed versions a packument advertises. Version strings that do
/// not parse as semver are skipped rather than failing the resolution.
pub fn known_versions(meta: &PackageMetadata) -> Vec<Version> {
    meta.versions
        .keys()
        .filter_map(|v| Version::parse(v).ok())
        .collect()
}
