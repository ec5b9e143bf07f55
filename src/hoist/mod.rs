use crate::planner::plan::{InstallLocation, InstallationPlan, PlanEntry, UsageLedger};
use tracing::debug;

/// Offer every `(name, version)` pair seen during the walk a slot at the
/// root of the modules tree: a root entry is appended for each pair that
/// does not already have one.
///
/// Existing entries are never rewritten or removed, usage counts are not
/// consulted, and no winner is picked among conflicting versions of one
/// package: each distinct version gets its own root offer. Idempotent by
/// construction. Returns the number of entries appended.
pub fn hoist_to_root(ledger: &UsageLedger, plan: &mut InstallationPlan) -> usize {
    let mut added = 0;
    for (name, version) in ledger.keys() {
        if plan.contains(name, version, &InstallLocation::Root) {
            continue;
        }
        plan.push(PlanEntry {
            name: name.clone(),
            version: version.clone(),
            location: InstallLocation::Root,
        });
        added += 1;
    }
    if added > 0 {
        debug!(added, "hoisted shared packages to root");
    }
    added
}
