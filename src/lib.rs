//! Resolver core of an npm-compatible installer: computes a deterministic
//! installation plan from a top-level dependency map, deduplicating and
//! hoisting shared packages toward the root of the modules tree. Actually
//! materializing the tree is a downstream concern.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod fsutil;
pub mod hoist;
pub mod planner;
pub mod resolver;
#[cfg(test)]
pub mod tests;

pub use error::PlanError;
pub use planner::plan::{InstallLocation, InstallationPlan, PlanEntry};
pub use planner::{construct_installation_plan, FetchMode, PlanOptions, Planner};
