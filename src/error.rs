use std::path::Path;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlanError>;

/// Fatal planning failures. Any of these anywhere in the walk aborts the
/// whole plan; no partial plan is ever returned.
///
/// `Clone` so the metadata cache can memoize a failed fetch and hand the
/// same outcome to every caller of that package name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("registry request for '{name}' failed: {reason}")]
    Fetch { name: String, reason: String },

    #[error("no version of {name} satisfies range '{range}'")]
    UnsatisfiableRange { name: String, range: String },

    #[error("invalid semver range '{range}' for {name}: {reason}")]
    InvalidRange {
        name: String,
        range: String,
        reason: String,
    },
}

impl PlanError {
    pub fn fetch(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unsatisfiable(name: impl Into<String>, range: impl Into<String>) -> Self {
        Self::UnsatisfiableRange {
            name: name.into(),
            range: range.into(),
        }
    }

    pub fn invalid_range(
        name: impl Into<String>,
        range: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidRange {
            name: name.into(),
            range: range.into(),
            reason: reason.to_string(),
        }
    }
}

/// Persistent-cache failures. Never fatal: they are logged at the point of
/// failure and resolution continues on the in-memory tier alone.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read metadata cache {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to write metadata cache {path}: {reason}")]
    Write { path: String, reason: String },
}

impl CacheError {
    pub fn read(path: &Path, reason: impl ToString) -> Self {
        Self::Read {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write(path: &Path, reason: impl ToString) -> Self {
        Self::Write {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
