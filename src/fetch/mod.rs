use crate::error::PlanError;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Registry queried when no override is configured.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Environment variable overriding the registry URL.
pub const REGISTRY_ENV: &str = "HOIST_REGISTRY";

/// Ask for the abbreviated packument; registries that don't support it fall
/// back to the full document, which deserialization narrows anyway.
const ACCEPT_PACKUMENT: &str = "application/vnd.npm.install-v1+json, application/json;q=0.8";

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("hoist/0.1.0 (+https://github.com/hoistpkg/hoist)")
        .build()
        .expect("http client")
});

/// Minimized per-package metadata: every published version mapped to the
/// dependencies that version declares. Everything else a registry returns
/// (dist URLs, descriptions, maintainers, ...) is dropped at
/// deserialization time, which keeps both the in-memory map and the
/// persistent cache file bounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    #[serde(default)]
    pub versions: BTreeMap<String, VersionManifest>,
}

/// What one published version declares about its own dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionManifest {
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

/// Capability the metadata cache consumes: fetch the full version listing
/// for one package name.
pub trait RegistryClient: Send + Sync {
    fn fetch_packument(&self, name: &str) -> Result<PackageMetadata, PlanError>;
}

impl<R: RegistryClient + ?Sized> RegistryClient for Arc<R> {
    fn fetch_packument(&self, name: &str) -> Result<PackageMetadata, PlanError> {
        (**self).fetch_packument(name)
    }
}

/// npm-compatible registry over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    registry: String,
}

impl HttpRegistry {
    /// `registry` falls back to `HOIST_REGISTRY`, then the npm default.
    pub fn new(registry: Option<String>) -> Self {
        let registry = registry
            .or_else(|| std::env::var(REGISTRY_ENV).ok())
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_string());
        Self {
            registry: registry.trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn packument_url(&self, name: &str) -> String {
        // Scoped names keep the '@' but encode the separating slash.
        let encoded = if name.starts_with('@') {
            name.replace('/', "%2F")
        } else {
            name.to_string()
        };
        format!("{}/{}", self.registry, encoded)
    }
}

impl Default for HttpRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RegistryClient for HttpRegistry {
    fn fetch_packument(&self, name: &str) -> Result<PackageMetadata, PlanError> {
        let url = self.packument_url(name);
        tracing::debug!(%url, "fetching packument");
        let resp = CLIENT
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT_PACKUMENT)
            .send()
            .map_err(|e| PlanError::fetch(name, e))?;
        if !resp.status().is_success() {
            return Err(PlanError::fetch(
                name,
                format!("registry returned {} for {}", resp.status(), url),
            ));
        }
        resp.json().map_err(|e| PlanError::fetch(name, e))
    }
}
