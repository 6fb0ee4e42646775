//! Registry client: memoized metadata fetches and the versions derived from them

use std::sync::Arc;

use tracing::{error, info};

use crate::version::cache::{FetchResult, MetadataCache};
use crate::version::error::RegistryError;
use crate::version::range::max_satisfying;
use crate::version::registry::Registry;
use crate::version::types::PackageMetadata;

/// Fetches package metadata through a [`MetadataCache`]
///
/// Every failure (network, malformed body, unknown package) collapses to `None`
/// and is cached like a success.
pub struct PackageClient {
    registry: Arc<dyn Registry>,
    cache: MetadataCache,
}

impl PackageClient {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self::with_cache(registry, MetadataCache::new())
    }

    pub fn with_cache(registry: Arc<dyn Registry>, cache: MetadataCache) -> Self {
        Self { registry, cache }
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Base URL of the registry requests go to
    pub fn registry_url(&self) -> &str {
        self.registry.base_url()
    }

    /// Dist-tags and published versions, or `None` if the fetch failed
    pub async fn fetch_package_metadata(&self, package_name: &str) -> Option<Arc<PackageMetadata>> {
        let registry = self.registry.clone();
        let name = package_name.to_string();

        self.cache
            .get_or_fetch(package_name, move || fetch(registry, name))
            .await
    }

    /// Version the `latest` dist-tag points at
    pub async fn fetch_latest_version(&self, package_name: &str) -> Option<String> {
        self.fetch_package_metadata(package_name)
            .await?
            .latest()
            .map(str::to_string)
    }

    /// Highest published version satisfying `range`
    ///
    /// Returns `None` without touching the registry when no range is given.
    pub async fn fetch_satisfies_version(
        &self,
        package_name: &str,
        range: Option<&str>,
    ) -> Option<String> {
        let range = range?;
        let metadata = self.fetch_package_metadata(package_name).await?;
        max_satisfying(metadata.versions.iter().map(String::as_str), range)
    }
}

async fn fetch(registry: Arc<dyn Registry>, package_name: String) -> FetchResult {
    match registry.fetch_package_metadata(&package_name).await {
        Ok(metadata) => {
            info!(
                "Fetched {} ({} versions)",
                package_name,
                metadata.versions.len()
            );
            Some(Arc::new(metadata))
        }
        Err(RegistryError::NotFound(_)) => {
            info!("Package not found in registry: {}", package_name);
            None
        }
        Err(e) => {
            error!("Failed to fetch {}: {}", package_name, e);
            None
        }
    }
}
