//! Registry trait for fetching package metadata from remote sources

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::PackageMetadata;

/// Trait for fetching package metadata from a registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Returns the base URL requests are sent to
    fn base_url(&self) -> &str;

    /// Fetches dist-tags and published versions for a package
    ///
    /// # Arguments
    /// * `package_name` - The name of the package (e.g., "lodash", "@types/node")
    ///
    /// # Returns
    /// * `Ok(PackageMetadata)` - Dist-tags and every published version
    /// * `Err(RegistryError)` - If the fetch fails or the package does not exist
    async fn fetch_package_metadata(
        &self,
        package_name: &str,
    ) -> Result<PackageMetadata, RegistryError>;
}
