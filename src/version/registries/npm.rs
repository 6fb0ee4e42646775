//! npm registry API implementation

use std::collections::HashMap;
use std::time::Duration;

use crate::config::{DEFAULT_REGISTRY_URL, FETCH_TIMEOUT_MS};
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::types::PackageMetadata;
use serde::Deserialize;
use tracing::{debug, warn};

/// Response from npm registry API (the "packument")
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
    /// Some registries answer unknown packages with 200 and an error body
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Registry implementation for npm registry API
#[derive(Clone)]
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl NpmRegistry {
    /// Creates a new NpmRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("verlens-lsp")
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Encode package name for URL (handles scoped packages)
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_package_metadata(
        &self,
        package_name: &str,
    ) -> Result<PackageMetadata, RegistryError> {
        let encoded_name = Self::encode_package_name(package_name);
        let url = format!("{}/{}", self.base_url, encoded_name);
        debug!("Fetching package metadata: {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if !status.is_success() {
            warn!("npm registry returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let package_info: NpmPackageResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse npm registry response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        if let Some(error) = package_info.error {
            debug!("npm registry reported an error for {}: {}", package_name, error);
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        Ok(PackageMetadata::new(
            package_info.name.unwrap_or_else(|| package_name.to_string()),
            package_info.dist_tags,
            package_info.versions.into_keys(),
        ))
    }
}
