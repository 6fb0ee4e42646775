//! Registry test utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use verlens_lsp::version::error::RegistryError;
use verlens_lsp::version::registry::Registry;
use verlens_lsp::version::types::PackageMetadata;

/// In-memory registry that records every request it receives
pub struct MockRegistry {
    packages: HashMap<String, PackageMetadata>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            packages: HashMap::new(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a package; the last version is tagged `latest`
    pub fn with_versions(mut self, package: &str, versions: Vec<&str>) -> Self {
        let latest = versions.last().map(|v| v.to_string()).unwrap_or_default();
        self.packages.insert(
            package.to_string(),
            PackageMetadata::new(
                package,
                HashMap::from([("latest".to_string(), latest)]),
                versions.into_iter().map(|v| v.to_string()),
            ),
        );
        self
    }

    /// Shared log of requested package names, in request order
    pub fn requests(&self) -> Arc<Mutex<Vec<String>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl Registry for MockRegistry {
    fn base_url(&self) -> &str {
        "https://registry.test"
    }

    async fn fetch_package_metadata(
        &self,
        package_name: &str,
    ) -> Result<PackageMetadata, RegistryError> {
        self.requests.lock().unwrap().push(package_name.to_string());
        self.packages
            .get(package_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(package_name.to_string()))
    }
}

/// Count requests for a given package name
pub fn request_count(requests: &Arc<Mutex<Vec<String>>>, package: &str) -> usize {
    requests
        .lock()
        .unwrap()
        .iter()
        .filter(|name| *name == package)
        .count()
}
