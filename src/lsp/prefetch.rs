//! Background metadata prefetch for opened manifests

use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::FETCH_STAGGER_DELAY_MS;
use crate::parser::types::PackageInfo;
use crate::version::client::PackageClient;

/// Warm the metadata cache for every distinct package in a document
///
/// Fetches run in parallel with staggered start times to avoid rate limiting.
/// Packages already cached (or in flight) cost nothing. Returns the number of
/// packages whose metadata resolved.
pub async fn prefetch_packages(client: &PackageClient, packages: &[PackageInfo]) -> usize {
    let mut seen = HashSet::new();
    let names: Vec<&str> = packages
        .iter()
        .map(|package| package.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect();

    if names.is_empty() {
        return 0;
    }

    debug!("Prefetching metadata for {:?}", names);

    let futures = names.into_iter().enumerate().map(|(i, name)| {
        let delay = Duration::from_millis(FETCH_STAGGER_DELAY_MS * i as u64);
        async move {
            sleep(delay).await;
            client.fetch_package_metadata(name).await.is_some()
        }
    });

    let resolved = join_all(futures).await.into_iter().filter(|ok| *ok).count();
    info!("Prefetched {} packages", resolved);
    resolved
}
