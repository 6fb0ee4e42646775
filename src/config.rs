use serde::Deserialize;
use std::path::PathBuf;

// =============================================================================
// Registry constants
// =============================================================================

/// Public npm registry root, used when no alternate registry is configured
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for a single registry request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Delay between starting each prefetch request to avoid rate limiting (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

/// LSP configuration structure
///
/// Read from `initializationOptions` and `workspace/didChangeConfiguration`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LspConfig {
    /// Alternate registry base URL. Empty means the public npm registry.
    pub registry_url: String,
}

impl LspConfig {
    /// Parse configuration from an LSP settings payload, falling back to defaults
    ///
    /// Accepts both the bare object and one nested under a `verlens` key, which is
    /// how most editors forward `didChangeConfiguration` settings.
    pub fn from_value(value: Option<serde_json::Value>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };

        let value = match value.get("verlens") {
            Some(section) => section.clone(),
            None => value,
        };

        serde_json::from_value(value)
            .inspect_err(|e| tracing::warn!("Invalid configuration, using defaults: {}", e))
            .unwrap_or_default()
    }

    /// Effective registry base URL without a trailing slash
    pub fn registry_url(&self) -> String {
        let trimmed = self.registry_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            DEFAULT_REGISTRY_URL.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Returns the path to the data directory for verlens-lsp.
/// Uses $XDG_DATA_HOME/verlens-lsp if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/verlens-lsp,
/// or ./verlens-lsp if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join(LOG_FILE_NAME)
}

/// File name of the server log inside [`data_dir`]
pub const LOG_FILE_NAME: &str = "verlens-lsp.log";

/// Environment variable holding the log filter (e.g. `debug`, `verlens_lsp=trace`)
pub const LOG_ENV_VAR: &str = "VERLENS_LSP_LOG";

/// Filter used when [`LOG_ENV_VAR`] is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "info";

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("verlens-lsp")
}
