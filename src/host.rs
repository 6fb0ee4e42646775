//! Editor capabilities the server relies on
//!
//! Document parsing is provided by [`crate::parser::Parser`] and rendering by the
//! code lenses returned from `textDocument/codeLens`. The two remaining
//! capabilities, reading configuration and applying an edit, go through
//! [`EditorHost`] so the lens logic never touches a concrete client.

use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;
use tokio::sync::RwLock;
use tower_lsp::Client;
use tower_lsp::lsp_types::{TextEdit, Url, WorkspaceEdit};
use tracing::{error, warn};

use crate::config::LspConfig;

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait EditorHost: Send + Sync {
    /// Current user configuration
    async fn read_config(&self) -> LspConfig;

    /// Replace a range of a document; returns whether the editor applied it
    async fn apply_text_edit(&self, uri: Url, edit: TextEdit) -> bool;
}

/// [`EditorHost`] backed by the LSP client connection
pub struct ClientHost {
    client: Client,
    config: RwLock<LspConfig>,
}

impl ClientHost {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            config: RwLock::new(LspConfig::default()),
        }
    }

    pub async fn set_config(&self, config: LspConfig) {
        *self.config.write().await = config;
    }
}

#[async_trait::async_trait]
impl EditorHost for ClientHost {
    async fn read_config(&self) -> LspConfig {
        self.config.read().await.clone()
    }

    async fn apply_text_edit(&self, uri: Url, edit: TextEdit) -> bool {
        let workspace_edit = WorkspaceEdit {
            changes: Some(HashMap::from([(uri.clone(), vec![edit])])),
            ..Default::default()
        };

        match self.client.apply_edit(workspace_edit).await {
            Ok(response) if response.applied => true,
            Ok(response) => {
                warn!(
                    "Edit to {} was rejected: {}",
                    uri,
                    response.failure_reason.unwrap_or_default()
                );
                false
            }
            Err(e) => {
                error!("Failed to apply edit to {}: {}", uri, e);
                false
            }
        }
    }
}
