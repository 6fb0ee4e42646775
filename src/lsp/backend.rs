use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{OnceCell, RwLock};
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{info, warn};

use crate::config::LspConfig;
use crate::host::{ClientHost, EditorHost};
use crate::lsp::code_lens::{APPLY_COMMAND, apply_suggestion, create_code_lenses, parse_apply_args};
use crate::lsp::prefetch::prefetch_packages;
use crate::parser::pnpm_workspace::PnpmWorkspaceParser;
use crate::parser::traits::Parser;
use crate::parser::types::PackageInfo;
use crate::version::client::PackageClient;
use crate::version::registries::npm::NpmRegistry;
use crate::version::registry::Registry;

/// Builds the registry once the configuration is known
type RegistryFactory = Box<dyn Fn(&LspConfig) -> Arc<dyn Registry> + Send + Sync>;

pub struct Backend {
    client: Client,
    host: Arc<ClientHost>,
    parser: Arc<dyn Parser>,
    documents: RwLock<HashMap<Url, String>>,
    /// Resolved on first use and kept for the server lifetime
    package_client: OnceCell<Arc<PackageClient>>,
    registry_factory: RegistryFactory,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self::with_registry_factory(
            client,
            Box::new(|config| Arc::new(NpmRegistry::new(&config.registry_url()))),
        )
    }

    /// Build a Backend with a custom registry
    pub fn build(client: Client, registry: Arc<dyn Registry>) -> Self {
        Self::with_registry_factory(client, Box::new(move |_| registry.clone()))
    }

    fn with_registry_factory(client: Client, registry_factory: RegistryFactory) -> Self {
        Self {
            host: Arc::new(ClientHost::new(client.clone())),
            client,
            parser: Arc::new(PnpmWorkspaceParser),
            documents: RwLock::new(HashMap::new()),
            package_client: OnceCell::new(),
            registry_factory,
        }
    }

    pub fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    ..Default::default()
                },
            )),
            code_lens_provider: Some(CodeLensOptions {
                resolve_provider: Some(false),
            }),
            execute_command_provider: Some(ExecuteCommandOptions {
                commands: vec![APPLY_COMMAND.to_string()],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    async fn package_client(&self) -> Arc<PackageClient> {
        self.package_client
            .get_or_init(|| async {
                let config = self.host.read_config().await;
                let registry = (self.registry_factory)(&config);
                info!("Using registry {}", registry.base_url());
                Arc::new(PackageClient::new(registry))
            })
            .await
            .clone()
    }

    fn parse_document(&self, uri: &Url, content: &str) -> Option<Vec<PackageInfo>> {
        if !self.parser.can_parse(uri.as_str()) {
            return None;
        }

        self.parser
            .parse(content)
            .inspect_err(|e| warn!("Failed to parse {}: {}", uri, e))
            .ok()
    }

    async fn store_and_prefetch(&self, uri: Url, content: String) {
        let packages = self.parse_document(&uri, &content);
        self.documents.write().await.insert(uri.clone(), content);

        let Some(packages) = packages.filter(|packages| !packages.is_empty()) else {
            return;
        };

        self.client
            .log_message(
                MessageType::LOG,
                format!("Found {} catalog entries in {}", packages.len(), uri),
            )
            .await;

        let package_client = self.package_client().await;
        tokio::spawn(async move {
            prefetch_packages(&package_client, &packages).await;
        });
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.host
            .set_config(LspConfig::from_value(params.initialization_options))
            .await;

        self.client
            .log_message(MessageType::INFO, "LSP server initializing")
            .await;
        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.client
            .log_message(MessageType::INFO, "LSP server shutting down")
            .await;
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.client
            .log_message(
                MessageType::LOG,
                format!("Document opened: {}", params.text_document.uri),
            )
            .await;

        self.store_and_prefetch(params.text_document.uri, params.text_document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // With FULL sync mode, the last content change contains the full document text
        let Some(content) = params.content_changes.into_iter().last().map(|c| c.text) else {
            return;
        };

        self.store_and_prefetch(params.text_document.uri, content)
            .await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents
            .write()
            .await
            .remove(&params.text_document.uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.host
            .set_config(LspConfig::from_value(Some(params.settings)))
            .await;

        if self.package_client.initialized() {
            info!("Configuration updated; the registry stays fixed until restart");
        }
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        let uri = params.text_document.uri;

        let Some(content) = self.documents.read().await.get(&uri).cloned() else {
            return Ok(None);
        };

        let Some(packages) = self.parse_document(&uri, &content) else {
            return Ok(None);
        };

        let package_client = self.package_client().await;
        let lenses = create_code_lenses(&package_client, &uri, &packages).await;

        self.client
            .log_message(
                MessageType::LOG,
                format!("Returning {} code lenses for {}", lenses.len(), uri),
            )
            .await;

        Ok(Some(lenses))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        if params.command != APPLY_COMMAND {
            return Err(Error::invalid_params(format!(
                "Unknown command: {}",
                params.command
            )));
        }

        let Some(args) = parse_apply_args(params.arguments) else {
            return Err(Error::invalid_params(format!(
                "Invalid arguments for {}",
                APPLY_COMMAND
            )));
        };

        let host: &dyn EditorHost = &*self.host;
        let applied = apply_suggestion(host, args).await;
        Ok(Some(Value::Bool(applied)))
    }
}
