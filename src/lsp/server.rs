//! LSP server startup and logging setup

use anyhow::Context;
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_LOG_FILTER, LOG_ENV_VAR, LOG_FILE_NAME, data_dir};
use crate::lsp::backend::Backend;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Log as JSON lines to the data directory
///
/// stdout carries the protocol, so the server never logs there. The returned
/// guard flushes the writer on drop and must outlive the server.
pub fn init_logging() -> anyhow::Result<WorkerGuard> {
    let dir = data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(guard)
}

/// Human-readable logs on stderr, for one-shot commands
pub fn init_stderr_logging() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Serve LSP over stdio until the client disconnects
pub async fn run_server() -> anyhow::Result<()> {
    let _guard = init_logging()?;
    info!("Starting verlens-lsp v{}", env!("CARGO_PKG_VERSION"));

    let (service, socket) = LspService::new(Backend::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;

    info!("verlens-lsp stopped");
    Ok(())
}
