use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use verlens_lsp::check::check_manifest;
use verlens_lsp::config::LspConfig;
use verlens_lsp::lsp::server::{init_stderr_logging, run_server};
use verlens_lsp::version::client::PackageClient;
use verlens_lsp::version::registries::npm::NpmRegistry;

#[derive(Parser)]
#[command(name = "verlens-lsp")]
#[command(
    version,
    about = "Language Server showing version code lenses for pnpm catalogs"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print update suggestions for a pnpm-workspace.yaml without an editor
    Check {
        /// Path to the manifest
        path: PathBuf,
        /// Alternate registry base URL
        #[arg(long, default_value = "")]
        registry: String,
    },
}

async fn check(path: PathBuf, registry: String) -> anyhow::Result<()> {
    init_stderr_logging()?;

    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = LspConfig {
        registry_url: registry,
    };
    let client = PackageClient::new(Arc::new(NpmRegistry::new(&config.registry_url())));

    for entry in check_manifest(&client, &content).await? {
        println!("{}", entry.render());
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        None => runtime.block_on(run_server()),
        Some(Command::Check { path, registry }) => runtime.block_on(check(path, registry)),
    }
}
