//! One-shot report of catalog suggestions, used by the `check` subcommand

use anyhow::Context;
use futures::future::join_all;

use crate::lsp::code_lens::annotate;
use crate::parser::pnpm_workspace::PnpmWorkspaceParser;
use crate::parser::traits::Parser;
use crate::parser::types::PackageInfo;
use crate::version::client::PackageClient;
use crate::version::suggestion::{DependencySuggestions, suggest};

/// A catalog entry together with its resolved suggestions
#[derive(Debug, Clone)]
pub struct CheckEntry {
    pub package: PackageInfo,
    pub suggestions: DependencySuggestions,
}

impl CheckEntry {
    /// `line  name@declared  lens | lens | ...`
    pub fn render(&self) -> String {
        let titles: Vec<String> = annotate(&self.package, &self.suggestions)
            .into_iter()
            .map(|annotation| annotation.title)
            .collect();

        format!(
            "{:>4}  {}@{}  {}",
            self.package.name_line + 1,
            self.package.name,
            self.package.version.as_deref().unwrap_or("-"),
            titles.join(" | ")
        )
    }
}

/// Parse a manifest and resolve suggestions for every catalog entry, in document order
pub async fn check_manifest(client: &PackageClient, content: &str) -> anyhow::Result<Vec<CheckEntry>> {
    let packages = PnpmWorkspaceParser
        .parse(content)
        .context("Failed to parse pnpm-workspace.yaml")?;

    let futures = packages.into_iter().map(|package| async move {
        let suggestions = suggest(client, &package.name, package.version.as_deref()).await;
        CheckEntry {
            package,
            suggestions,
        }
    });

    Ok(join_all(futures).await)
}
