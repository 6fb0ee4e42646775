//! Common types for parsers

use serde::{Deserialize, Serialize};

/// File name of the manifest this server annotates
pub const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

/// Check whether the URI points at a pnpm workspace manifest
pub fn is_pnpm_workspace(uri: &str) -> bool {
    uri.ends_with(&format!("/{PNPM_WORKSPACE_FILE}"))
        || uri.ends_with(&format!("\\{PNPM_WORKSPACE_FILE}"))
        || uri == PNPM_WORKSPACE_FILE
}

/// Quoting style of a YAML scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteStyle {
    /// `"1.0.0"`
    Double,
    /// `'1.0.0'`
    Single,
    /// `1.0.0`
    #[default]
    None,
}

impl QuoteStyle {
    /// Returns the quote character as written in the source
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStyle::Double => "\"",
            QuoteStyle::Single => "'",
            QuoteStyle::None => "",
        }
    }

    /// Detect the quote style of a raw scalar and return it with the unquoted text
    pub fn split(raw: &str) -> (Self, &str) {
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            (QuoteStyle::Double, &raw[1..raw.len() - 1])
        } else if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
            (QuoteStyle::Single, &raw[1..raw.len() - 1])
        } else {
            (QuoteStyle::None, raw)
        }
    }
}

/// Information about a package dependency found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Package name (e.g., "react", "@types/node")
    pub name: String,
    /// Declared version text without quotes, `None` when the value is empty or null
    pub version: Option<String>,
    /// Quoting style of the declared version
    pub quote: QuoteStyle,
    /// Byte offset of the version span in the source (start, quotes included)
    pub start_offset: usize,
    /// Byte offset of the version span in the source (end, quotes included)
    pub end_offset: usize,
    /// Line number of the version span (0-indexed)
    pub line: usize,
    /// Columns are UTF-16 code units, as LSP positions expect
    pub column: usize,
    /// Column where the version span ends (exclusive)
    pub end_column: usize,
    /// Line number of the package name (0-indexed)
    pub name_line: usize,
    /// Column where the package name starts (0-indexed)
    pub name_start_column: usize,
    /// Column where the package name ends (0-indexed, exclusive)
    pub name_end_column: usize,
}
