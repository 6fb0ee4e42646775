//! pnpm-workspace.yaml catalog parser

use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::{PackageInfo, QuoteStyle, is_pnpm_workspace};
use tracing::warn;

/// YAML null spellings that mark a dependency without a declared version
const NULL_SCALARS: &[&str] = &["null", "Null", "NULL", "~"];

/// Parser for pnpm-workspace.yaml catalog files
pub struct PnpmWorkspaceParser;

impl Parser for PnpmWorkspaceParser {
    fn can_parse(&self, uri: &str) -> bool {
        is_pnpm_workspace(uri)
    }

    fn parse(&self, content: &str) -> Result<Vec<PackageInfo>, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        let language = tree_sitter_yaml::LANGUAGE;
        parser.set_language(&language.into()).map_err(|e| {
            warn!("Failed to set YAML language for tree-sitter: {}", e);
            ParseError::TreeSitter(e.to_string())
        })?;

        let tree = parser.parse(content, None).ok_or_else(|| {
            warn!("Failed to parse YAML content");
            ParseError::ParseFailed("Failed to parse YAML".to_string())
        })?;

        let root = tree.root_node();
        let mut results = Vec::new();

        // Find top-level catalog or catalogs sections
        self.find_catalog_entries(root, content, &mut results);

        Ok(results)
    }
}

impl PnpmWorkspaceParser {
    /// Find catalog entries in the YAML structure
    ///
    /// Supports two formats:
    /// 1. Single catalog: `catalog:` with direct package entries
    /// 2. Named catalogs: `catalogs:` with nested catalog groups
    ///
    /// Only top-level keys are considered; recursion stops at the first mapping pair.
    fn find_catalog_entries(
        &self,
        node: tree_sitter::Node,
        content: &str,
        results: &mut Vec<PackageInfo>,
    ) {
        if is_pair(node) {
            if let Some(key_node) = node.child_by_field_name("key") {
                let key = self.get_node_text(key_node, content);
                if (key == "catalog" || key == "catalogs")
                    && let Some(value_node) = node.child_by_field_name("value")
                    && let Some(mapping) = mapping_of(value_node)
                {
                    self.extract_packages_from_mapping(mapping, content, results);
                }
            }
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.find_catalog_entries(child, content, results);
        }
    }

    /// Extract packages from a block or flow mapping
    ///
    /// Values that are mappings themselves (named catalogs, nested groups) are
    /// descended into at any depth.
    fn extract_packages_from_mapping(
        &self,
        node: tree_sitter::Node,
        content: &str,
        results: &mut Vec<PackageInfo>,
    ) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if !is_pair(child) {
                continue;
            }

            let nested = child.child_by_field_name("value").and_then(mapping_of);

            if let Some(mapping) = nested {
                self.extract_packages_from_mapping(mapping, content, results);
            } else if let Some(info) = self.parse_package_entry(child, content) {
                results.push(info);
            }
        }
    }

    /// Parse a single package entry (package_name: version)
    fn parse_package_entry(&self, node: tree_sitter::Node, content: &str) -> Option<PackageInfo> {
        let key_node = node.child_by_field_name("key")?;
        let name = self.get_node_text(key_node, content);
        if name.is_empty() {
            return None;
        }

        let name_start_column = utf16_column(content, key_node.start_byte());
        let name_end_column = if key_node.end_position().row == key_node.start_position().row {
            utf16_column(content, key_node.end_byte())
        } else {
            name_start_column
        };

        // Absent values start right after the colon so a replacement reads `name: 1.0.0`
        let after_colon = colon_of(node).unwrap_or(key_node);

        let (version, quote, start, end) = match node.child_by_field_name("value") {
            Some(value_node) => {
                // Sequences, block scalars and aliases are not version declarations
                let scalar = scalar_of(value_node)?;
                let raw = &content[scalar.byte_range()];
                let (quote, inner) = QuoteStyle::split(raw);

                let is_null = quote == QuoteStyle::None && NULL_SCALARS.contains(&inner);
                if is_null || inner.is_empty() {
                    (None, quote, after_colon, scalar)
                } else {
                    (Some(inner.to_string()), quote, scalar, scalar)
                }
            }
            None => (None, QuoteStyle::None, after_colon, after_colon),
        };

        let (start_offset, start_point) = if start == after_colon {
            (after_colon.end_byte(), after_colon.end_position())
        } else {
            (start.start_byte(), start.start_position())
        };

        let end_offset = end.end_byte();
        let column = utf16_column(content, start_offset);

        Some(PackageInfo {
            name,
            version,
            quote,
            start_offset,
            end_offset,
            line: start_point.row,
            column,
            end_column: column + content[start_offset..end_offset].encode_utf16().count(),
            name_line: key_node.start_position().row,
            name_start_column,
            name_end_column,
        })
    }

    /// Get text content of a node, removing quotes if present
    fn get_node_text(&self, node: tree_sitter::Node, content: &str) -> String {
        let text = &content[node.byte_range()];
        text.trim()
            .trim_start_matches('"')
            .trim_end_matches('"')
            .trim_start_matches('\'')
            .trim_end_matches('\'')
            .to_string()
    }
}

/// Column of a byte offset in UTF-16 code units
fn utf16_column(content: &str, byte: usize) -> usize {
    let line_start = content[..byte].rfind('\n').map_or(0, |i| i + 1);
    content[line_start..byte].encode_utf16().count()
}

fn is_pair(node: tree_sitter::Node) -> bool {
    matches!(node.kind(), "block_mapping_pair" | "flow_pair")
}

/// Descend through `block_node`/`flow_node` wrappers to a mapping, if the value is one
fn mapping_of(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    match node.kind() {
        "block_mapping" | "flow_mapping" => Some(node),
        "block_node" | "flow_node" => {
            let mut cursor = node.walk();
            node.named_children(&mut cursor).find_map(mapping_of)
        }
        _ => None,
    }
}

/// Descend through `flow_node` wrappers (skipping tags and anchors) to a scalar
fn scalar_of(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    match node.kind() {
        "plain_scalar" | "double_quote_scalar" | "single_quote_scalar" => Some(node),
        "flow_node" => {
            let mut cursor = node.walk();
            node.named_children(&mut cursor).find_map(scalar_of)
        }
        _ => None,
    }
}

fn colon_of(pair: tree_sitter::Node) -> Option<tree_sitter::Node> {
    let mut cursor = pair.walk();
    pair.children(&mut cursor).find(|child| child.kind() == ":")
}
