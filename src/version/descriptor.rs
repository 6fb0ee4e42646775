//! Declared version parsing and replacement text assembly
//!
//! A declaration such as `^4.0.0` is split into a range operator (`^`) and a
//! bare version (`4.0.0`). The split is the only thing needed to rewrite a
//! declaration in place while keeping its operator and quoting.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::types::QuoteStyle;

/// Range operators that are preserved when a declaration is rewritten
pub const RANGE_OPERATORS: &[&str] = &["~>", ">=", "<=", "^", "~", ">", "<"];

/// Leading non-digit text, then the rest. Matches every input, including the empty string.
static LEADING_OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^0-9]*)(.*)$").expect("Invalid leading operator pattern"));

/// A declared version split into operator and bare version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionDescriptor {
    /// One of [`RANGE_OPERATORS`], or empty
    pub leading_operator: String,
    /// The declaration without its operator
    pub bare_version: String,
    /// Valid and without an operator
    pub is_exact_pin: bool,
    /// The declaration has the operator + bare version shape
    pub is_valid: bool,
}

impl VersionDescriptor {
    /// Split a declared version into operator and bare version
    ///
    /// Never fails. A non-digit prefix that is not a known operator (`=`, `v`,
    /// `workspace:`) is dropped and the declaration counts as an exact pin.
    pub fn parse(text: &str) -> Self {
        let Some(captures) = LEADING_OPERATOR.captures(text) else {
            return Self::default();
        };

        let prefix = captures.get(1).map_or("", |m| m.as_str()).trim();
        let rest = captures.get(2).map_or("", |m| m.as_str());

        let leading_operator = RANGE_OPERATORS
            .iter()
            .find(|op| **op == prefix)
            .map(|op| op.to_string())
            .unwrap_or_default();

        Self {
            is_exact_pin: leading_operator.is_empty(),
            leading_operator,
            bare_version: rest.to_string(),
            is_valid: true,
        }
    }

    /// Rebuild the declaration around a new version, keeping operator and quotes
    pub fn reassemble(&self, quote: QuoteStyle, new_version: &str) -> String {
        let q = quote.as_str();
        format!("{q}{}{new_version}{q}", self.leading_operator)
    }
}

/// Text that replaces the whole version span (quotes included) when applying an update
///
/// An absent or malformed declaration is replaced with ` {new_version}`: the span
/// of an absent value starts right after the `:` so the result reads `name: 1.0.0`.
pub fn replacement_text(declared: Option<&str>, quote: QuoteStyle, new_version: &str) -> String {
    let Some(declared) = declared else {
        return format!(" {new_version}");
    };

    let descriptor = VersionDescriptor::parse(declared);
    if !descriptor.is_valid {
        return format!(" {new_version}");
    }

    descriptor.reassemble(quote, new_version)
}
