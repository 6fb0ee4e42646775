//! Code lens generation for catalog dependencies

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_lsp::lsp_types::{CodeLens, Command, Position, Range, TextEdit, Url};
use tracing::{debug, warn};

use crate::host::EditorHost;
use crate::parser::types::PackageInfo;
use crate::version::client::PackageClient;
use crate::version::suggestion::{DependencySuggestions, UpdateSuggestion, suggest};

/// Command executed when an update lens is clicked
pub const APPLY_COMMAND: &str = "verlens.suggestion.apply";

/// Arguments of [`APPLY_COMMAND`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyEditArgs {
    pub uri: Url,
    pub range: Range,
    pub new_text: String,
}

/// The four lenses shown above each dependency, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensTag {
    Fixed,
    Latest,
    Satisfies,
    Flag,
}

impl LensTag {
    pub fn label(&self) -> &'static str {
        match self {
            LensTag::Fixed => "fixed",
            LensTag::Latest => "latest",
            LensTag::Satisfies => "satisfies",
            LensTag::Flag => "flag",
        }
    }
}

/// A rendered lens before it is placed in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub tag: LensTag,
    pub title: String,
    /// Replacement for the version span; `None` for labels that cannot be clicked
    pub new_text: Option<String>,
}

/// Lenses for one dependency given its suggestions
///
/// The flag lens is always present. The others are left out when they would
/// carry no information.
pub fn annotate(package: &PackageInfo, suggestions: &DependencySuggestions) -> Vec<Annotation> {
    let declared = package.version.as_deref();
    let latest_version = suggestions
        .latest
        .as_ref()
        .and_then(|latest| latest.candidate_version.as_deref());

    let mut annotations = Vec::with_capacity(4);

    if let (Some(declared), Some(descriptor)) = (declared, &suggestions.descriptor)
        && descriptor.is_exact_pin
        && Some(declared) != latest_version
    {
        annotations.push(Annotation {
            tag: LensTag::Fixed,
            title: format!("{}: {}", LensTag::Fixed.label(), declared),
            new_text: None,
        });
    }

    if let Some(annotation) = suggestions
        .latest
        .as_ref()
        .and_then(|latest| suggestion_annotation(LensTag::Latest, latest, package))
    {
        annotations.push(annotation);
    }

    if let (Some(satisfies), Some(descriptor)) = (&suggestions.satisfies, &suggestions.descriptor)
        && satisfies
            .candidate_version
            .as_deref()
            .is_some_and(|candidate| candidate != descriptor.bare_version)
        && let Some(annotation) = suggestion_annotation(LensTag::Satisfies, satisfies, package)
    {
        annotations.push(annotation);
    }

    annotations.push(Annotation {
        tag: LensTag::Flag,
        title: suggestions.flag.to_string(),
        new_text: None,
    });

    annotations
}

fn suggestion_annotation(
    tag: LensTag,
    suggestion: &UpdateSuggestion,
    package: &PackageInfo,
) -> Option<Annotation> {
    let candidate = suggestion.candidate_version.as_deref()?;
    let arrow = if suggestion.is_updateable { "↑" } else { "" };

    Some(Annotation {
        tag,
        title: format!("{}: {}{}", tag.label(), arrow, candidate),
        new_text: suggestion.replacement_text(package.version.as_deref(), package.quote),
    })
}

/// Resolve suggestions for every package and build their lenses
///
/// Packages are resolved concurrently; the metadata cache makes sure each
/// package name is fetched once.
pub async fn create_code_lenses(
    client: &PackageClient,
    uri: &Url,
    packages: &[PackageInfo],
) -> Vec<CodeLens> {
    let futures = packages.iter().map(|package| async move {
        let suggestions = suggest(client, &package.name, package.version.as_deref()).await;
        debug!("{}: {:?}", package.name, suggestions.flag);
        annotate(package, &suggestions)
            .into_iter()
            .map(|annotation| to_code_lens(uri, package, annotation))
            .collect::<Vec<_>>()
    });

    join_all(futures).await.into_iter().flatten().collect()
}

fn name_range(package: &PackageInfo) -> Range {
    Range {
        start: Position {
            line: package.name_line as u32,
            character: package.name_start_column as u32,
        },
        end: Position {
            line: package.name_line as u32,
            character: package.name_end_column as u32,
        },
    }
}

fn version_range(package: &PackageInfo) -> Range {
    Range {
        start: Position {
            line: package.line as u32,
            character: package.column as u32,
        },
        end: Position {
            line: package.line as u32,
            character: package.end_column as u32,
        },
    }
}

fn to_code_lens(uri: &Url, package: &PackageInfo, annotation: Annotation) -> CodeLens {
    let command = match annotation.new_text {
        Some(new_text) => {
            let args = ApplyEditArgs {
                uri: uri.clone(),
                range: version_range(package),
                new_text,
            };
            Command {
                title: annotation.title,
                command: APPLY_COMMAND.to_string(),
                arguments: serde_json::to_value(args).ok().map(|value| vec![value]),
            }
        }
        None => Command {
            title: annotation.title,
            command: String::new(),
            arguments: None,
        },
    };

    CodeLens {
        range: name_range(package),
        command: Some(command),
        data: None,
    }
}

/// Decode the arguments of [`APPLY_COMMAND`]
pub fn parse_apply_args(arguments: Vec<Value>) -> Option<ApplyEditArgs> {
    let value = arguments.into_iter().next()?;
    serde_json::from_value(value)
        .inspect_err(|e| warn!("Invalid {} arguments: {}", APPLY_COMMAND, e))
        .ok()
}

/// Ask the host to replace the version span
pub async fn apply_suggestion(host: &dyn EditorHost, args: ApplyEditArgs) -> bool {
    let edit = TextEdit {
        range: args.range,
        new_text: args.new_text,
    };
    host.apply_text_edit(args.uri, edit).await
}
