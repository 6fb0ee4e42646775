//! Update suggestions for a single dependency declaration
//!
//! The flag is decided by the `latest` dist-tag alone. The satisfies
//! suggestion is computed for display but never changes the flag.

use std::fmt;

use crate::parser::types::QuoteStyle;
use crate::version::client::PackageClient;
use crate::version::descriptor::{VersionDescriptor, replacement_text};
use crate::version::semver::is_greater;

/// Which registry view a suggestion comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    /// The `latest` dist-tag
    Latest,
    /// The highest published version inside the declared range
    Satisfies,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSuggestion {
    pub kind: SuggestionKind,
    pub candidate_version: Option<String>,
    pub is_updateable: bool,
}

impl UpdateSuggestion {
    fn new(kind: SuggestionKind, candidate: Option<String>, declared: Option<&VersionDescriptor>) -> Self {
        let is_updateable = candidate
            .as_deref()
            .is_some_and(|candidate| is_updateable(candidate, declared));
        Self {
            kind,
            candidate_version: candidate,
            is_updateable,
        }
    }

    /// Text replacing the declared version span, only when an update applies
    pub fn replacement_text(&self, declared: Option<&str>, quote: QuoteStyle) -> Option<String> {
        if !self.is_updateable {
            return None;
        }
        let candidate = self.candidate_version.as_deref()?;
        Some(replacement_text(declared, quote, candidate))
    }
}

/// Status shown next to every dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    NotFound,
    Updateable,
    UpToDate,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::NotFound => write!(f, "🔴 package not found"),
            Flag::Updateable => write!(f, "🟡"),
            Flag::UpToDate => write!(f, "✔️"),
        }
    }
}

/// Everything the annotation layer needs for one declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySuggestions {
    /// Parsed declaration, `None` when the version is absent
    pub descriptor: Option<VersionDescriptor>,
    pub flag: Flag,
    /// `None` when the package could not be resolved
    pub latest: Option<UpdateSuggestion>,
    /// `None` for absent or invalid declarations and unresolved packages
    pub satisfies: Option<UpdateSuggestion>,
}

/// An absent declaration is always updateable; an unparsable bare version never is
pub fn is_updateable(candidate: &str, declared: Option<&VersionDescriptor>) -> bool {
    match declared {
        None => true,
        Some(descriptor) => is_greater(candidate, &descriptor.bare_version).unwrap_or(false),
    }
}

/// Suggestion based on the `latest` dist-tag
pub async fn latest_suggestion(
    client: &PackageClient,
    package_name: &str,
    declared: Option<&str>,
) -> UpdateSuggestion {
    let descriptor = declared.map(VersionDescriptor::parse);
    let latest = client.fetch_latest_version(package_name).await;
    UpdateSuggestion::new(SuggestionKind::Latest, latest, descriptor.as_ref())
}

/// Suggestion based on the highest version satisfying the declared range
///
/// Returns `None` for absent or invalid declarations.
pub async fn satisfies_suggestion(
    client: &PackageClient,
    package_name: &str,
    declared: Option<&str>,
) -> Option<UpdateSuggestion> {
    let declared = declared?;
    let descriptor = VersionDescriptor::parse(declared);
    if !descriptor.is_valid {
        return None;
    }
    let candidate = client
        .fetch_satisfies_version(package_name, Some(declared))
        .await;
    Some(UpdateSuggestion::new(
        SuggestionKind::Satisfies,
        candidate,
        Some(&descriptor),
    ))
}

/// Flag and suggestions for one `(name, declared)` pair
pub async fn suggest(
    client: &PackageClient,
    package_name: &str,
    declared: Option<&str>,
) -> DependencySuggestions {
    let descriptor = declared.map(VersionDescriptor::parse);

    let latest = latest_suggestion(client, package_name, declared).await;
    if latest.candidate_version.is_none() {
        return DependencySuggestions {
            descriptor,
            flag: Flag::NotFound,
            latest: None,
            satisfies: None,
        };
    }

    let flag = if latest.is_updateable {
        Flag::Updateable
    } else {
        Flag::UpToDate
    };
    let satisfies = satisfies_suggestion(client, package_name, declared).await;

    DependencySuggestions {
        descriptor,
        flag,
        latest: Some(latest),
        satisfies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::error::RegistryError;
    use crate::version::registry::MockRegistry;
    use crate::version::types::PackageMetadata;
    use rstest::rstest;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn client_with(packages: Vec<PackageMetadata>) -> PackageClient {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package_metadata()
            .returning(move |name| {
                packages
                    .iter()
                    .find(|p| p.name == name)
                    .cloned()
                    .ok_or_else(|| RegistryError::NotFound(name.to_string()))
            });
        PackageClient::new(Arc::new(registry))
    }

    fn package(name: &str, latest: &str, versions: &[&str]) -> PackageMetadata {
        PackageMetadata::new(
            name,
            HashMap::from([("latest".to_string(), latest.to_string())]),
            versions.iter().map(|v| v.to_string()),
        )
    }

    fn registry() -> PackageClient {
        client_with(vec![
            package("lodash", "4.17.21", &["3.10.1", "4.0.0", "4.17.20", "4.17.21"]),
            package("left-pad", "1.3.0", &["1.0.0", "1.1.0", "1.3.0"]),
            package("react", "18.2.0", &["17.0.2", "18.0.0", "18.2.0", "19.0.0-rc.0"]),
        ])
    }

    #[tokio::test]
    async fn lodash_caret_range_is_updateable_to_latest() {
        let client = registry();

        let result = suggest(&client, "lodash", Some("^4.0.0")).await;

        assert_eq!(result.flag, Flag::Updateable);
        let latest = result.latest.unwrap();
        assert_eq!(
            latest,
            UpdateSuggestion {
                kind: SuggestionKind::Latest,
                candidate_version: Some("4.17.21".to_string()),
                is_updateable: true,
            }
        );
        assert_eq!(
            latest.replacement_text(Some("^4.0.0"), QuoteStyle::None),
            Some("^4.17.21".to_string())
        );
    }

    #[tokio::test]
    async fn absent_declaration_is_updateable() {
        let client = registry();

        let result = suggest(&client, "left-pad", None).await;

        assert_eq!(result.flag, Flag::Updateable);
        assert_eq!(result.descriptor, None);
        assert_eq!(result.satisfies, None);
        let latest = result.latest.unwrap();
        assert!(latest.is_updateable);
        assert_eq!(
            latest.replacement_text(None, QuoteStyle::None),
            Some(" 1.3.0".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_package_is_flagged_without_suggestions() {
        let client = registry();

        let result = suggest(&client, "ghost-pkg", Some("1.0.0")).await;

        assert_eq!(result.flag, Flag::NotFound);
        assert_eq!(result.flag.to_string(), "🔴 package not found");
        assert_eq!(result.latest, None);
        assert_eq!(result.satisfies, None);
    }

    #[rstest]
    #[case("4.17.21", Flag::UpToDate)]
    #[case("^4.17.21", Flag::UpToDate)]
    #[case("~4.17.20", Flag::Updateable)]
    #[case("5.0.0", Flag::UpToDate)]
    #[case("latest", Flag::UpToDate)]
    #[tokio::test]
    async fn flag_follows_latest_tag(#[case] declared: &str, #[case] expected: Flag) {
        let client = registry();

        let result = suggest(&client, "lodash", Some(declared)).await;

        assert_eq!(result.flag, expected);
    }

    #[tokio::test]
    async fn satisfies_suggestion_stays_inside_the_range() {
        let client = registry();

        let result = suggest(&client, "react", Some("^17.0.0")).await;

        assert_eq!(result.flag, Flag::Updateable);
        assert_eq!(
            result.satisfies,
            Some(UpdateSuggestion {
                kind: SuggestionKind::Satisfies,
                candidate_version: Some("17.0.2".to_string()),
                is_updateable: true,
            })
        );
    }

    #[tokio::test]
    async fn satisfies_suggestion_is_not_updateable_at_the_top_of_the_range() {
        let client = registry();

        let suggestion = satisfies_suggestion(&client, "react", Some("~18.2.0"))
            .await
            .unwrap();

        assert_eq!(suggestion.candidate_version.as_deref(), Some("18.2.0"));
        assert!(!suggestion.is_updateable);
        assert_eq!(suggestion.replacement_text(Some("~18.2.0"), QuoteStyle::Double), None);
    }

    #[tokio::test]
    async fn satisfies_suggestion_skips_absent_declaration() {
        let client = registry();

        assert_eq!(satisfies_suggestion(&client, "left-pad", None).await, None);
    }

    #[tokio::test]
    async fn partial_version_is_padded_before_comparison() {
        let client = registry();

        let suggestion = latest_suggestion(&client, "react", Some("18")).await;

        assert!(suggestion.is_updateable);
        assert_eq!(
            suggestion.replacement_text(Some("18"), QuoteStyle::Single),
            Some("'18.2.0'".to_string())
        );
    }

    #[rstest]
    #[case("4.17.21", None, true)]
    #[case("4.17.21", Some("4.0.0"), true)]
    #[case("4.17.21", Some("4.17.21"), false)]
    #[case("4.17.21", Some("workspace"), false)]
    fn is_updateable_degrades_on_invalid_versions(
        #[case] candidate: &str,
        #[case] declared: Option<&str>,
        #[case] expected: bool,
    ) {
        let descriptor = declared.map(VersionDescriptor::parse);
        assert_eq!(is_updateable(candidate, descriptor.as_ref()), expected);
    }
}
