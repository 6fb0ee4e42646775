use std::cmp::Ordering;

use semver::{BuildMetadata, Version};

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros, and
/// tolerates the `v` / `=` prefixes npm accepts on plain versions.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "v1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version
        .trim()
        .trim_start_matches('=')
        .trim_start_matches('v')
        .trim();
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Compare two versions by semver precedence (build metadata ignored)
pub fn compare_precedence(a: &Version, b: &Version) -> Ordering {
    let strip = |v: &Version| Version {
        build: BuildMetadata::EMPTY,
        ..v.clone()
    };
    strip(a).cmp(&strip(b))
}

/// Whether `candidate` is strictly greater than `current`
///
/// Returns `None` when either side is not a valid version, so callers can
/// degrade instead of guessing.
pub fn is_greater(candidate: &str, current: &str) -> Option<bool> {
    let candidate = parse_version(candidate)?;
    let current = parse_version(current)?;
    Some(compare_precedence(&candidate, &current) == Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(Version::new(1, 0, 0)))]
    #[case("1.2", Some(Version::new(1, 2, 0)))]
    #[case("1.2.3", Some(Version::new(1, 2, 3)))]
    #[case("v1.2.3", Some(Version::new(1, 2, 3)))]
    #[case("=1.2.3", Some(Version::new(1, 2, 3)))]
    #[case("1.2.3-beta.1", Version::parse("1.2.3-beta.1").ok())]
    #[case("", None)]
    #[case("latest", None)]
    #[case("1.2.x", None)]
    fn parse_version_normalizes_input(#[case] input: &str, #[case] expected: Option<Version>) {
        assert_eq!(parse_version(input), expected);
    }

    #[rstest]
    #[case("4.17.21", "4.0.0", Some(true))]
    #[case("4.0.0", "4.0.0", Some(false))]
    #[case("3.9.9", "4.0.0", Some(false))]
    #[case("18.2.0", "18", Some(true))]
    #[case("1.0.0", "1.0.0-rc.1", Some(true))]
    #[case("1.0.0-rc.2", "1.0.0-rc.1", Some(true))]
    #[case("1.0.0+build.2", "1.0.0+build.1", Some(false))]
    #[case("1.0.0", "workspace", None)]
    #[case("next", "1.0.0", None)]
    fn is_greater_compares_by_precedence(
        #[case] candidate: &str,
        #[case] current: &str,
        #[case] expected: Option<bool>,
    ) {
        assert_eq!(is_greater(candidate, current), expected);
    }
}
