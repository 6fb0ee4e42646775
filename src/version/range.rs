//! npm version range matching
//!
//! Supports npm semver range specifications:
//! - `1.2.3`, `=1.2.3`, `v1.2.3` - exact match
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0)
//! - `~1.2.3`, `~>1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `1.2`, `1`, `*`, `x`, empty - wildcards
//! - `1.0.0 - 2.0.0` - hyphen ranges
//! - `>=1.0.0 <2.0.0` (AND) and `^1.0.0 || ^2.0.0` (OR)
//!
//! A partial version after an operator is an x-range (`~1` is `>=1.0.0 <2.0.0-0`).
//! Pre-release versions only satisfy a `||` alternative that names a pre-release
//! of the same `major.minor.patch`, as npm does.

use std::cmp::Ordering;

use semver::Version;

use crate::version::semver::compare_precedence;

/// Top-level version specification
///
/// Every range is lowered to `||`-separated comparator sets. A version matches
/// when all comparators of at least one set accept it.
#[derive(Debug)]
struct VersionSpec {
    sets: Vec<Vec<Comparator>>,
}

impl VersionSpec {
    /// Parse a version specification string
    fn parse(spec: &str) -> Option<Self> {
        let sets: Option<Vec<Vec<Comparator>>> =
            spec.split("||").map(Self::parse_comparator_set).collect();
        sets.map(|sets| VersionSpec { sets })
    }

    /// Parse one `||` alternative: a hyphen range or space-separated ranges (AND)
    fn parse_comparator_set(spec: &str) -> Option<Vec<Comparator>> {
        let spec = spec.trim();

        if let Some((from, to)) = spec.split_once(" - ") {
            return Some(lower_hyphen(Partial::parse(from)?, Partial::parse(to)?));
        }

        let mut comparators = Vec::new();
        for part in Self::split_and_parts(spec) {
            comparators.extend(lower_primitive(&part)?);
        }
        Some(comparators)
    }

    /// Split spec into AND parts, gluing a dangling operator to its version (`>= 1.0.0`)
    fn split_and_parts(spec: &str) -> Vec<String> {
        let mut parts: Vec<String> = Vec::new();
        let mut pending_operator = String::new();

        for token in spec.split_whitespace() {
            if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '^' | '~')) {
                pending_operator.push_str(token);
                continue;
            }
            parts.push(format!("{pending_operator}{token}"));
            pending_operator.clear();
        }

        if !pending_operator.is_empty() {
            parts.push(pending_operator);
        }

        parts
    }

    /// Whether some comparator set both accepts and admits the version
    ///
    /// A pre-release is only admitted by a set that itself names a pre-release
    /// of the same `major.minor.patch`.
    fn matches(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| {
            set.iter().all(|comparator| comparator.accepts(version))
                && (version.pre.is_empty()
                    || set.iter().any(|comparator| comparator.names_prerelease_of(version)))
        })
    }
}

/// A single bound of a comparator set
#[derive(Debug, Clone, PartialEq, Eq)]
enum Comparator {
    Eq(Version),
    Gt(Version),
    Gte(Version),
    Lt(Version),
    Lte(Version),
    /// Below every release and pre-release of this `major.minor.patch` (npm's `<M.m.p-0`)
    Below(Version),
}

impl Comparator {
    fn accepts(&self, version: &Version) -> bool {
        let cmp = |bound: &Version| compare_precedence(version, bound);
        match self {
            Comparator::Eq(v) => cmp(v) == Ordering::Equal,
            Comparator::Gt(v) => cmp(v) == Ordering::Greater,
            Comparator::Gte(v) => cmp(v) != Ordering::Less,
            Comparator::Lt(v) => cmp(v) == Ordering::Less,
            Comparator::Lte(v) => cmp(v) != Ordering::Greater,
            Comparator::Below(v) => {
                (version.major, version.minor, version.patch) < (v.major, v.minor, v.patch)
            }
        }
    }

    fn names_prerelease_of(&self, version: &Version) -> bool {
        let bound = match self {
            Comparator::Eq(v)
            | Comparator::Gt(v)
            | Comparator::Gte(v)
            | Comparator::Lt(v)
            | Comparator::Lte(v)
            | Comparator::Below(v) => v,
        };
        !bound.pre.is_empty()
            && bound.major == version.major
            && bound.minor == version.minor
            && bound.patch == version.patch
    }
}

/// A version as written in a range, possibly partial (`1`, `1.2`, `1.x`, `*`)
#[derive(Debug, Clone, PartialEq, Eq)]
enum Partial {
    Any,
    Major(u64),
    Minor(u64, u64),
    Full(Version),
}

impl Partial {
    fn parse(input: &str) -> Option<Self> {
        let input = input
            .trim()
            .trim_start_matches('=')
            .trim_start_matches('v')
            .trim();
        if input.is_empty() {
            return Some(Partial::Any);
        }

        let mut parts = input.splitn(3, '.');
        let major = parts.next()?;
        if is_wildcard(major) {
            return Some(Partial::Any);
        }
        let major = major.parse::<u64>().ok()?;

        let Some(minor) = parts.next().filter(|minor| !is_wildcard(minor)) else {
            return Some(Partial::Major(major));
        };
        let minor = minor.parse::<u64>().ok()?;

        match parts.next() {
            None => Some(Partial::Minor(major, minor)),
            Some(patch) if is_wildcard(patch) => Some(Partial::Minor(major, minor)),
            Some(_) => Version::parse(input).ok().map(Partial::Full),
        }
    }

    /// Lowest version covered, `None` for `*`
    fn floor(&self) -> Option<Version> {
        match self {
            Partial::Any => None,
            Partial::Major(major) => Some(Version::new(*major, 0, 0)),
            Partial::Minor(major, minor) => Some(Version::new(*major, *minor, 0)),
            Partial::Full(v) => Some(v.clone()),
        }
    }

    /// Exclusive upper bound of a partial version, `None` for `*` and full versions
    fn ceiling(&self) -> Option<Comparator> {
        match self {
            Partial::Major(major) => Some(Comparator::Below(Version::new(
                major.saturating_add(1),
                0,
                0,
            ))),
            Partial::Minor(major, minor) => Some(Comparator::Below(Version::new(
                *major,
                minor.saturating_add(1),
                0,
            ))),
            Partial::Any | Partial::Full(_) => None,
        }
    }
}

/// Matches no version at all (`>*`, `<*`)
fn nothing() -> Vec<Comparator> {
    vec![Comparator::Below(Version::new(0, 0, 0))]
}

/// `floor` and `ceiling` of a partial version, for bare and x-ranges
fn x_range(partial: &Partial) -> Vec<Comparator> {
    match partial {
        Partial::Full(v) => vec![Comparator::Eq(v.clone())],
        _ => partial
            .floor()
            .map(Comparator::Gte)
            .into_iter()
            .chain(partial.ceiling())
            .collect(),
    }
}

/// Lower `op version` (e.g. `^1.2`, `<=1`, `~1.2.3-beta.1`) to comparators
fn lower_primitive(spec: &str) -> Option<Vec<Comparator>> {
    let spec = spec.trim();

    let comparators = if let Some(rest) = spec.strip_prefix(">=") {
        let partial = Partial::parse(rest)?;
        partial.floor().map(Comparator::Gte).into_iter().collect()
    } else if let Some(rest) = spec.strip_prefix("<=") {
        match Partial::parse(rest)? {
            Partial::Any => Vec::new(),
            Partial::Full(v) => vec![Comparator::Lte(v)],
            partial => partial.ceiling().into_iter().collect(),
        }
    } else if let Some(rest) = spec.strip_prefix('>') {
        match Partial::parse(rest)? {
            Partial::Any => nothing(),
            Partial::Major(major) => {
                vec![Comparator::Gte(Version::new(major.saturating_add(1), 0, 0))]
            }
            Partial::Minor(major, minor) => {
                vec![Comparator::Gte(Version::new(major, minor.saturating_add(1), 0))]
            }
            Partial::Full(v) => vec![Comparator::Gt(v)],
        }
    } else if let Some(rest) = spec.strip_prefix('<') {
        match Partial::parse(rest)? {
            Partial::Any => nothing(),
            Partial::Full(v) => vec![Comparator::Lt(v)],
            partial => partial.floor().map(Comparator::Below).into_iter().collect(),
        }
    } else if let Some(rest) = spec.strip_prefix('^') {
        lower_caret(Partial::parse(rest)?)
    } else if let Some(rest) = spec.strip_prefix("~>").or_else(|| spec.strip_prefix('~')) {
        lower_tilde(Partial::parse(rest)?)
    } else {
        x_range(&Partial::parse(spec)?)
    };

    Some(comparators)
}

/// `^1.2.3` := `>=1.2.3 <2.0.0-0`, `^0.2.3` := `<0.3.0-0`, `^0.0.3` := `<0.0.4-0`
fn lower_caret(partial: Partial) -> Vec<Comparator> {
    match partial {
        Partial::Any => Vec::new(),
        Partial::Major(_) => x_range(&partial),
        Partial::Minor(0, _) => x_range(&partial),
        Partial::Minor(major, minor) => vec![
            Comparator::Gte(Version::new(major, minor, 0)),
            Comparator::Below(Version::new(major.saturating_add(1), 0, 0)),
        ],
        Partial::Full(v) => {
            let upper = match (v.major, v.minor) {
                (0, 0) => Version::new(0, 0, v.patch.saturating_add(1)),
                (0, minor) => Version::new(0, minor.saturating_add(1), 0),
                (major, _) => Version::new(major.saturating_add(1), 0, 0),
            };
            vec![Comparator::Gte(v), Comparator::Below(upper)]
        }
    }
}

/// `~1.2.3` := `>=1.2.3 <1.3.0-0`, `~1` := `>=1.0.0 <2.0.0-0`
fn lower_tilde(partial: Partial) -> Vec<Comparator> {
    match partial {
        Partial::Full(v) => {
            let upper = Version::new(v.major, v.minor.saturating_add(1), 0);
            vec![Comparator::Gte(v), Comparator::Below(upper)]
        }
        partial => x_range(&partial),
    }
}

/// `1.0 - 1.2` := `>=1.0.0 <1.3.0-0`, `1.0.0 - 1.2.0` := `>=1.0.0 <=1.2.0`
fn lower_hyphen(from: Partial, to: Partial) -> Vec<Comparator> {
    let lower = from.floor().map(Comparator::Gte);
    let upper = match to {
        Partial::Full(v) => Some(Comparator::Lte(v)),
        partial => partial.ceiling(),
    };
    lower.into_iter().chain(upper).collect()
}

fn is_wildcard(part: &str) -> bool {
    part.eq_ignore_ascii_case("x") || part == "*"
}

/// Check whether a version satisfies an npm range
///
/// Returns false for unparseable ranges or versions.
pub fn satisfies(range: &str, version: &str) -> bool {
    let Some(spec) = VersionSpec::parse(range) else {
        return false;
    };
    let Ok(version) = Version::parse(version.trim()) else {
        return false;
    };

    spec.matches(&version)
}

/// Find the highest version satisfying an npm range
///
/// Versions that are not valid semver are skipped. Returns the version string
/// as published, or `None` when the range is unparseable or nothing matches.
pub fn max_satisfying<'a, I>(versions: I, range: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let spec = VersionSpec::parse(range)?;

    versions
        .into_iter()
        .filter_map(|raw| Version::parse(raw.trim()).ok().map(|parsed| (raw, parsed)))
        .filter(|(_, parsed)| spec.matches(parsed))
        .max_by(|(_, a), (_, b)| compare_precedence(a, b))
        .map(|(raw, _)| raw.to_string())
}
