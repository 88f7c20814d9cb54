//! Node name validation and collision-avoidance naming.

use std::collections::HashSet;

use super::error::DriveError;

/// Longest name accepted, in characters. Matches the `files.name` column.
pub const MAX_NAME_CHARS: usize = 255;

/// Reject names that are blank, too long, or contain a path separator.
///
/// # Errors
///
/// Returns `InvalidName` if the name is unusable.
pub fn validate_name(name: &str) -> Result<(), DriveError> {
    if name.trim().is_empty()
        || name.contains('/')
        || name == "."
        || name == ".."
        || name.chars().count() > MAX_NAME_CHARS
    {
        return Err(DriveError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Split a name into stem and extension (extension keeps its dot).
///
/// Folders have no extension. A leading dot does not start an extension, so
/// `.env` has stem `.env`.
#[must_use]
pub fn split_extension(name: &str, is_directory: bool) -> (&str, &str) {
    if is_directory {
        return (name, "");
    }
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Names already taken in one destination folder.
///
/// A batch move seeds the registry from the destination's current children
/// and records every placed name, so later items see earlier placements.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    /// Registry seeded with `names`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` is taken.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Record `name` as taken.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// First free name for `name`: the name itself, else `"{stem} (n){ext}"`
    /// for the smallest `n >= 1` not yet taken.
    #[must_use]
    pub fn resolve(&self, name: &str, is_directory: bool) -> String {
        if !self.contains(name) {
            return name.to_string();
        }
        let (stem, ext) = split_extension(name, is_directory);
        (1u64..)
            .map(|n| format!("{stem} ({n}){ext}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("report.pdf", false, ("report", ".pdf"))]
    #[case("archive.tar.gz", false, ("archive.tar", ".gz"))]
    #[case("README", false, ("README", ""))]
    #[case(".env", false, (".env", ""))]
    #[case("v1.2", true, ("v1.2", ""))]
    fn test_split_extension(
        #[case] name: &str,
        #[case] is_directory: bool,
        #[case] expected: (&str, &str),
    ) {
        assert_eq!(split_extension(name, is_directory), expected);
    }

    #[test]
    fn test_resolve_free_name_is_unchanged() {
        let registry = NameRegistry::from_names(["a.txt"]);
        assert_eq!(registry.resolve("b.txt", false), "b.txt");
    }

    #[test]
    fn test_resolve_sequential_placements() {
        let mut registry = NameRegistry::from_names(["report.pdf"]);

        let first = registry.resolve("report.pdf", false);
        registry.insert(first.clone());
        let second = registry.resolve("report.pdf", false);

        assert_eq!(first, "report (1).pdf");
        assert_eq!(second, "report (2).pdf");
    }

    #[test]
    fn test_resolve_directory_ignores_dots() {
        let registry = NameRegistry::from_names(["photos.2024"]);
        assert_eq!(registry.resolve("photos.2024", true), "photos.2024 (1)");
    }

    #[test]
    fn test_resolve_skips_taken_suffixes() {
        let registry = NameRegistry::from_names(["Docs", "Docs (1)", "Docs (2)"]);
        assert_eq!(registry.resolve("Docs", true), "Docs (3)");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("a/b")]
    #[case("..")]
    fn test_validate_name_rejects(#[case] name: &str) {
        assert!(matches!(
            validate_name(name),
            Err(DriveError::InvalidName(_))
        ));
    }

    #[test]
    fn test_validate_name_accepts_regular_names() {
        assert!(validate_name("Quarterly report (final).xlsx").is_ok());
        assert!(validate_name(".bashrc").is_ok());
    }

    #[test]
    fn test_validate_name_length_limit() {
        assert!(validate_name(&"é".repeat(MAX_NAME_CHARS)).is_ok());
        assert!(matches!(
            validate_name(&"a".repeat(MAX_NAME_CHARS + 1)),
            Err(DriveError::InvalidName(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_resolved_name_is_free_and_keeps_extension(
            stem in "[a-zA-Z0-9 _-]{1,12}",
            ext in "[a-z]{1,4}",
            taken in 0usize..6,
        ) {
            let name = format!("{stem}.{ext}");
            let mut names = vec![name.clone()];
            names.extend((1..=taken).map(|n| format!("{stem} ({n}).{ext}")));
            let registry = NameRegistry::from_names(names);

            let resolved = registry.resolve(&name, false);
            prop_assert!(!registry.contains(&resolved));
            let ext_suffix = format!(".{ext}");
            prop_assert!(resolved.ends_with(&ext_suffix));
            prop_assert_eq!(resolved, format!("{stem} ({}).{ext}", taken + 1));
        }
    }
}
