//! Sort specifications for listing and search.
//!
//! A sort spec is a comma-separated list of `field:direction` clauses, e.g.
//! `name:asc,updated_at:desc`. Results are always grouped folders-first; the
//! clauses order nodes inside each group, and the node ID breaks any remaining
//! tie so pagination is stable.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::error::DriveError;
use super::types::FileNode;

/// Sortable node attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    /// Node name.
    Name,
    /// Last mutation time.
    UpdatedAt,
    /// Creation time.
    CreatedAt,
    /// Content size.
    Size,
}

impl SortField {
    /// Name used in sort specs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::UpdatedAt => "updated_at",
            Self::CreatedAt => "created_at",
            Self::Size => "size",
        }
    }

    fn compare(self, a: &FileNode, b: &FileNode) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::Size => a.size.cmp(&b.size),
        }
    }
}

impl FromStr for SortField {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "updated_at" => Ok(Self::UpdatedAt),
            "created_at" => Ok(Self::CreatedAt),
            "size" => Ok(Self::Size),
            other => Err(DriveError::invalid_sort(format!("unknown field '{other}'"))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl FromStr for SortDirection {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DriveError::invalid_sort(format!(
                "unknown direction '{other}'"
            ))),
        }
    }
}

/// One `field:direction` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortKey {
    /// Attribute to compare.
    pub field: SortField,
    /// Direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Ascending key on `field`.
    #[must_use]
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Descending key on `field`.
    #[must_use]
    pub const fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    fn compare(self, a: &FileNode, b: &FileNode) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Parsed, validated sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parse `spec`, accepting only fields in `allowed`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSort` for an empty clause, a clause without `:`, a
    /// field outside `allowed`, or a direction other than `asc`/`desc`.
    pub fn parse(spec: &str, allowed: &[SortField]) -> Result<Self, DriveError> {
        let keys = spec
            .split(',')
            .map(|clause| parse_clause(clause.trim(), allowed))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { keys })
    }

    /// Build from already-validated keys.
    #[must_use]
    pub fn from_keys(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    /// The clauses in priority order.
    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }
}

fn parse_clause(clause: &str, allowed: &[SortField]) -> Result<SortKey, DriveError> {
    let Some((field, direction)) = clause.split_once(':') else {
        return Err(DriveError::invalid_sort(format!(
            "expected field:direction, got '{clause}'"
        )));
    };

    let field: SortField = field.trim().parse()?;
    if !allowed.contains(&field) {
        return Err(DriveError::invalid_sort(format!(
            "field '{field}' is not sortable"
        )));
    }

    Ok(SortKey {
        field,
        direction: direction.trim().parse()?,
    })
}

/// Total order used for listings: folders first, then `keys`, then ID.
#[must_use]
pub fn compare_nodes(keys: &[SortKey], a: &FileNode, b: &FileNode) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| {
            keys.iter()
                .map(|key| key.compare(a, b))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cumulus_shared::types::UserId;
    use proptest::prelude::*;
    use rstest::rstest;

    const ALL: &[SortField] = &[
        SortField::Name,
        SortField::UpdatedAt,
        SortField::CreatedAt,
        SortField::Size,
    ];

    #[test]
    fn test_parse_multi_key() {
        let spec = SortSpec::parse("name:asc,updated_at:desc", ALL).unwrap();
        assert_eq!(
            spec.keys(),
            &[
                SortKey::asc(SortField::Name),
                SortKey::desc(SortField::UpdatedAt)
            ]
        );
    }

    #[test]
    fn test_parse_tolerates_whitespace_around_clauses() {
        let spec = SortSpec::parse(" size:desc , name:asc ", ALL).unwrap();
        assert_eq!(spec.keys().len(), 2);
        assert_eq!(spec.keys()[0], SortKey::desc(SortField::Size));
    }

    #[rstest]
    #[case("name")]
    #[case("")]
    #[case("name:asc,")]
    #[case("name:up")]
    #[case("name:ASC")]
    #[case("owner_id:asc")]
    #[case("name:asc;drop table files")]
    fn test_parse_rejects(#[case] spec: &str) {
        let err = SortSpec::parse(spec, ALL).unwrap_err();
        assert!(matches!(err, DriveError::InvalidSort(_)), "{spec}: {err}");
    }

    #[test]
    fn test_parse_rejects_field_outside_allow_list() {
        let err = SortSpec::parse("size:asc", &[SortField::Name]).unwrap_err();
        assert!(matches!(err, DriveError::InvalidSort(_)));
    }

    #[test]
    fn test_compare_puts_directories_first() {
        let owner = UserId::new();
        let mut file = FileNode::directory(owner, "a.txt", None);
        file.is_directory = false;
        let dir = FileNode::directory(owner, "Zeta", None);

        let keys = [SortKey::asc(SortField::Name)];
        assert_eq!(compare_nodes(&keys, &dir, &file), Ordering::Less);
        assert_eq!(compare_nodes(&keys, &file, &dir), Ordering::Greater);
    }

    #[test]
    fn test_compare_secondary_key_breaks_ties() {
        let owner = UserId::new();
        let mut small = FileNode::directory(owner, "same", None);
        let mut large = FileNode::directory(owner, "same", None);
        small.size = 1;
        large.size = 9;

        let keys = [SortKey::asc(SortField::Name), SortKey::desc(SortField::Size)];
        assert_eq!(compare_nodes(&keys, &large, &small), Ordering::Less);
    }

    proptest! {
        #[test]
        fn prop_parse_accepts_any_valid_clause_list(
            clauses in proptest::collection::vec(
                (prop::sample::select(vec!["name", "updated_at", "created_at", "size"]),
                 prop::sample::select(vec!["asc", "desc"])),
                1..5,
            )
        ) {
            let spec = clauses
                .iter()
                .map(|(field, dir)| format!("{field}:{dir}"))
                .collect::<Vec<_>>()
                .join(",");
            let parsed = SortSpec::parse(&spec, ALL);
            prop_assert!(parsed.is_ok());
            prop_assert_eq!(parsed.unwrap().keys().len(), clauses.len());
        }
    }
}
