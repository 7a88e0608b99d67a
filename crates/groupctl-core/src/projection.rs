// ── Filter/search projection ──
//
// Derives the visible subset of a group list. Pure and order-preserving;
// the authoritative list is never mutated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::{Group, GroupId, SizeCategory};

/// Size filter: everything, or exactly one [`SizeCategory`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SizeBucket {
    #[default]
    All,
    Empty,
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    pub fn matches(self, category: SizeCategory) -> bool {
        match self {
            Self::All => true,
            Self::Empty => category == SizeCategory::Empty,
            Self::Small => category == SizeCategory::Small,
            Self::Medium => category == SizeCategory::Medium,
            Self::Large => category == SizeCategory::Large,
        }
    }
}

impl From<SizeCategory> for SizeBucket {
    fn from(category: SizeCategory) -> Self {
        match category {
            SizeCategory::Empty => Self::Empty,
            SizeCategory::Small => Self::Small,
            SizeCategory::Medium => Self::Medium,
            SizeCategory::Large => Self::Large,
        }
    }
}

/// Visible subset of `list`: case-insensitive substring match of `term`
/// on name (and description when present), then the size bucket.
pub fn project(list: &[Arc<Group>], term: &str, bucket: SizeBucket) -> Vec<Arc<Group>> {
    let needle = term.trim().to_lowercase();
    list.iter()
        .filter(|g| bucket.matches(g.size_category()))
        .filter(|g| needle.is_empty() || matches_term(g, &needle))
        .cloned()
        .collect()
}

fn matches_term(group: &Group, needle: &str) -> bool {
    group.name.to_lowercase().contains(needle)
        || group
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

/// Ids of a projection, in display order. Feeds `SelectionModel::select_all`.
pub fn visible_ids(projection: &[Arc<Group>]) -> Vec<GroupId> {
    projection.iter().map(|g| g.id.clone()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::GroupKind;

    fn group(id: &str, name: &str, count: usize) -> Arc<Group> {
        Arc::new(Group {
            id: GroupId::from(id),
            kind: GroupKind::HostGroup,
            name: name.into(),
            description: None,
            members: Vec::new(),
            member_count: count,
            subgroups: Vec::new(),
            permissions: Vec::new(),
        })
    }

    fn sample() -> Vec<Arc<Group>> {
        vec![
            group("a", "Linux servers", 3),
            group("b", "Databases", 12),
            group("c", "Web frontends", 40),
            group("d", "Decommissioned", 0),
        ]
    }

    #[test]
    fn empty_term_and_all_returns_list_in_order() {
        let list = sample();
        assert_eq!(project(&list, "", SizeBucket::All), list);
    }

    #[test]
    fn empty_bucket_selects_only_empty_groups() {
        let list = sample();
        let ids = visible_ids(&project(&list, "", SizeBucket::Empty));
        assert_eq!(ids, vec![GroupId::from("d")]);
    }

    #[test]
    fn search_is_case_insensitive_and_trimmed() {
        let list = sample();
        let ids = visible_ids(&project(&list, "  SERVERS ", SizeBucket::All));
        assert_eq!(ids, vec![GroupId::from("a")]);
    }

    #[test]
    fn search_matches_description() {
        let mut list = sample();
        let mut g = (*list[1]).clone();
        g.description = Some("PostgreSQL primaries".into());
        list[1] = Arc::new(g);
        let ids = visible_ids(&project(&list, "postgres", SizeBucket::All));
        assert_eq!(ids, vec![GroupId::from("b")]);
    }

    #[test]
    fn projection_is_a_subset() {
        let list = sample();
        for term in ["", "e", "zzz"] {
            for bucket in [SizeBucket::All, SizeBucket::Small, SizeBucket::Large] {
                let out = project(&list, term, bucket);
                assert!(out.iter().all(|g| list.contains(g)));
            }
        }
    }

    #[test]
    fn bucket_parses_from_text() {
        assert_eq!(SizeBucket::from_str("medium").unwrap(), SizeBucket::Medium);
        assert_eq!(SizeBucket::from_str("ALL").unwrap(), SizeBucket::All);
        assert!(SizeBucket::from_str("huge").is_err());
    }
}
