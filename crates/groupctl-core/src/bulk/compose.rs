// ── Clone and merge composition ──
//
// Pure functions that turn source groups into the drafts the bulk engine
// creates. No I/O; the engine supplies the sources from the cache snapshot.

use indexmap::IndexMap;

use crate::model::{Group, GroupDraft, MemberRef, Permission};

/// Appended to the source name of every clone.
pub const CLONE_SUFFIX: &str = "-clone";

/// Name used for a merged group when the operator gives none.
pub const DEFAULT_MERGE_NAME: &str = "Merged group";

pub fn clone_name(source: &str) -> String {
    format!("{source}{CLONE_SUFFIX}")
}

/// Draft for a clone of `source`: same settings and members, suffixed name.
pub fn clone_draft(source: &Group) -> GroupDraft {
    GroupDraft {
        name: clone_name(&source.name),
        ..GroupDraft::from_group(source)
    }
}

/// Name for a merged group: the trimmed operator input, or the default
/// label when that is missing or blank.
pub fn merge_name(requested: Option<&str>) -> String {
    requested
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_MERGE_NAME)
        .to_owned()
}

/// Draft combining `sources` into one group.
///
/// Members are the union of the sources' members keyed by id, in
/// first-seen order; a later source fills in a name the earlier one lacked.
/// Permissions are the union of the sources' permissions.
pub fn merge_draft<'a>(
    sources: impl IntoIterator<Item = &'a Group>,
    requested_name: Option<&str>,
) -> GroupDraft {
    let mut members: IndexMap<&str, MemberRef> = IndexMap::new();
    let mut permissions: Vec<Permission> = Vec::new();

    for group in sources {
        for member in &group.members {
            members
                .entry(member.id.as_str())
                .and_modify(|existing| {
                    if existing.name.is_none() {
                        existing.name.clone_from(&member.name);
                    }
                })
                .or_insert_with(|| member.clone());
        }
        for p in &group.permissions {
            if !permissions.contains(p) {
                permissions.push(*p);
            }
        }
    }

    GroupDraft {
        name: merge_name(requested_name),
        description: None,
        permissions,
        members: members.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{GroupId, GroupKind};

    fn group(id: &str, name: &str, member_ids: impl IntoIterator<Item = u32>) -> Group {
        let members: Vec<MemberRef> = member_ids
            .into_iter()
            .map(|i| MemberRef::new(format!("h{i}")))
            .collect();
        Group {
            id: GroupId::from(id),
            kind: GroupKind::HostGroup,
            name: name.into(),
            description: None,
            member_count: members.len(),
            members,
            subgroups: Vec::new(),
            permissions: Vec::new(),
        }
    }

    #[test]
    fn merge_with_overlap_dedups_members() {
        // A has h1..h10, B has h9..h11: two shared.
        let a = group("a", "A", 1..=10);
        let b = group("b", "B", 9..=11);
        let draft = merge_draft([&a, &b], None);
        assert_eq!(draft.name, DEFAULT_MERGE_NAME);
        assert_eq!(draft.members.len(), 11);
    }

    #[test]
    fn merge_without_overlap_sums_members() {
        let a = group("a", "A", 1..=3);
        let b = group("b", "B", 4..=5);
        let draft = merge_draft([&a, &b], Some("Both"));
        assert_eq!(draft.members.len(), a.member_count + b.member_count);
        assert_eq!(draft.name, "Both");
    }

    #[test]
    fn blank_merge_name_falls_back_to_default() {
        assert_eq!(merge_name(Some("   ")), DEFAULT_MERGE_NAME);
        assert_eq!(merge_name(Some("  Core ")), "Core");
    }

    #[test]
    fn merge_unions_permissions_and_fills_member_names() {
        let mut a = group("a", "A", [1_u32]);
        a.permissions = vec![Permission::Read];
        let mut b = group("b", "B", std::iter::empty());
        b.members = vec![MemberRef::named("h1", "web-01")];
        b.member_count = 1;
        b.permissions = vec![Permission::Deny, Permission::Read];

        let draft = merge_draft([&a, &b], None);
        assert_eq!(draft.permissions, vec![Permission::Read, Permission::Deny]);
        assert_eq!(draft.members, vec![MemberRef::named("h1", "web-01")]);
    }

    #[test]
    fn clone_keeps_settings_and_suffixes_name() {
        let mut a = group("a", "Linux servers", 1..=2);
        a.permissions = vec![Permission::ReadWrite];
        let draft = clone_draft(&a);
        assert_eq!(draft.name, "Linux servers-clone");
        assert_eq!(draft.members.len(), 2);
        assert_eq!(draft.permissions, vec![Permission::ReadWrite]);
    }
}
