// ── API-to-domain type conversions ──
//
// Bridges raw `groupctl_api` records into `groupctl_core::model` types and
// maps drafts/patches back onto wire bodies. Unknown permission tags are
// dropped with a warning rather than failing the whole list.

use std::str::FromStr;

use tracing::warn;

use groupctl_api::types::{CreateGroupBody, GroupPatchBody, MemberIds, MemberRecord};
use groupctl_api::{GroupCollection, GroupRecord};

use crate::model::{Group, GroupDraft, GroupId, GroupKind, GroupPatch, MemberRef, Permission};

// ── Helpers ────────────────────────────────────────────────────────

fn parse_permissions(raw: &[String]) -> Vec<Permission> {
    let mut out = Vec::with_capacity(raw.len());
    for tag in raw {
        match Permission::from_str(tag) {
            Ok(p) if !out.contains(&p) => out.push(p),
            Ok(_) => {}
            Err(_) => warn!(tag, "ignoring unknown permission tag"),
        }
    }
    out
}

pub(crate) fn permission_tags(perms: &[Permission]) -> Vec<String> {
    perms.iter().map(|p| p.as_str().to_owned()).collect()
}

fn member_ref(record: MemberRecord) -> MemberRef {
    MemberRef {
        id: record.id,
        name: record.name,
    }
}

// ── Records → domain ───────────────────────────────────────────────

/// Convert a service record of the given `kind` into a [`Group`].
///
/// `member_count` is the embedded member list's length when the service
/// expanded members, otherwise the count it reported (0 if neither).
pub fn group_from_record(kind: GroupKind, record: GroupRecord) -> Group {
    let embedded = match kind {
        GroupKind::HostGroup => record.hosts,
        GroupKind::TemplateGroup => record.templates,
    };
    let (members, member_count) = match embedded {
        Some(list) => {
            let members: Vec<MemberRef> = list.into_iter().map(member_ref).collect();
            let count = members.len();
            (members, count)
        }
        None => (
            Vec::new(),
            record
                .member_count
                .and_then(|c| usize::try_from(c).ok())
                .unwrap_or(0),
        ),
    };

    Group {
        id: GroupId::from(record.group_id),
        kind,
        name: record.name,
        description: record.description.filter(|d| !d.is_empty()),
        members,
        member_count,
        subgroups: record.subgroups,
        permissions: parse_permissions(&record.permissions),
    }
}

// ── Domain → wire bodies ───────────────────────────────────────────

pub(crate) fn create_body(collection: GroupCollection, draft: &GroupDraft) -> CreateGroupBody {
    CreateGroupBody {
        name: draft.name.clone(),
        description: draft.description.clone(),
        permissions: permission_tags(&draft.permissions),
        members: MemberIds::for_collection(
            collection,
            draft.members.iter().map(|m| m.id.clone()).collect(),
        ),
    }
}

pub(crate) fn patch_body(patch: &GroupPatch) -> GroupPatchBody {
    GroupPatchBody {
        name: patch.name.clone(),
        description: patch.description.clone(),
        permissions: patch.permissions.as_deref().map(permission_tags),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> GroupRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn embedded_members_define_the_count() {
        let group = group_from_record(
            GroupKind::HostGroup,
            record(json!({
                "groupid": "4",
                "name": "Web",
                "hosts": [{ "hostid": "1", "name": "web-01" }, { "hostid": "2" }],
                "member_count": 99,
                "permissions": ["Read", "Read-write", "Read", "Owner"]
            })),
        );
        assert_eq!(group.member_count, 2);
        assert_eq!(group.members[0], MemberRef::named("1", "web-01"));
        assert_eq!(
            group.permissions,
            vec![Permission::Read, Permission::ReadWrite]
        );
    }

    #[test]
    fn reported_count_used_without_members() {
        let group = group_from_record(
            GroupKind::TemplateGroup,
            record(json!({
                "groupid": "9",
                "name": "Templates",
                "member_count": 7,
                "description": ""
            })),
        );
        assert_eq!(group.member_count, 7);
        assert!(group.members.is_empty());
        assert_eq!(group.description, None);
        assert_eq!(group.kind, GroupKind::TemplateGroup);
    }

    #[test]
    fn create_body_uses_kind_member_field() {
        let draft = GroupDraft {
            name: "Merged".into(),
            description: None,
            permissions: vec![Permission::Deny],
            members: vec![MemberRef::new("10001")],
        };
        let body = create_body(GroupCollection::TemplateGroups, &draft);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "name": "Merged", "permissions": ["Deny"], "templateids": ["10001"] })
        );
    }
}
