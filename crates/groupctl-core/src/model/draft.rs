// ── Write-side payloads ──
//
// Drafts and patches the engines hand to the repository. They carry
// domain types; `repository.rs` maps them onto wire bodies.

use serde::{Deserialize, Serialize};

use super::group::{Group, MemberRef, Permission};

/// A group that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub members: Vec<MemberRef>,
}

impl GroupDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Draft that reproduces `group` (name, description, permissions, members).
    pub fn from_group(group: &Group) -> Self {
        Self {
            name: group.name.clone(),
            description: group.description.clone(),
            permissions: group.permissions.clone(),
            members: group.members.clone(),
        }
    }
}

/// Partial update. `None` fields are left untouched by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,
}

impl GroupPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.permissions.is_none()
    }

    /// Fields of `self` that differ from `group`. A missing description
    /// and an empty one compare equal.
    pub fn diff_against(&self, group: &Group) -> Self {
        Self {
            name: self.name.clone().filter(|n| *n != group.name),
            description: self
                .description
                .clone()
                .filter(|d| d.as_str() != group.description.as_deref().unwrap_or("")),
            permissions: self
                .permissions
                .clone()
                .filter(|p| *p != group.permissions),
        }
    }
}

/// Permission patch pushed by the propagation engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub permissions: Vec<Permission>,
}

impl SettingsPatch {
    pub fn new(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Permission tags with duplicates removed, first occurrence wins.
    pub fn normalized(&self) -> Vec<Permission> {
        let mut out = Vec::with_capacity(self.permissions.len());
        for p in &self.permissions {
            if !out.contains(p) {
                out.push(*p);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupId, GroupKind};

    fn group() -> Group {
        Group {
            id: GroupId::from("1"),
            kind: GroupKind::HostGroup,
            name: "Linux servers".into(),
            description: None,
            members: Vec::new(),
            member_count: 0,
            subgroups: Vec::new(),
            permissions: vec![Permission::Read],
        }
    }

    #[test]
    fn diff_drops_unchanged_fields() {
        let patch = GroupPatch {
            name: Some("Linux servers".into()),
            description: Some("prod".into()),
            permissions: Some(vec![Permission::Read]),
        };
        let diff = patch.diff_against(&group());
        assert_eq!(diff.name, None);
        assert_eq!(diff.description.as_deref(), Some("prod"));
        assert_eq!(diff.permissions, None);
    }

    #[test]
    fn empty_description_matches_missing_one() {
        let patch = GroupPatch {
            description: Some(String::new()),
            ..GroupPatch::default()
        };
        assert!(patch.diff_against(&group()).is_empty());
    }

    #[test]
    fn settings_patch_collapses_duplicates() {
        let patch = SettingsPatch::new([Permission::Read, Permission::Deny, Permission::Read]);
        assert_eq!(patch.normalized(), vec![Permission::Read, Permission::Deny]);
    }
}
