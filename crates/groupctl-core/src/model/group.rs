// ── Group domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::group_id::GroupId;

/// Which collection a group belongs to. Both kinds behave identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    #[strum(serialize = "host group")]
    HostGroup,
    #[strum(serialize = "template group")]
    TemplateGroup,
}

impl GroupKind {
    pub fn collection(self) -> groupctl_api::GroupCollection {
        match self {
            Self::HostGroup => groupctl_api::GroupCollection::HostGroups,
            Self::TemplateGroup => groupctl_api::GroupCollection::TemplateGroups,
        }
    }

    /// Plural noun for the members of this kind (`hosts` / `templates`).
    pub fn member_noun(self) -> &'static str {
        match self {
            Self::HostGroup => "hosts",
            Self::TemplateGroup => "templates",
        }
    }
}

/// Access level a user group holds on a group.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Permission {
    Deny,
    Read,
    #[serde(rename = "Read-write")]
    #[strum(to_string = "Read-write", serialize = "rw")]
    ReadWrite,
}

impl Permission {
    /// Wire spelling.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A host or template linked to a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MemberRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

/// Size bucket derived from the member count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SizeCategory {
    /// 0 members.
    Empty,
    /// 1-5 members.
    Small,
    /// 6-15 members.
    Medium,
    /// More than 15 members.
    Large,
}

impl SizeCategory {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Self::Empty,
            1..=5 => Self::Small,
            6..=15 => Self::Medium,
            _ => Self::Large,
        }
    }
}

/// A host group or template group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub kind: GroupKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Embedded member references; empty when members were not expanded.
    #[serde(default)]
    pub members: Vec<MemberRef>,
    pub member_count: usize,
    /// Path hierarchy below this group, display-only.
    #[serde(default)]
    pub subgroups: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Group {
    /// Derived on every call; never stored.
    pub fn size_category(&self) -> SizeCategory {
        SizeCategory::from_count(self.member_count)
    }

    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.id.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn size_thresholds() {
        assert_eq!(SizeCategory::from_count(0), SizeCategory::Empty);
        assert_eq!(SizeCategory::from_count(1), SizeCategory::Small);
        assert_eq!(SizeCategory::from_count(5), SizeCategory::Small);
        assert_eq!(SizeCategory::from_count(6), SizeCategory::Medium);
        assert_eq!(SizeCategory::from_count(15), SizeCategory::Medium);
        assert_eq!(SizeCategory::from_count(16), SizeCategory::Large);
    }

    #[test]
    fn permission_wire_spelling() {
        assert_eq!(Permission::ReadWrite.as_str(), "Read-write");
        assert_eq!(
            serde_json::to_string(&Permission::ReadWrite).unwrap(),
            "\"Read-write\""
        );
        assert_eq!(
            serde_json::from_str::<Permission>("\"Deny\"").unwrap(),
            Permission::Deny
        );
    }

    #[test]
    fn permission_parses_case_insensitively() {
        assert_eq!(Permission::from_str("read").unwrap(), Permission::Read);
        assert_eq!(
            Permission::from_str("read-write").unwrap(),
            Permission::ReadWrite
        );
        assert_eq!(Permission::from_str("RW").unwrap(), Permission::ReadWrite);
        assert!(Permission::from_str("admin").is_err());
    }

    #[test]
    fn kind_maps_to_collection() {
        assert_eq!(
            GroupKind::TemplateGroup.collection(),
            groupctl_api::GroupCollection::TemplateGroups
        );
        assert_eq!(GroupKind::HostGroup.to_string(), "host group");
    }
}
