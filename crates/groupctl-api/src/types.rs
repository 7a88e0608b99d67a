// Wire types for the group service.
//
// Request bodies serialize exactly as the service expects them; response
// records are lenient (`#[serde(default)]`) because the service omits
// fields that were not requested through `output` / `select*`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Collections ──────────────────────────────────────────────────────

/// The two group collections exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupCollection {
    HostGroups,
    TemplateGroups,
}

impl GroupCollection {
    /// Path segment used in endpoint URLs.
    pub fn path(self) -> &'static str {
        match self {
            Self::HostGroups => "hostgroups",
            Self::TemplateGroups => "templategroups",
        }
    }
}

// ── Envelope ─────────────────────────────────────────────────────────

/// `{"result": ...}` on success, `{"error": {...}}` on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub result: Option<T>,
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

impl ErrorBody {
    /// Join `message` and `data` the way the service intends them to be read.
    pub fn describe(&self) -> String {
        match (self.message.as_deref(), self.data.as_deref()) {
            (Some(msg), Some(data)) if !data.is_empty() => format!("{msg} {data}"),
            (Some(msg), _) => msg.to_owned(),
            (None, Some(data)) => data.to_owned(),
            (None, None) => format!("error code {}", self.code),
        }
    }
}

// ── Query ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query shape accepted by the `get` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GetQuery {
    /// Field selection; `None` means the full record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<String>>,
    /// Exact-match predicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Map<String, Value>>,
    /// Substring predicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortfield: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortorder: Option<SortOrder>,
    /// Embed host references (host groups).
    #[serde(rename = "selectHosts", skip_serializing_if = "Option::is_none")]
    pub select_hosts: Option<bool>,
    /// Embed template references (template groups).
    #[serde(rename = "selectTemplates", skip_serializing_if = "Option::is_none")]
    pub select_templates: Option<bool>,
}

impl GetQuery {
    /// Full records, sorted by name, with members embedded for `collection`.
    pub fn with_members(collection: GroupCollection) -> Self {
        let mut query = Self {
            sortfield: Some("name".into()),
            sortorder: Some(SortOrder::Asc),
            ..Self::default()
        };
        match collection {
            GroupCollection::HostGroups => query.select_hosts = Some(true),
            GroupCollection::TemplateGroups => query.select_templates = Some(true),
        }
        query
    }
}

// ── Records ──────────────────────────────────────────────────────────

/// A group as returned by `get`, `create`, and `update`.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecord {
    #[serde(rename = "groupid")]
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hosts: Option<Vec<MemberRecord>>,
    #[serde(default)]
    pub templates: Option<Vec<MemberRecord>>,
    /// Member count reported when members were not embedded.
    #[serde(default)]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub subgroups: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// A host or template reference embedded in a group record.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRecord {
    #[serde(alias = "hostid", alias = "templateid")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Payload of write endpoints that do not return a record.
///
/// `groupids` lists the groups the service actually touched, when it
/// reports them. A shorter list than requested means the call was only
/// partly applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationResult {
    #[serde(default)]
    pub groupids: Option<Vec<String>>,
}

// ── Request bodies ───────────────────────────────────────────────────

/// Member id list, keyed by the collection's member field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemberIds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templateids: Option<Vec<String>>,
}

impl MemberIds {
    pub fn for_collection(collection: GroupCollection, ids: Vec<String>) -> Self {
        if ids.is_empty() {
            return Self::default();
        }
        match collection {
            GroupCollection::HostGroups => Self {
                hostids: Some(ids),
                templateids: None,
            },
            GroupCollection::TemplateGroups => Self {
                hostids: None,
                templateids: Some(ids),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateGroupBody {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub members: MemberIds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateGroupBody {
    pub id: String,
    #[serde(flatten)]
    pub patch: GroupPatchBody,
}

/// Shared patch object for `update`, `massupdate`, and `propagate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupPatchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MassMembersBody {
    pub groupids: Vec<String>,
    #[serde(flatten)]
    pub members: MemberIds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MassPatchBody {
    pub ids: Vec<String>,
    pub patch: GroupPatchBody,
}
