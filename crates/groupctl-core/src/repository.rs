// ── Group repository seam ──
//
// The only path from the engines to the network. `HttpGroupRepository`
// talks to the group service; tests substitute an in-memory fake.
// Implementations trust their inputs: validation happens in `GroupClient`.

use async_trait::async_trait;
use tracing::warn;

use groupctl_api::{GetQuery, GroupServiceClient, MutationResult};

use crate::convert::{create_body, group_from_record, patch_body, permission_tags};
use crate::error::CoreError;
use crate::model::{Group, GroupDraft, GroupId, GroupKind, GroupPatch, MemberRef, SettingsPatch};

/// Project and group kind a repository call is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub project: String,
    pub kind: GroupKind,
}

impl Scope {
    pub fn new(project: impl Into<String>, kind: GroupKind) -> Self {
        Self {
            project: project.into(),
            kind,
        }
    }
}

/// Server-side narrowing for `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Substring the service matches against group names.
    pub name_search: Option<String>,
    /// Embed member references in each group.
    pub expand_members: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            name_search: None,
            expand_members: true,
        }
    }
}

/// Remote CRUD and bulk operations on one group collection.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn list(&self, scope: &Scope, query: &ListQuery) -> Result<Vec<Group>, CoreError>;

    async fn create(&self, scope: &Scope, draft: &GroupDraft) -> Result<Group, CoreError>;

    async fn update(
        &self,
        scope: &Scope,
        id: &GroupId,
        patch: &GroupPatch,
    ) -> Result<Group, CoreError>;

    async fn delete(&self, scope: &Scope, ids: &[GroupId]) -> Result<(), CoreError>;

    async fn mass_add(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        members: &[MemberRef],
    ) -> Result<(), CoreError>;

    async fn mass_remove(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        members: &[MemberRef],
    ) -> Result<(), CoreError>;

    async fn mass_update(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        patch: &GroupPatch,
    ) -> Result<(), CoreError>;

    async fn propagate(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        patch: &SettingsPatch,
    ) -> Result<(), CoreError>;
}

// ── HTTP implementation ─────────────────────────────────────────────

/// [`GroupRepository`] backed by the group service HTTP API.
pub struct HttpGroupRepository {
    client: GroupServiceClient,
}

impl HttpGroupRepository {
    pub fn new(client: GroupServiceClient) -> Self {
        Self { client }
    }
}

fn id_strings(ids: &[GroupId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_owned()).collect()
}

fn member_strings(members: &[MemberRef]) -> Vec<String> {
    members.iter().map(|m| m.id.clone()).collect()
}

/// Turn a short `groupids` echo into a `PartialFailure`.
///
/// The service reports which groups it touched; when it reports fewer than
/// were requested the rest were skipped without an error envelope.
fn check_applied(
    operation: &'static str,
    requested: &[String],
    result: MutationResult,
) -> Result<(), CoreError> {
    let Some(applied) = result.groupids else {
        return Ok(());
    };
    if applied.len() >= requested.len() {
        return Ok(());
    }
    warn!(
        operation,
        requested = requested.len(),
        applied = applied.len(),
        "service applied the request to fewer groups than requested"
    );
    Err(CoreError::PartialFailure {
        operation,
        message: format!(
            "service applied {} of {} groups",
            applied.len(),
            requested.len()
        ),
        completed: applied,
    })
}

#[async_trait]
impl GroupRepository for HttpGroupRepository {
    async fn list(&self, scope: &Scope, query: &ListQuery) -> Result<Vec<Group>, CoreError> {
        let collection = scope.kind.collection();
        let mut get = if query.expand_members {
            GetQuery::with_members(collection)
        } else {
            GetQuery {
                sortfield: Some("name".into()),
                sortorder: Some(groupctl_api::types::SortOrder::Asc),
                ..GetQuery::default()
            }
        };
        if let Some(term) = &query.name_search {
            let mut search = serde_json::Map::new();
            search.insert("name".into(), serde_json::Value::String(term.clone()));
            get.search = Some(search);
        }

        let records = self
            .client
            .list_groups(&scope.project, collection, &get)
            .await?;
        Ok(records
            .into_iter()
            .map(|r| group_from_record(scope.kind, r))
            .collect())
    }

    async fn create(&self, scope: &Scope, draft: &GroupDraft) -> Result<Group, CoreError> {
        let collection = scope.kind.collection();
        let record = self
            .client
            .create_group(&scope.project, collection, &create_body(collection, draft))
            .await?;
        Ok(group_from_record(scope.kind, record))
    }

    async fn update(
        &self,
        scope: &Scope,
        id: &GroupId,
        patch: &GroupPatch,
    ) -> Result<Group, CoreError> {
        let record = self
            .client
            .update_group(
                &scope.project,
                scope.kind.collection(),
                id.as_str(),
                &patch_body(patch),
            )
            .await?;
        Ok(group_from_record(scope.kind, record))
    }

    async fn delete(&self, scope: &Scope, ids: &[GroupId]) -> Result<(), CoreError> {
        let ids = id_strings(ids);
        let result = self
            .client
            .delete_groups(&scope.project, scope.kind.collection(), &ids)
            .await?;
        check_applied("delete", &ids, result)
    }

    async fn mass_add(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        members: &[MemberRef],
    ) -> Result<(), CoreError> {
        let ids = id_strings(ids);
        let result = self
            .client
            .mass_add(
                &scope.project,
                scope.kind.collection(),
                &ids,
                &member_strings(members),
            )
            .await?;
        check_applied("mass-add", &ids, result)
    }

    async fn mass_remove(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        members: &[MemberRef],
    ) -> Result<(), CoreError> {
        let ids = id_strings(ids);
        let result = self
            .client
            .mass_remove(
                &scope.project,
                scope.kind.collection(),
                &ids,
                &member_strings(members),
            )
            .await?;
        check_applied("mass-remove", &ids, result)
    }

    async fn mass_update(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        patch: &GroupPatch,
    ) -> Result<(), CoreError> {
        let ids = id_strings(ids);
        let result = self
            .client
            .mass_update(
                &scope.project,
                scope.kind.collection(),
                &ids,
                &patch_body(patch),
            )
            .await?;
        check_applied("mass-update", &ids, result)
    }

    async fn propagate(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        patch: &SettingsPatch,
    ) -> Result<(), CoreError> {
        let ids = id_strings(ids);
        let result = self
            .client
            .propagate(
                &scope.project,
                scope.kind.collection(),
                &ids,
                &permission_tags(&patch.permissions),
            )
            .await?;
        check_applied("propagate", &ids, result)
    }
}
