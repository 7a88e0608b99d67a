// ── Validating repository client ──
//
// Every engine reaches the repository through `GroupClient`. It resolves
// the project scope (failing closed with `NoContext`), rejects malformed
// requests before they leave the process, collapses duplicate ids, and
// traces each call. No retries: a failed call is reported once.

use std::sync::Arc;

use indexmap::IndexSet;
use tracing::{debug, info, instrument};

use crate::context::ContextProvider;
use crate::error::CoreError;
use crate::model::{Group, GroupDraft, GroupId, GroupKind, GroupPatch, MemberRef, SettingsPatch};
use crate::repository::{GroupRepository, ListQuery, Scope};

#[derive(Clone)]
pub struct GroupClient {
    repo: Arc<dyn GroupRepository>,
    context: Arc<ContextProvider>,
}

// ── Validation helpers ───────────────────────────────────────────────

/// Trimmed, non-empty group name.
pub(crate) fn normalize_name(raw: &str) -> Result<String, CoreError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CoreError::validation("name", "group name must not be empty"));
    }
    Ok(name.to_owned())
}

/// Order-preserving dedup; rejects empty lists and unsaved placeholders.
pub(crate) fn normalize_ids(ids: &[GroupId]) -> Result<Vec<GroupId>, CoreError> {
    let unique: IndexSet<&GroupId> = ids.iter().collect();
    if unique.is_empty() {
        return Err(CoreError::validation("ids", "select at least one group"));
    }
    if let Some(local) = unique.iter().find(|id| id.is_local()) {
        return Err(CoreError::validation(
            "ids",
            format!("group {local} has not been saved yet"),
        ));
    }
    Ok(unique.into_iter().cloned().collect())
}

fn normalize_members(members: &[MemberRef]) -> Result<Vec<MemberRef>, CoreError> {
    let mut seen = IndexSet::new();
    let unique: Vec<MemberRef> = members
        .iter()
        .filter(|m| seen.insert(m.id.as_str()))
        .cloned()
        .collect();
    if unique.is_empty() {
        return Err(CoreError::validation("members", "select at least one member"));
    }
    Ok(unique)
}

pub(crate) fn normalize_patch(patch: &GroupPatch) -> Result<GroupPatch, CoreError> {
    let normalized = GroupPatch {
        name: patch.name.as_deref().map(normalize_name).transpose()?,
        description: patch.description.clone(),
        permissions: patch
            .permissions
            .as_ref()
            .map(|p| SettingsPatch::new(p.iter().copied()).normalized()),
    };
    if normalized.is_empty() {
        return Err(CoreError::validation("patch", "nothing to change"));
    }
    Ok(normalized)
}

impl GroupClient {
    pub fn new(repo: Arc<dyn GroupRepository>, context: Arc<ContextProvider>) -> Self {
        Self { repo, context }
    }

    /// Scope for `kind` under the current project.
    pub fn scope(&self, kind: GroupKind) -> Result<Scope, CoreError> {
        let project = self.context.require()?;
        Ok(Scope::new(project.as_str(), kind))
    }

    pub fn context(&self) -> &Arc<ContextProvider> {
        &self.context
    }

    pub(crate) fn repository(&self) -> &Arc<dyn GroupRepository> {
        &self.repo
    }

    // ── Operations ───────────────────────────────────────────────────

    #[instrument(skip(self), fields(project = %scope.project, kind = %scope.kind))]
    pub async fn list(&self, scope: &Scope, query: &ListQuery) -> Result<Vec<Group>, CoreError> {
        self.repo.list(scope, query).await
    }

    #[instrument(skip_all, fields(project = %scope.project, kind = %scope.kind))]
    pub async fn create(&self, scope: &Scope, draft: &GroupDraft) -> Result<Group, CoreError> {
        let draft = GroupDraft {
            name: normalize_name(&draft.name)?,
            description: draft.description.clone().filter(|d| !d.trim().is_empty()),
            permissions: SettingsPatch::new(draft.permissions.iter().copied()).normalized(),
            members: {
                let mut seen = IndexSet::new();
                draft
                    .members
                    .iter()
                    .filter(|m| seen.insert(m.id.as_str()))
                    .cloned()
                    .collect()
            },
        };
        let group = self.repo.create(scope, &draft).await?;
        info!(id = %group.id, name = %group.name, "created group");
        Ok(group)
    }

    #[instrument(skip(self, patch), fields(project = %scope.project, kind = %scope.kind))]
    pub async fn update(
        &self,
        scope: &Scope,
        id: &GroupId,
        patch: &GroupPatch,
    ) -> Result<Group, CoreError> {
        normalize_ids(std::slice::from_ref(id))?;
        let patch = normalize_patch(patch)?;
        let group = self.repo.update(scope, id, &patch).await?;
        info!(id = %group.id, "updated group");
        Ok(group)
    }

    #[instrument(skip_all, fields(project = %scope.project, kind = %scope.kind))]
    pub async fn delete(&self, scope: &Scope, ids: &[GroupId]) -> Result<usize, CoreError> {
        let ids = normalize_ids(ids)?;
        debug!(count = ids.len(), "deleting groups");
        self.repo.delete(scope, &ids).await?;
        info!(count = ids.len(), "deleted groups");
        Ok(ids.len())
    }

    #[instrument(skip_all, fields(project = %scope.project, kind = %scope.kind))]
    pub async fn mass_add(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        members: &[MemberRef],
    ) -> Result<usize, CoreError> {
        let ids = normalize_ids(ids)?;
        let members = normalize_members(members)?;
        self.repo.mass_add(scope, &ids, &members).await?;
        info!(groups = ids.len(), members = members.len(), "linked members");
        Ok(ids.len())
    }

    #[instrument(skip_all, fields(project = %scope.project, kind = %scope.kind))]
    pub async fn mass_remove(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        members: &[MemberRef],
    ) -> Result<usize, CoreError> {
        let ids = normalize_ids(ids)?;
        let members = normalize_members(members)?;
        self.repo.mass_remove(scope, &ids, &members).await?;
        info!(groups = ids.len(), members = members.len(), "unlinked members");
        Ok(ids.len())
    }

    #[instrument(skip_all, fields(project = %scope.project, kind = %scope.kind))]
    pub async fn mass_update(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        patch: &GroupPatch,
    ) -> Result<usize, CoreError> {
        let ids = normalize_ids(ids)?;
        let patch = normalize_patch(patch)?;
        self.repo.mass_update(scope, &ids, &patch).await?;
        info!(count = ids.len(), "mass-updated groups");
        Ok(ids.len())
    }

    #[instrument(skip_all, fields(project = %scope.project, kind = %scope.kind))]
    pub async fn propagate(
        &self,
        scope: &Scope,
        ids: &[GroupId],
        patch: &SettingsPatch,
    ) -> Result<usize, CoreError> {
        let ids = normalize_ids(ids)?;
        let permissions = patch.normalized();
        if permissions.is_empty() {
            return Err(CoreError::validation(
                "permissions",
                "choose at least one permission to propagate",
            ));
        }
        self.repo
            .propagate(scope, &ids, &SettingsPatch { permissions })
            .await?;
        info!(count = ids.len(), "propagated permissions");
        Ok(ids.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(
            normalize_name("   "),
            Err(CoreError::Validation { field: "name", .. })
        ));
        assert_eq!(normalize_name("  Web  ").unwrap(), "Web");
    }

    #[test]
    fn ids_are_deduplicated_in_order() {
        let ids: Vec<GroupId> = ["b", "a", "b"].into_iter().map(GroupId::from).collect();
        assert_eq!(
            normalize_ids(&ids).unwrap(),
            vec![GroupId::from("b"), GroupId::from("a")]
        );
    }

    #[test]
    fn empty_or_local_ids_are_rejected() {
        assert!(normalize_ids(&[]).is_err());
        assert!(normalize_ids(&[GroupId::local()]).is_err());
    }

    #[test]
    fn patch_with_blank_name_is_rejected() {
        let patch = GroupPatch {
            name: Some(" ".into()),
            ..GroupPatch::default()
        };
        assert!(normalize_patch(&patch).is_err());
        assert!(normalize_patch(&GroupPatch::default()).is_err());
    }
}
