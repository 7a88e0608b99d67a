// ── Group form controller ──
//
// Owns one draft, scoped to creating a new group or editing an existing
// one. Validation failures stay on the form; remote failures also go to
// the notification sink. Either way the operator's input is kept so the
// form can be corrected and resubmitted.

use std::sync::Arc;

use tracing::debug;

use crate::cache::GroupCache;
use crate::client::{GroupClient, normalize_name};
use crate::error::CoreError;
use crate::model::{Group, GroupDraft, GroupKind, GroupPatch, MemberRef, Permission};
use crate::notify::{Notification, NotificationSink};

/// What the open form will do on submit.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    /// Edit the captured group; the draft was seeded from it.
    Edit(Arc<Group>),
}

pub struct GroupFormController {
    kind: GroupKind,
    client: GroupClient,
    cache: GroupCache,
    sink: Arc<dyn NotificationSink>,
    mode: Option<FormMode>,
    draft: GroupDraft,
    last_error: Option<CoreError>,
}

impl GroupFormController {
    pub(crate) fn new(
        kind: GroupKind,
        client: GroupClient,
        cache: GroupCache,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            kind,
            client,
            cache,
            sink,
            mode: None,
            draft: GroupDraft::default(),
            last_error: None,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open an empty create form, discarding any previous draft.
    pub fn open_create(&mut self) {
        self.mode = Some(FormMode::Create);
        self.draft = GroupDraft::default();
        self.last_error = None;
    }

    /// Open an edit form seeded from `group`, replacing any previous draft.
    pub fn open_edit(&mut self, group: Arc<Group>) {
        self.draft = GroupDraft::from_group(&group);
        self.mode = Some(FormMode::Edit(group));
        self.last_error = None;
    }

    pub fn close(&mut self) {
        self.mode = None;
        self.draft = GroupDraft::default();
        self.last_error = None;
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn mode(&self) -> Option<&FormMode> {
        self.mode.as_ref()
    }

    // ── Draft access ─────────────────────────────────────────────────

    pub fn draft(&self) -> &GroupDraft {
        &self.draft
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.draft.description = description;
    }

    pub fn set_permissions(&mut self, permissions: Vec<Permission>) {
        self.draft.permissions = permissions;
    }

    /// Members to link on create. Ignored in edit mode; membership of an
    /// existing group changes through the view's add/remove operations.
    pub fn set_members(&mut self, members: Vec<MemberRef>) {
        self.draft.members = members;
    }

    /// Error from the last failed submit, if any.
    pub fn last_error(&self) -> Option<&CoreError> {
        self.last_error.as_ref()
    }

    /// Check the draft without submitting.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.mode.is_none() {
            return Err(CoreError::InvalidState {
                phase: "closed".into(),
                action: "validate",
            });
        }
        normalize_name(&self.draft.name).map(|_| ())
    }

    /// Fields of the draft that differ from the edited group.
    fn edit_patch(&self, group: &Group) -> GroupPatch {
        GroupPatch {
            name: Some(self.draft.name.trim().to_owned()),
            description: Some(self.draft.description.clone().unwrap_or_default()),
            permissions: Some(self.draft.permissions.clone()),
        }
        .diff_against(group)
    }

    // ── Submit ───────────────────────────────────────────────────────

    /// Create or update, then close the form.
    ///
    /// On failure the form stays open with the draft untouched.
    pub async fn submit(&mut self) -> Result<Group, CoreError> {
        let result = self.try_submit().await;
        match &result {
            Ok(group) => {
                debug!(id = %group.id, "form submitted");
                self.close();
            }
            Err(err) => {
                if !err.is_local() {
                    self.sink.notify(Notification::error(format!(
                        "Failed to save {}: {err}",
                        self.kind
                    )));
                }
                self.last_error = Some(err.clone());
            }
        }
        result
    }

    async fn try_submit(&self) -> Result<Group, CoreError> {
        self.validate()?;
        let scope = self.client.scope(self.kind)?;

        let (group, verb) = match &self.mode {
            Some(FormMode::Edit(existing)) => {
                let patch = self.edit_patch(existing);
                if patch.is_empty() {
                    return Err(CoreError::validation("form", "no changes to save"));
                }
                let group = self.client.update(&scope, &existing.id, &patch).await?;
                (group, "Updated")
            }
            Some(FormMode::Create) | None => {
                let group = self.client.create(&scope, &self.draft).await?;
                (group, "Created")
            }
        };

        self.cache.invalidate(&scope);
        self.sink.notify(Notification::success(format!(
            "{verb} {} \"{}\"",
            self.kind, group.name
        )));
        Ok(group)
    }
}
