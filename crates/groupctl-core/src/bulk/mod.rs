// ── Bulk-action engine ──
//
// Runs one of {delete, update, clone, merge} across the selection.
// Each invocation walks
//
//   Idle -> ActionChosen -> Confirmed -> InFlight -> {Succeeded, Failed}
//
// The request (action + targets) is captured when the action is chosen and
// consumed exactly once on submit. Delete needs an explicit `confirm()`;
// the other actions are confirmed by `submit()` itself.
//
// Writes go to the network first. On success the cache key is invalidated
// and the selection cleared; on any remote failure the selection is left
// as it was and the failure is pushed to the notification sink.

pub mod compose;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::GroupCache;
use crate::client::{GroupClient, normalize_ids, normalize_patch};
use crate::error::CoreError;
use crate::gate::InFlightGate;
use crate::model::{Group, GroupId, GroupKind, GroupPatch};
use crate::notify::{Notification, NotificationSink};
use crate::repository::Scope;
use crate::selection::SelectionModel;

pub use compose::{CLONE_SUFFIX, DEFAULT_MERGE_NAME};

// ── Request / outcome types ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BulkPhase {
    Idle,
    ActionChosen,
    Confirmed,
    InFlight,
    Succeeded,
    Failed,
}

impl BulkPhase {
    /// Phases from which a new action may be chosen.
    fn accepts_new_action(self) -> bool {
        !matches!(self, Self::InFlight)
    }
}

/// What to do with the selected groups.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkAction {
    Delete,
    /// Apply one patch to every target in a single call.
    Update(GroupPatch),
    /// One `-clone` copy per target.
    Clone,
    /// Combine every target into one new group, then remove the targets.
    Merge { name: Option<String> },
}

impl BulkAction {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Update(_) => "update",
            Self::Clone => "clone",
            Self::Merge { .. } => "merge",
        }
    }
}

/// A chosen action and the ids it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkRequest {
    pub action: BulkAction,
    pub targets: Vec<GroupId>,
}

/// A clone produced by [`BulkAction::Clone`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClonedGroup {
    /// Local id the clone carried until the service assigned one.
    pub placeholder: GroupId,
    pub group: Group,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BulkOutcome {
    Deleted { count: usize },
    Updated { count: usize },
    Cloned { clones: Vec<ClonedGroup> },
    Merged { group: Group, sources_removed: usize },
}

// ── Engine ───────────────────────────────────────────────────────────

pub struct BulkActionEngine {
    kind: GroupKind,
    client: GroupClient,
    cache: GroupCache,
    selection: Arc<SelectionModel>,
    sink: Arc<dyn NotificationSink>,
    gate: InFlightGate,
    cancel: CancellationToken,
    request: Mutex<Option<BulkRequest>>,
    phase: watch::Sender<BulkPhase>,
}

impl BulkActionEngine {
    pub(crate) fn new(
        kind: GroupKind,
        client: GroupClient,
        cache: GroupCache,
        selection: Arc<SelectionModel>,
        sink: Arc<dyn NotificationSink>,
        gate: InFlightGate,
        cancel: CancellationToken,
    ) -> Self {
        let (phase, _) = watch::channel(BulkPhase::Idle);
        Self {
            kind,
            client,
            cache,
            selection,
            sink,
            gate,
            cancel,
            request: Mutex::new(None),
            phase,
        }
    }

    pub fn phase(&self) -> BulkPhase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<BulkPhase> {
        self.phase.subscribe()
    }

    /// The chosen, not yet submitted request.
    pub fn pending(&self) -> Option<BulkRequest> {
        self.request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_phase(&self, phase: BulkPhase) {
        self.phase.send_replace(phase);
    }

    fn invalid(&self, action: &'static str) -> CoreError {
        CoreError::InvalidState {
            phase: self.phase().to_string(),
            action,
        }
    }

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        Ok(())
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Capture `action` against the current selection.
    ///
    /// The selection is first pruned against the last published list, so
    /// groups another view saw disappear are never targeted. Replaces an
    /// earlier chosen-but-unsubmitted request.
    pub fn choose(&self, action: BulkAction) -> Result<BulkRequest, CoreError> {
        self.ensure_open()?;
        if !self.phase().accepts_new_action() || self.gate.is_busy() {
            return Err(CoreError::Busy);
        }

        let scope = self.client.scope(self.kind)?;
        if let Some(list) = self.cache.published(&scope) {
            let dropped = self.selection.retain_listed(&list);
            if !dropped.is_empty() {
                debug!(kind = %self.kind, count = dropped.len(), "dropped unlisted targets");
            }
        }

        let targets = normalize_ids(&self.selection.ids())?;
        let action = match action {
            BulkAction::Merge { .. } if targets.len() < 2 => {
                return Err(CoreError::validation(
                    "selection",
                    "select at least two groups to merge",
                ));
            }
            BulkAction::Update(patch) => BulkAction::Update(normalize_patch(&patch)?),
            other => other,
        };

        let request = BulkRequest { action, targets };
        *self.request.lock().unwrap_or_else(PoisonError::into_inner) = Some(request.clone());
        self.set_phase(BulkPhase::ActionChosen);
        Ok(request)
    }

    /// Confirm the chosen action. Required before submitting a delete.
    pub fn confirm(&self) -> Result<(), CoreError> {
        self.ensure_open()?;
        if self.phase() != BulkPhase::ActionChosen {
            return Err(self.invalid("confirm"));
        }
        self.set_phase(BulkPhase::Confirmed);
        Ok(())
    }

    /// Discard the chosen request and return to `Idle`.
    pub fn cancel(&self) -> Result<(), CoreError> {
        if self.phase() == BulkPhase::InFlight {
            return Err(self.invalid("cancel"));
        }
        self.request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.set_phase(BulkPhase::Idle);
        Ok(())
    }

    /// Execute the chosen request.
    ///
    /// Rejections raised before anything is written (missing confirmation,
    /// stale selection, no project, a failed list reload) leave the phase
    /// and the request untouched.
    pub async fn submit(&self) -> Result<BulkOutcome, CoreError> {
        self.ensure_open()?;
        let phase = self.phase();
        let Some(request) = self.pending() else {
            return Err(self.invalid("submit"));
        };
        match (phase, &request.action) {
            (BulkPhase::ActionChosen, BulkAction::Delete) => {
                return Err(CoreError::validation(
                    "confirm",
                    "deleting groups requires confirmation",
                ));
            }
            (BulkPhase::ActionChosen | BulkPhase::Confirmed, _) => {}
            _ => return Err(self.invalid("submit")),
        }

        let scope = self.client.scope(self.kind)?;
        let Some(_guard) = self.gate.try_acquire() else {
            return Err(CoreError::Busy);
        };
        let sources = match request.action {
            BulkAction::Clone | BulkAction::Merge { .. } => {
                self.resolve_sources(&scope, &request.targets).await?
            }
            BulkAction::Delete | BulkAction::Update(_) => Vec::new(),
        };
        self.request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.set_phase(BulkPhase::InFlight);

        let verb = request.action.verb();
        let result = self.execute(&scope, request, &sources).await;

        match &result {
            Ok(outcome) => {
                self.cache.invalidate(&scope);
                self.selection.clear();
                self.set_phase(BulkPhase::Succeeded);
                self.sink.notify(Notification::success(self.describe(outcome)));
                info!(kind = %self.kind, action = verb, "bulk action succeeded");
            }
            Err(err @ CoreError::PartialFailure { .. }) => {
                self.cache.invalidate(&scope);
                self.set_phase(BulkPhase::Failed);
                self.sink.notify(Notification::error(err.to_string()));
                warn!(
                    kind = %self.kind,
                    action = verb,
                    error = %err,
                    "bulk action partially applied"
                );
            }
            Err(err) if err.is_local() => {
                self.set_phase(BulkPhase::Failed);
            }
            Err(err) => {
                self.set_phase(BulkPhase::Failed);
                self.sink.notify(Notification::error(format!(
                    "Failed to {verb} {}s: {err}",
                    self.kind
                )));
                warn!(kind = %self.kind, action = verb, error = %err, "bulk action failed");
            }
        }
        result
    }

    /// Look up every target in a fresh list. A list invalidated by an
    /// earlier write is refetched first.
    async fn resolve_sources(
        &self,
        scope: &Scope,
        targets: &[GroupId],
    ) -> Result<Vec<Group>, CoreError> {
        let list = self
            .cancel
            .run_until_cancelled(self.cache.get(scope))
            .await
            .ok_or(CoreError::Cancelled)?
            .inspect_err(|err| {
                if !err.is_local() {
                    self.sink.notify(Notification::error(format!(
                        "Failed to load {}s: {err}",
                        self.kind
                    )));
                }
            })?;
        targets
            .iter()
            .map(|id| {
                let group = list.iter().find(|g| &g.id == id).ok_or_else(|| {
                    CoreError::validation(
                        "selection",
                        format!("group {id} is no longer listed; refresh and retry"),
                    )
                })?;
                if group.members.len() < group.member_count {
                    return Err(CoreError::validation(
                        "selection",
                        format!("members of \"{}\" are not loaded; refresh and retry", group.name),
                    ));
                }
                Ok(Group::clone(group))
            })
            .collect()
    }

    async fn execute(
        &self,
        scope: &Scope,
        request: BulkRequest,
        sources: &[Group],
    ) -> Result<BulkOutcome, CoreError> {
        match request.action {
            BulkAction::Delete => {
                let count = self.client.delete(scope, &request.targets).await?;
                self.selection.remove_all(&request.targets);
                Ok(BulkOutcome::Deleted { count })
            }
            BulkAction::Update(patch) => {
                let count = self
                    .client
                    .mass_update(scope, &request.targets, &patch)
                    .await?;
                Ok(BulkOutcome::Updated { count })
            }
            BulkAction::Clone => self.clone_all(scope, sources).await,
            BulkAction::Merge { name } => self.merge(scope, sources, name.as_deref()).await,
        }
    }

    async fn clone_all(&self, scope: &Scope, sources: &[Group]) -> Result<BulkOutcome, CoreError> {
        let mut clones: Vec<ClonedGroup> = Vec::with_capacity(sources.len());
        for source in sources {
            let placeholder = GroupId::local();
            let draft = compose::clone_draft(source);
            match self.client.create(scope, &draft).await {
                Ok(group) => clones.push(ClonedGroup { placeholder, group }),
                Err(err) if clones.is_empty() => return Err(err),
                Err(err) => {
                    return Err(CoreError::PartialFailure {
                        operation: "clone",
                        completed: clones.into_iter().map(|c| c.group.name).collect(),
                        message: format!("cloning \"{}\" failed: {err}", source.name),
                    });
                }
            }
        }
        Ok(BulkOutcome::Cloned { clones })
    }

    async fn merge(
        &self,
        scope: &Scope,
        sources: &[Group],
        name: Option<&str>,
    ) -> Result<BulkOutcome, CoreError> {
        let draft = compose::merge_draft(sources, name);
        let group = self.client.create(scope, &draft).await?;

        let source_ids: Vec<GroupId> = sources.iter().map(|g| g.id.clone()).collect();
        match self.client.delete(scope, &source_ids).await {
            Ok(sources_removed) => {
                self.selection.remove_all(&source_ids);
                Ok(BulkOutcome::Merged {
                    group,
                    sources_removed,
                })
            }
            Err(err) => Err(CoreError::PartialFailure {
                operation: "merge",
                completed: vec![group.name],
                message: format!("merged group created but removing the sources failed: {err}"),
            }),
        }
    }

    fn describe(&self, outcome: &BulkOutcome) -> String {
        let kind = self.kind;
        match outcome {
            BulkOutcome::Deleted { count } => format!("Deleted {count} {kind}(s)"),
            BulkOutcome::Updated { count } => format!("Updated {count} {kind}(s)"),
            BulkOutcome::Cloned { clones } => format!("Cloned {} {kind}(s)", clones.len()),
            BulkOutcome::Merged {
                group,
                sources_removed,
            } => format!("Merged {sources_removed} {kind}s into \"{}\"", group.name),
        }
    }
}
