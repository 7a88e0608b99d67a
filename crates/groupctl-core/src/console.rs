// ── Console facade ──
//
// Entry point for consumers. Wires the repository, cache, and project
// context once, then vends a `GroupView` per group kind. A view owns its
// selection, its bulk and propagation engines (sharing one in-flight
// gate), and a cancellation token that `close()` trips.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use groupctl_api::GroupServiceClient;

use crate::bulk::BulkActionEngine;
use crate::cache::{GroupCache, GroupList, GroupStream};
use crate::client::GroupClient;
use crate::config::{AuthCredentials, CachePolicy, ConsoleConfig};
use crate::context::ContextProvider;
use crate::error::CoreError;
use crate::form::GroupFormController;
use crate::gate::InFlightGate;
use crate::model::{Group, GroupId, GroupKind, MemberRef};
use crate::notify::{Notification, NotificationSink};
use crate::projection::{SizeBucket, project, visible_ids};
use crate::propagation::PropagationEngine;
use crate::repository::{GroupRepository, HttpGroupRepository};
use crate::selection::SelectionModel;

// ── Console ──────────────────────────────────────────────────────────

/// Cheaply cloneable handle shared by every view of one server.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    client: GroupClient,
    cache: GroupCache,
    sink: Arc<dyn NotificationSink>,
    cancel: CancellationToken,
}

impl Console {
    /// Build a console that talks to the group service described by `config`.
    pub fn new(
        config: &ConsoleConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, CoreError> {
        let AuthCredentials::ApiToken(token) = &config.auth;
        let http = GroupServiceClient::from_token(config.url.as_str(), token, &config.transport())?;
        info!(url = %config.url, project = ?config.project, "console configured");
        Ok(Self::with_repository(
            Arc::new(HttpGroupRepository::new(http)),
            config.project.clone(),
            config.cache,
            sink,
        ))
    }

    /// Build a console over any repository implementation.
    pub fn with_repository(
        repo: Arc<dyn GroupRepository>,
        project: Option<String>,
        policy: CachePolicy,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let context = Arc::new(ContextProvider::new(project));
        let cache = GroupCache::new(Arc::clone(&repo), policy);
        Self {
            inner: Arc::new(ConsoleInner {
                client: GroupClient::new(repo, context),
                cache,
                sink,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn context(&self) -> &Arc<ContextProvider> {
        self.inner.client.context()
    }

    pub fn client(&self) -> &GroupClient {
        &self.inner.client
    }

    pub fn cache(&self) -> &GroupCache {
        &self.inner.cache
    }

    /// Switch to another project. Lists are cached per project, so the
    /// previous project's entries stay valid for a switch back.
    pub fn set_project(&self, project: Option<String>) {
        self.context().set(project);
    }

    /// The operator returned to the console.
    pub fn focus_regained(&self) {
        self.inner.cache.focus_regained();
    }

    /// A fresh view over `kind`, with its own empty selection.
    pub fn view(&self, kind: GroupKind) -> GroupView {
        GroupView::new(
            kind,
            self.inner.client.clone(),
            self.inner.cache.clone(),
            Arc::clone(&self.inner.sink),
            self.inner.cancel.child_token(),
        )
    }

    /// Close every view created by this console.
    pub fn shutdown(&self) {
        debug!("console shutting down");
        self.inner.cancel.cancel();
    }
}

// ── GroupView ────────────────────────────────────────────────────────

/// One kind's list, selection, and engines.
pub struct GroupView {
    kind: GroupKind,
    client: GroupClient,
    cache: GroupCache,
    sink: Arc<dyn NotificationSink>,
    selection: Arc<SelectionModel>,
    gate: InFlightGate,
    bulk: BulkActionEngine,
    propagation: PropagationEngine,
    cancel: CancellationToken,
}

impl GroupView {
    fn new(
        kind: GroupKind,
        client: GroupClient,
        cache: GroupCache,
        sink: Arc<dyn NotificationSink>,
        cancel: CancellationToken,
    ) -> Self {
        let selection = Arc::new(SelectionModel::new());
        let gate = InFlightGate::new();
        let bulk = BulkActionEngine::new(
            kind,
            client.clone(),
            cache.clone(),
            Arc::clone(&selection),
            Arc::clone(&sink),
            gate.clone(),
            cancel.clone(),
        );
        let propagation = PropagationEngine::new(
            kind,
            client.clone(),
            cache.clone(),
            Arc::clone(&selection),
            Arc::clone(&sink),
            gate.clone(),
            cancel.clone(),
        );
        Self {
            kind,
            client,
            cache,
            sink,
            selection,
            gate,
            bulk,
            propagation,
            cancel,
        }
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn bulk(&self) -> &BulkActionEngine {
        &self.bulk
    }

    pub fn propagation(&self) -> &PropagationEngine {
        &self.propagation
    }

    /// A form controller for creating or editing groups of this kind.
    pub fn form(&self) -> GroupFormController {
        GroupFormController::new(
            self.kind,
            self.client.clone(),
            self.cache.clone(),
            Arc::clone(&self.sink),
        )
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The authoritative list, from cache when fresh. Prunes the selection.
    pub async fn list(&self) -> Result<GroupList, CoreError> {
        self.read(false).await
    }

    /// Refetch the list regardless of freshness. Prunes the selection.
    pub async fn refresh(&self) -> Result<GroupList, CoreError> {
        self.read(true).await
    }

    async fn read(&self, force: bool) -> Result<GroupList, CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        let scope = self.client.scope(self.kind)?;
        let fetch = async {
            if force {
                self.cache.refresh(&scope).await
            } else {
                self.cache.get(&scope).await
            }
        };
        let result = self
            .cancel
            .run_until_cancelled(fetch)
            .await
            .ok_or(CoreError::Cancelled)?;

        match result {
            Ok(list) => {
                self.prune_selection(&list);
                Ok(list)
            }
            Err(err) => {
                self.sink.notify(Notification::error(format!(
                    "Failed to load {}s: {err}",
                    self.kind
                )));
                Err(err)
            }
        }
    }

    fn prune_selection(&self, list: &GroupList) {
        let dropped = self.selection.retain_listed(list);
        if !dropped.is_empty() {
            debug!(
                kind = %self.kind,
                count = dropped.len(),
                "pruned vanished groups from selection"
            );
        }
    }

    /// Last cached list without touching the network. Empty without a project.
    pub fn snapshot(&self) -> GroupList {
        self.client
            .scope(self.kind)
            .map(|scope| self.cache.snapshot(&scope))
            .unwrap_or_default()
    }

    /// Filtered, order-preserving subset of the current list.
    pub async fn visible(
        &self,
        term: &str,
        bucket: SizeBucket,
    ) -> Result<Vec<Arc<Group>>, CoreError> {
        let list = self.list().await?;
        Ok(project(&list, term, bucket))
    }

    /// Toggle-all over the groups currently visible under `term`/`bucket`.
    pub async fn select_all_visible(
        &self,
        term: &str,
        bucket: SizeBucket,
    ) -> Result<usize, CoreError> {
        let visible = self.visible(term, bucket).await?;
        self.selection.select_all(&visible_ids(&visible));
        Ok(self.selection.len())
    }

    pub fn subscribe(&self) -> Result<GroupStream, CoreError> {
        let scope = self.client.scope(self.kind)?;
        Ok(self.cache.subscribe(&scope))
    }

    // ── Membership ───────────────────────────────────────────────────

    /// Link `members` to every group in `ids`.
    pub async fn add_members(
        &self,
        ids: &[GroupId],
        members: &[MemberRef],
    ) -> Result<usize, CoreError> {
        self.membership(ids, members, true).await
    }

    /// Unlink `members` from every group in `ids`.
    pub async fn remove_members(
        &self,
        ids: &[GroupId],
        members: &[MemberRef],
    ) -> Result<usize, CoreError> {
        self.membership(ids, members, false).await
    }

    async fn membership(
        &self,
        ids: &[GroupId],
        members: &[MemberRef],
        add: bool,
    ) -> Result<usize, CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        let scope = self.client.scope(self.kind)?;
        let Some(_guard) = self.gate.try_acquire() else {
            return Err(CoreError::Busy);
        };

        let result = if add {
            self.client.mass_add(&scope, ids, members).await
        } else {
            self.client.mass_remove(&scope, ids, members).await
        };
        let (verb, past) = if add { ("add", "Added") } else { ("remove", "Removed") };

        match result {
            Ok(count) => {
                self.cache.invalidate(&scope);
                self.sink.notify(Notification::success(format!(
                    "{past} {} {} on {count} {}(s)",
                    members.len(),
                    self.kind.member_noun(),
                    self.kind
                )));
                Ok(count)
            }
            Err(err) if err.is_local() => Err(err),
            Err(err) => {
                if matches!(err, CoreError::PartialFailure { .. }) {
                    self.cache.invalidate(&scope);
                }
                self.sink.notify(Notification::error(format!(
                    "Failed to {verb} {}: {err}",
                    self.kind.member_noun()
                )));
                warn!(kind = %self.kind, error = %err, "membership change failed");
                Err(err)
            }
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Abandon pending reads; later calls fail with `Cancelled`. Writes
    /// already in flight run to completion.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
