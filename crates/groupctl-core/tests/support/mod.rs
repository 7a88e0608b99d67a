// Shared fixtures for the groupctl-core integration suites.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use groupctl_core::{
    CachePolicy, Console, CoreError, Group, GroupDraft, GroupId, GroupKind, GroupPatch,
    GroupRepository, ListQuery, MemberRef, Notification, NotificationKind, NotificationSink,
    Scope, SettingsPatch,
};

pub const PROJECT: &str = "prod";

// ── Builders ─────────────────────────────────────────────────────────

pub fn member(id: &str) -> MemberRef {
    MemberRef::named(id, format!("{id}.example.com"))
}

/// A host group with `ids` as members.
pub fn group_with(id: &str, name: &str, members: &[&str]) -> Group {
    Group {
        id: GroupId::from(id),
        kind: GroupKind::HostGroup,
        name: name.to_owned(),
        description: None,
        members: members.iter().map(|m| member(m)).collect(),
        member_count: members.len(),
        subgroups: Vec::new(),
        permissions: Vec::new(),
    }
}

/// A host group with `count` generated members.
pub fn group(id: &str, name: &str, count: usize) -> Group {
    let ids: Vec<String> = (0..count).map(|i| format!("{id}-h{i}")).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    group_with(id, name, &refs)
}

pub fn ids(raw: &[&str]) -> Vec<GroupId> {
    raw.iter().copied().map(GroupId::from).collect()
}

// ── Fake repository ──────────────────────────────────────────────────

/// A failure armed for one operation, triggered after `skip` successes.
struct Armed {
    skip: usize,
    error: CoreError,
}

#[derive(Default)]
struct State {
    groups: Vec<Group>,
    next_id: u64,
    calls: Vec<(&'static str, Vec<GroupId>)>,
    failures: HashMap<&'static str, Armed>,
}

/// In-memory group service. Records every call and can be told to fail.
#[derive(Default)]
pub struct FakeRepository {
    state: Mutex<State>,
    list_calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl FakeRepository {
    pub fn with_groups(groups: Vec<Group>) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut state = repo.state.lock().unwrap();
            state.groups = groups;
            state.next_id = 1000;
        }
        Arc::new(repo)
    }

    /// Fail every `op` call from now on.
    pub fn fail(&self, op: &'static str, error: CoreError) {
        self.fail_after(op, 0, error);
    }

    /// Let `skip` calls of `op` succeed, then fail.
    pub fn fail_after(&self, op: &'static str, skip: usize, error: CoreError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op, Armed { skip, error });
    }

    pub fn heal(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Every call sleeps this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Write calls in order, as (operation, ids). Reads are counted by
    /// `list_calls` instead.
    pub fn calls(&self) -> Vec<(&'static str, Vec<GroupId>)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, op: &str) -> usize {
        self.calls().iter().filter(|(name, _)| *name == op).count()
    }

    pub fn groups(&self) -> Vec<Group> {
        self.state.lock().unwrap().groups.clone()
    }

    pub fn find(&self, name: &str) -> Option<Group> {
        self.groups().into_iter().find(|g| g.name == name)
    }

    /// Remove a group behind the console's back, as another session would.
    pub fn remove_externally(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .groups
            .retain(|g| g.id.as_str() != id);
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check(&self, op: &'static str, ids: &[GroupId]) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        if op != "list" {
            state.calls.push((op, ids.to_vec()));
        }
        if let Some(armed) = state.failures.get_mut(op) {
            if armed.skip == 0 {
                return Err(armed.error.clone());
            }
            armed.skip -= 1;
        }
        Ok(())
    }

    fn with_targets(&self, ids: &[GroupId], mut apply: impl FnMut(&mut Group)) {
        let mut state = self.state.lock().unwrap();
        for group in state.groups.iter_mut().filter(|g| ids.contains(&g.id)) {
            apply(group);
            group.member_count = group.members.len();
        }
    }
}

fn apply_patch(group: &mut Group, patch: &GroupPatch) {
    if let Some(name) = &patch.name {
        group.name.clone_from(name);
    }
    if let Some(description) = &patch.description {
        group.description = Some(description.clone()).filter(|d| !d.is_empty());
    }
    if let Some(permissions) = &patch.permissions {
        group.permissions.clone_from(permissions);
    }
}

#[async_trait]
impl GroupRepository for FakeRepository {
    async fn list(&self, scope: &Scope, _query: &ListQuery) -> Result<Vec<Group>, CoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.check("list", &[])?;
        Ok(self
            .groups()
            .into_iter()
            .filter(|g| g.kind == scope.kind)
            .collect())
    }

    async fn create(&self, scope: &Scope, draft: &GroupDraft) -> Result<Group, CoreError> {
        self.pause().await;
        self.check("create", &[])?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let group = Group {
            id: GroupId::new(state.next_id.to_string()),
            kind: scope.kind,
            name: draft.name.clone(),
            description: draft.description.clone(),
            members: draft.members.clone(),
            member_count: draft.members.len(),
            subgroups: Vec::new(),
            permissions: draft.permissions.clone(),
        };
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn update(
        &self,
        _scope: &Scope,
        id: &GroupId,
        patch: &GroupPatch,
    ) -> Result<Group, CoreError> {
        self.pause().await;
        self.check("update", std::slice::from_ref(id))?;
        self.with_targets(std::slice::from_ref(id), |g| apply_patch(g, patch));
        self.groups()
            .into_iter()
            .find(|g| &g.id == id)
            .ok_or(CoreError::Remote {
                status: Some(404),
                message: format!("no group {id}"),
            })
    }

    async fn delete(&self, _scope: &Scope, ids: &[GroupId]) -> Result<(), CoreError> {
        self.pause().await;
        self.check("delete", ids)?;
        self.state
            .lock()
            .unwrap()
            .groups
            .retain(|g| !ids.contains(&g.id));
        Ok(())
    }

    async fn mass_add(
        &self,
        _scope: &Scope,
        ids: &[GroupId],
        members: &[MemberRef],
    ) -> Result<(), CoreError> {
        self.pause().await;
        self.check("massadd", ids)?;
        self.with_targets(ids, |g| {
            for m in members {
                if !g.members.iter().any(|e| e.id == m.id) {
                    g.members.push(m.clone());
                }
            }
        });
        Ok(())
    }

    async fn mass_remove(
        &self,
        _scope: &Scope,
        ids: &[GroupId],
        members: &[MemberRef],
    ) -> Result<(), CoreError> {
        self.pause().await;
        self.check("massremove", ids)?;
        self.with_targets(ids, |g| g.members.retain(|e| !members.iter().any(|m| m.id == e.id)));
        Ok(())
    }

    async fn mass_update(
        &self,
        _scope: &Scope,
        ids: &[GroupId],
        patch: &GroupPatch,
    ) -> Result<(), CoreError> {
        self.pause().await;
        self.check("massupdate", ids)?;
        self.with_targets(ids, |g| apply_patch(g, patch));
        Ok(())
    }

    async fn propagate(
        &self,
        _scope: &Scope,
        ids: &[GroupId],
        patch: &SettingsPatch,
    ) -> Result<(), CoreError> {
        self.pause().await;
        self.check("propagate", ids)?;
        self.with_targets(ids, |g| g.permissions = patch.normalized());
        Ok(())
    }
}

// ── Recording sink ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.all().into_iter().map(|n| n.kind).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.all().pop()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

// ── Console wiring ───────────────────────────────────────────────────

pub fn console(repo: &Arc<FakeRepository>, sink: &Arc<RecordingSink>) -> Console {
    console_with_policy(repo, sink, CachePolicy::default())
}

pub fn console_with_policy(
    repo: &Arc<FakeRepository>,
    sink: &Arc<RecordingSink>,
    policy: CachePolicy,
) -> Console {
    Console::with_repository(
        Arc::clone(repo) as Arc<dyn GroupRepository>,
        Some(PROJECT.to_owned()),
        policy,
        Arc::clone(sink) as Arc<dyn NotificationSink>,
    )
}

pub fn scope() -> Scope {
    Scope::new(PROJECT, GroupKind::HostGroup)
}
