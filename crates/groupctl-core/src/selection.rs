// ── Selection model ──
//
// The set of group ids chosen for the next bulk action. Independent of the
// projection: hiding a row never deselects it. Pruned against the
// authoritative list whenever a view reads it, and again against the last
// published list before any action takes the selection as its targets.
//
// Backed by a `watch` channel of an ordered set, so bulk requests carry a
// deterministic id order and views can observe every change.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;

use crate::model::{Group, GroupId};

pub type SelectionSet = Arc<BTreeSet<GroupId>>;

pub struct SelectionModel {
    tx: watch::Sender<SelectionSet>,
}

impl SelectionModel {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(BTreeSet::new()));
        Self { tx }
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&self, id: &GroupId) {
        self.tx.send_modify(|set| {
            let set = Arc::make_mut(set);
            if !set.remove(id) {
                set.insert(id.clone());
            }
        });
    }

    /// Select exactly `visible`, or clear when the selection already equals
    /// it. Two calls with the same ids alternate between "all" and "none".
    pub fn select_all<'a>(&self, visible: impl IntoIterator<Item = &'a GroupId>) {
        let visible: BTreeSet<GroupId> = visible.into_iter().cloned().collect();
        self.tx.send_modify(|set| {
            if **set == visible {
                *set = Arc::new(BTreeSet::new());
            } else {
                *set = Arc::new(visible);
            }
        });
    }

    pub fn clear(&self) {
        self.tx.send_if_modified(|set| {
            if set.is_empty() {
                return false;
            }
            *set = Arc::new(BTreeSet::new());
            true
        });
    }

    /// Drop every id in `ids` from the selection.
    pub fn remove_all<'a>(&self, ids: impl IntoIterator<Item = &'a GroupId>) {
        let ids: Vec<&GroupId> = ids.into_iter().collect();
        self.tx.send_if_modified(|set| {
            if !ids.iter().any(|id| set.contains(*id)) {
                return false;
            }
            let set = Arc::make_mut(set);
            for id in ids {
                set.remove(id);
            }
            true
        });
    }

    /// Keep only ids for which `exists` holds. Returns the pruned ids.
    pub fn prune(&self, exists: impl Fn(&GroupId) -> bool) -> Vec<GroupId> {
        let mut dropped = Vec::new();
        self.tx.send_if_modified(|set| {
            dropped = set.iter().filter(|id| !exists(id)).cloned().collect();
            if dropped.is_empty() {
                return false;
            }
            let set = Arc::make_mut(set);
            for id in &dropped {
                set.remove(id);
            }
            true
        });
        dropped
    }

    /// Drop ids that are not in `list`. Returns the pruned ids.
    pub fn retain_listed(&self, list: &[Arc<Group>]) -> Vec<GroupId> {
        self.prune(|id| list.iter().any(|g| &g.id == id))
    }

    pub fn contains(&self, id: &GroupId) -> bool {
        self.tx.borrow().contains(id)
    }

    pub fn snapshot(&self) -> SelectionSet {
        self.tx.borrow().clone()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<GroupId> {
        self.tx.borrow().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionSet> {
        self.tx.subscribe()
    }
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}
