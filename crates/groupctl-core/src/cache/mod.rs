// ── Read-through group-list cache ──
//
// One authoritative list per (kind, project) key. Reads inside the TTL are
// served from memory; concurrent misses share a single in-flight request.
// Writes never patch the list: callers invalidate the key and the next read
// refetches.
//
// Each key carries a generation counter. `invalidate` bumps it and detaches
// the in-flight read, and a read only stores its result when the generation
// it started under is still current, so a read racing a write can never
// repopulate the cache with pre-write data.

mod stream;

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, WeakShared};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::CachePolicy;
use crate::error::CoreError;
use crate::model::{Group, GroupKind};
use crate::repository::{GroupRepository, ListQuery, Scope};

pub use stream::{GroupStream, GroupWatchStream};

/// Immutable snapshot of one cached list.
pub type GroupList = Arc<Vec<Arc<Group>>>;

type ReadResult = Result<GroupList, CoreError>;
type SharedRead = Shared<BoxFuture<'static, ReadResult>>;

/// Cache key: which collection, in which project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: GroupKind,
    pub project: String,
}

impl From<&Scope> for CacheKey {
    fn from(scope: &Scope) -> Self {
        Self {
            kind: scope.kind,
            project: scope.project.clone(),
        }
    }
}

struct Fresh {
    list: GroupList,
    fetched_at: Instant,
    refreshed_at: DateTime<Utc>,
}

struct Slot {
    generation: u64,
    fresh: Option<Fresh>,
    /// Set by the first successful fetch; survives invalidation.
    published: bool,
    /// Weak so that dropping every waiter drops the read itself.
    inflight: Option<WeakShared<BoxFuture<'static, ReadResult>>>,
    tx: watch::Sender<GroupList>,
}

impl Slot {
    fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            generation: 0,
            fresh: None,
            published: false,
            inflight: None,
            tx,
        }
    }
}

struct CacheInner {
    repo: Arc<dyn GroupRepository>,
    policy: CachePolicy,
    slots: DashMap<CacheKey, Slot>,
}

/// Shared, cheaply clonable handle to the group-list cache.
#[derive(Clone)]
pub struct GroupCache {
    inner: Arc<CacheInner>,
}

impl GroupCache {
    pub fn new(repo: Arc<dyn GroupRepository>, policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                repo,
                policy,
                slots: DashMap::new(),
            }),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.inner.policy
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Return the list for `scope`, fetching it when missing or expired.
    pub async fn get(&self, scope: &Scope) -> ReadResult {
        let key = CacheKey::from(scope);
        let read = {
            let mut slot = self.inner.slots.entry(key.clone()).or_insert_with(Slot::new);

            if let Some(fresh) = &slot.fresh {
                if fresh.fetched_at.elapsed() < self.inner.policy.ttl {
                    trace!(?key, "cache hit");
                    return Ok(Arc::clone(&fresh.list));
                }
            }

            match slot.inflight.as_ref().and_then(WeakShared::upgrade) {
                Some(read) => {
                    trace!(?key, "joining in-flight read");
                    read
                }
                None => {
                    let read = self.start_read(scope.clone(), key.clone(), slot.generation);
                    slot.inflight = read.downgrade();
                    read
                }
            }
        };
        read.await
    }

    fn start_read(&self, scope: Scope, key: CacheKey, generation: u64) -> SharedRead {
        debug!(?key, generation, "fetching group list");
        let repo = Arc::clone(&self.inner.repo);
        let weak: Weak<CacheInner> = Arc::downgrade(&self.inner);

        async move {
            let result = repo.list(&scope, &ListQuery::default()).await;
            let inner = weak.upgrade();
            let mut slot = inner.as_ref().and_then(|inner| inner.slots.get_mut(&key));
            let current = slot.as_ref().is_some_and(|s| s.generation == generation);

            match result {
                Ok(groups) => {
                    let list: GroupList = Arc::new(groups.into_iter().map(Arc::new).collect());
                    if let (true, Some(slot)) = (current, slot.as_mut()) {
                        slot.fresh = Some(Fresh {
                            list: Arc::clone(&list),
                            fetched_at: Instant::now(),
                            refreshed_at: Utc::now(),
                        });
                        slot.inflight = None;
                        slot.published = true;
                        slot.tx.send_replace(Arc::clone(&list));
                    } else {
                        debug!(?key, generation, "discarding read from a stale generation");
                    }
                    Ok(list)
                }
                Err(err) => {
                    if let (true, Some(slot)) = (current, slot.as_mut()) {
                        slot.inflight = None;
                    }
                    Err(err)
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Last published list for `scope`, whether or not it is still fresh.
    /// Empty when the key was never fetched.
    pub fn snapshot(&self, scope: &Scope) -> GroupList {
        self.inner
            .slots
            .get(&CacheKey::from(scope))
            .map_or_else(|| Arc::new(Vec::new()), |slot| slot.tx.borrow().clone())
    }

    /// Last published list for `scope`, or `None` until a fetch succeeds.
    /// Unlike [`GroupCache::snapshot`], this tells an empty list apart from
    /// one that was never loaded.
    pub fn published(&self, scope: &Scope) -> Option<GroupList> {
        self.inner
            .slots
            .get(&CacheKey::from(scope))
            .filter(|slot| slot.published)
            .map(|slot| slot.tx.borrow().clone())
    }

    /// Wall-clock time of the last successful fetch for `scope`.
    pub fn last_refreshed(&self, scope: &Scope) -> Option<DateTime<Utc>> {
        self.inner
            .slots
            .get(&CacheKey::from(scope))
            .and_then(|slot| slot.fresh.as_ref().map(|f| f.refreshed_at))
    }

    /// `true` when a read for `scope` would be served without a request.
    pub fn is_fresh(&self, scope: &Scope) -> bool {
        self.inner
            .slots
            .get(&CacheKey::from(scope))
            .and_then(|slot| slot.fresh.as_ref().map(|f| f.fetched_at.elapsed()))
            .is_some_and(|age| age < self.inner.policy.ttl)
    }

    pub fn subscribe(&self, scope: &Scope) -> GroupStream {
        let slot = self
            .inner
            .slots
            .entry(CacheKey::from(scope))
            .or_insert_with(Slot::new);
        GroupStream::new(slot.tx.subscribe())
    }

    // ── Invalidation ─────────────────────────────────────────────────

    /// Mark `scope` stale. The next read goes to the network.
    pub fn invalidate(&self, scope: &Scope) {
        let key = CacheKey::from(scope);
        if let Some(mut slot) = self.inner.slots.get_mut(&key) {
            slot.generation += 1;
            slot.fresh = None;
            slot.inflight = None;
            debug!(?key, generation = slot.generation, "invalidated group list");
        }
    }

    /// Invalidate and refetch `scope`.
    pub async fn refresh(&self, scope: &Scope) -> ReadResult {
        self.invalidate(scope);
        self.get(scope).await
    }

    /// Invalidate every key.
    pub fn invalidate_all(&self) {
        for mut slot in self.inner.slots.iter_mut() {
            slot.generation += 1;
            slot.fresh = None;
            slot.inflight = None;
        }
        debug!("invalidated all group lists");
    }

    /// The operator returned to the console. Refetches only when the policy
    /// asks for it.
    pub fn focus_regained(&self) {
        if self.inner.policy.refetch_on_focus {
            self.invalidate_all();
        } else {
            trace!("focus regained; refetch disabled by policy");
        }
    }
}
