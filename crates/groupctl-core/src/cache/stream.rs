// ── Reactive group-list streams ──
//
// Subscription handle for one cache key: point-in-time snapshot plus
// change notification, or a `Stream` via `into_stream`.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::GroupList;

/// A subscription to the cached list of one (kind, project) key.
pub struct GroupStream {
    current: GroupList,
    receiver: watch::Receiver<GroupList>,
}

impl GroupStream {
    pub(crate) fn new(receiver: watch::Receiver<GroupList>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &GroupList {
        &self.current
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> GroupList {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published list. `None` once the cache is dropped.
    pub async fn changed(&mut self) -> Option<GroupList> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    pub fn into_stream(self) -> GroupWatchStream {
        GroupWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding each published snapshot.
pub struct GroupWatchStream {
    inner: WatchStream<GroupList>,
}

impl Stream for GroupWatchStream {
    type Item = GroupList;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
