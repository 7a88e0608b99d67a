// ── Project context ──
//
// Holds the project every repository call is scoped to. Reads are
// wait-free through `ArcSwapOption`; changes are broadcast on a `watch`
// channel so long-lived consumers can react to a project switch.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::watch;
use tracing::info;

use crate::error::CoreError;

/// Current server/project selection.
pub struct ContextProvider {
    current: ArcSwapOption<String>,
    tx: watch::Sender<Option<Arc<String>>>,
}

impl ContextProvider {
    pub fn new(initial: Option<String>) -> Self {
        let initial: Option<Arc<String>> = initial.map(Arc::new);
        let (tx, _) = watch::channel(initial.clone());
        Self {
            current: ArcSwapOption::new(initial),
            tx,
        }
    }

    /// The selected project, if any.
    pub fn current(&self) -> Option<Arc<String>> {
        self.current.load_full()
    }

    /// The selected project, or `NoContext`.
    pub fn require(&self) -> Result<Arc<String>, CoreError> {
        self.current().ok_or(CoreError::NoContext)
    }

    /// Switch projects. `None` clears the context.
    pub fn set(&self, project: Option<String>) {
        let next: Option<Arc<String>> = project.map(Arc::new);
        info!(
            project = next.as_deref().map_or("<none>", String::as_str),
            "project context changed"
        );
        self.current.store(next.clone());
        self.tx.send_replace(next);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<String>>> {
        self.tx.subscribe()
    }
}

impl Default for ContextProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_fails_closed() {
        let ctx = ContextProvider::default();
        assert!(matches!(ctx.require(), Err(CoreError::NoContext)));
    }

    #[test]
    fn set_is_observable() {
        let ctx = ContextProvider::new(Some("prod".into()));
        let rx = ctx.subscribe();
        ctx.set(Some("staging".into()));
        assert_eq!(ctx.require().unwrap().as_str(), "staging");
        assert_eq!(rx.borrow().as_deref().map(String::as_str), Some("staging"));
        ctx.set(None);
        assert!(ctx.current().is_none());
    }
}
