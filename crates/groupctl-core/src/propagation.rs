// ── Propagation engine ──
//
// Pushes a permission-only patch onto every selected group (the service
// carries it down to their subgroups). Shares the view's in-flight gate
// with the bulk engine. Targets are the selection pruned against the last
// published list. Success clears the selection; failure keeps it.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::GroupCache;
use crate::client::GroupClient;
use crate::error::CoreError;
use crate::gate::InFlightGate;
use crate::model::{GroupKind, SettingsPatch};
use crate::notify::{Notification, NotificationSink};
use crate::selection::SelectionModel;

pub struct PropagationEngine {
    kind: GroupKind,
    client: GroupClient,
    cache: GroupCache,
    selection: Arc<SelectionModel>,
    sink: Arc<dyn NotificationSink>,
    gate: InFlightGate,
    cancel: CancellationToken,
}

impl PropagationEngine {
    pub(crate) fn new(
        kind: GroupKind,
        client: GroupClient,
        cache: GroupCache,
        selection: Arc<SelectionModel>,
        sink: Arc<dyn NotificationSink>,
        gate: InFlightGate,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            kind,
            client,
            cache,
            selection,
            sink,
            gate,
            cancel,
        }
    }

    /// Apply `patch` to the current selection. Returns the number of groups
    /// the patch was sent to.
    pub async fn propagate(&self, patch: &SettingsPatch) -> Result<usize, CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        let scope = self.client.scope(self.kind)?;
        if let Some(list) = self.cache.published(&scope) {
            let dropped = self.selection.retain_listed(&list);
            if !dropped.is_empty() {
                debug!(kind = %self.kind, count = dropped.len(), "dropped unlisted targets");
            }
        }
        if self.selection.is_empty() {
            return Err(CoreError::validation(
                "selection",
                "select at least one group to propagate to",
            ));
        }
        if patch.permissions.is_empty() {
            return Err(CoreError::validation(
                "permissions",
                "choose at least one permission to propagate",
            ));
        }
        let Some(_guard) = self.gate.try_acquire() else {
            return Err(CoreError::Busy);
        };

        let targets = self.selection.ids();
        match self.client.propagate(&scope, &targets, patch).await {
            Ok(count) => {
                self.cache.invalidate(&scope);
                self.selection.clear();
                let tags: Vec<&str> = patch.normalized().into_iter().map(|p| p.as_str()).collect();
                self.sink.notify(Notification::success(format!(
                    "Propagated {} to {count} {}(s)",
                    tags.join(", "),
                    self.kind
                )));
                info!(kind = %self.kind, count, "propagation succeeded");
                Ok(count)
            }
            Err(err) if err.is_local() => Err(err),
            Err(err) => {
                if matches!(err, CoreError::PartialFailure { .. }) {
                    self.cache.invalidate(&scope);
                }
                self.sink.notify(Notification::error(format!(
                    "Failed to propagate permissions: {err}"
                )));
                warn!(kind = %self.kind, error = %err, "propagation failed");
                Err(err)
            }
        }
    }
}
