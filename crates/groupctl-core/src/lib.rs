//! Group management engine between `groupctl-api` and its consumers.
//!
//! This crate owns the domain model and the client-side state for managing
//! host groups and template groups within a project:
//!
//! - **[`Console`]**: Entry facade. Holds the project [`ContextProvider`],
//!   the [`GroupClient`], and the shared [`GroupCache`], and vends one
//!   [`GroupView`] per group kind.
//!
//! - **[`GroupCache`]**: Read-through cache keyed by (kind, project), with
//!   a freshness window, in-flight read sharing, and watch-based
//!   subscriptions via [`GroupStream`].
//!
//! - **[`BulkActionEngine`]** / **[`PropagationEngine`]**: Selection-driven
//!   writes (delete, mass update, clone, merge, permission propagation)
//!   behind a per-view in-flight gate.
//!
//! - **[`GroupFormController`]**: Create/edit form state.
//!
//! - **Domain model** ([`model`]): [`Group`], [`GroupKind`], [`Permission`],
//!   [`GroupId`] and the write-side drafts and patches.

pub mod bulk;
pub mod cache;
pub mod client;
pub mod config;
pub mod console;
pub mod context;
pub mod convert;
pub mod error;
pub mod form;
pub mod gate;
pub mod model;
pub mod notify;
pub mod projection;
pub mod propagation;
pub mod repository;
pub mod selection;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bulk::{BulkAction, BulkActionEngine, BulkOutcome, BulkPhase, BulkRequest, ClonedGroup};
pub use cache::{CacheKey, GroupCache, GroupList, GroupStream};
pub use client::GroupClient;
pub use config::{AuthCredentials, CachePolicy, ConsoleConfig, TlsVerification};
pub use console::{Console, GroupView};
pub use context::ContextProvider;
pub use error::CoreError;
pub use form::{FormMode, GroupFormController};
pub use notify::{BroadcastSink, Notification, NotificationKind, NotificationSink, TracingSink};
pub use projection::SizeBucket;
pub use propagation::PropagationEngine;
pub use repository::{GroupRepository, HttpGroupRepository, ListQuery, Scope};
pub use selection::SelectionModel;

pub use model::{
    Group, GroupDraft, GroupId, GroupKind, GroupPatch, MemberRef, Permission, SettingsPatch,
    SizeCategory,
};
