// ── Group domain model ──
//
// Canonical representation of host groups and template groups. Both kinds
// share one `Group` type; `GroupKind` records which collection it came from.

pub mod draft;
pub mod group;
pub mod group_id;

// ── Re-exports ──────────────────────────────────────────────────────

pub use draft::{GroupDraft, GroupPatch, SettingsPatch};
pub use group::{Group, GroupKind, MemberRef, Permission, SizeCategory};
pub use group_id::GroupId;
