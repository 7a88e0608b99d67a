//! Shared helpers for command handlers.

use std::io::IsTerminal;

use groupctl_core::{GroupId, GroupKind, GroupList, MemberRef, Permission, SizeBucket};

use crate::cli::{PermissionArg, SizeArg};
use crate::error::CliError;

/// `host-groups` / `template-groups`, for help text.
pub fn command_name(kind: GroupKind) -> &'static str {
    match kind {
        GroupKind::HostGroup => "host-groups",
        GroupKind::TemplateGroup => "template-groups",
    }
}

/// Resolve one identifier (ID or exact name) against a loaded list.
pub fn resolve_group(
    list: &GroupList,
    kind: GroupKind,
    identifier: &str,
) -> Result<GroupId, CliError> {
    list.iter()
        .find(|g| g.id.as_str() == identifier)
        .or_else(|| list.iter().find(|g| g.name == identifier))
        .map(|g| g.id.clone())
        .ok_or_else(|| CliError::NotFound {
            resource_type: kind.to_string(),
            identifier: identifier.into(),
            list_command: format!("{} list", command_name(kind)),
        })
}

/// Resolve every identifier, keeping order and dropping repeats.
pub fn resolve_groups(
    list: &GroupList,
    kind: GroupKind,
    identifiers: &[String],
) -> Result<Vec<GroupId>, CliError> {
    let mut ids = Vec::with_capacity(identifiers.len());
    for identifier in identifiers {
        let id = resolve_group(list, kind, identifier)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

pub fn permissions(args: &[PermissionArg]) -> Vec<Permission> {
    args.iter()
        .map(|p| match p {
            PermissionArg::Deny => Permission::Deny,
            PermissionArg::Read => Permission::Read,
            PermissionArg::ReadWrite => Permission::ReadWrite,
        })
        .collect()
}

pub fn members(ids: &[String]) -> Vec<MemberRef> {
    ids.iter().map(MemberRef::new).collect()
}

pub fn size_bucket(arg: SizeArg) -> SizeBucket {
    match arg {
        SizeArg::All => SizeBucket::All,
        SizeArg::Empty => SizeBucket::Empty,
        SizeArg::Small => SizeBucket::Small,
        SizeArg::Medium => SizeBucket::Medium,
        SizeArg::Large => SizeBucket::Large,
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, refuses instead of blocking.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer failure onto an IO error.
pub fn prompt_err(err: dialoguer::Error) -> CliError {
    match err {
        dialoguer::Error::IO(io) => CliError::Io(io),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use groupctl_core::Group;

    use super::*;

    fn list() -> GroupList {
        let group = |id: &str, name: &str| {
            Arc::new(Group {
                id: GroupId::new(id),
                kind: GroupKind::HostGroup,
                name: name.into(),
                description: None,
                members: Vec::new(),
                member_count: 0,
                subgroups: Vec::new(),
                permissions: Vec::new(),
            })
        };
        Arc::new(vec![group("2", "Linux servers"), group("5", "2")])
    }

    #[test]
    fn ids_win_over_names() {
        let id = resolve_group(&list(), GroupKind::HostGroup, "2").unwrap();
        assert_eq!(id.as_str(), "2");
        let id = resolve_group(&list(), GroupKind::HostGroup, "Linux servers").unwrap();
        assert_eq!(id.as_str(), "2");
    }

    #[test]
    fn repeated_identifiers_collapse() {
        let ids = resolve_groups(
            &list(),
            GroupKind::HostGroup,
            &["Linux servers".into(), "2".into(), "5".into()],
        )
        .unwrap();
        assert_eq!(ids, vec![GroupId::new("2"), GroupId::new("5")]);
    }

    #[test]
    fn unknown_identifier_points_at_list_command() {
        let err = resolve_group(&list(), GroupKind::TemplateGroup, "nope").unwrap_err();
        let CliError::NotFound { list_command, .. } = err else {
            panic!("expected not found");
        };
        assert_eq!(list_command, "template-groups list");
    }
}
