//! Host group and template group command handlers.
//!
//! Both collections share one handler; `kind` picks the collection.
//! Every write goes through the view's engines so the CLI sees the same
//! validation, cache invalidation and notifications as any other consumer.

use std::sync::Arc;

use tabled::Tabled;

use groupctl_core::{
    BulkAction, BulkOutcome, Console, Group, GroupId, GroupKind, GroupList, GroupPatch, GroupView,
    SettingsPatch,
};

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Members")]
    members: usize,
    #[tabled(rename = "Permissions")]
    permissions: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl GroupRow {
    fn new(g: &Group, color: bool) -> Self {
        Self {
            id: g.id.to_string(),
            name: g.name.clone(),
            size: output::size_badge(g.size_category(), color),
            members: g.member_count,
            permissions: permission_list(g),
            description: g.description.clone().unwrap_or_default(),
        }
    }
}

fn permission_list(g: &Group) -> String {
    g.permissions
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn detail(g: &Group, color: bool) -> String {
    let mut lines = vec![
        format!("ID:          {}", g.id),
        format!("Name:        {}", g.name),
        format!("Kind:        {}", g.kind),
        format!("Size:        {}", output::size_badge(g.size_category(), color)),
        format!("Members:     {}", g.member_count),
        format!(
            "Description: {}",
            g.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("-")
        ),
        format!("Permissions: {}", non_empty(&permission_list(g))),
    ];
    if !g.subgroups.is_empty() {
        lines.push(format!("Subgroups:   {}", g.subgroups.join(", ")));
    }
    if !g.members.is_empty() {
        lines.push(String::new());
        lines.push(format!("{}:", capitalize(g.kind.member_noun())));
        for m in &g.members {
            match m.name {
                Some(ref name) => lines.push(format!("  {}  {name}", m.id)),
                None => lines.push(format!("  {}", m.id)),
            }
        }
    }
    lines.join("\n")
}

fn non_empty(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    kind: GroupKind,
    args: GroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let view = console.view(kind);
    let result = run(&view, args.command, global).await;
    view.close();
    result
}

async fn run(
    view: &GroupView,
    command: GroupsCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kind = view.kind();
    let color = output::should_color(global.color);

    match command {
        GroupsCommand::List { search, size } => {
            let visible = view
                .visible(search.as_deref().unwrap_or(""), util::size_bucket(size))
                .await?;
            let out = output::render_list(
                global.output,
                &visible,
                |g| GroupRow::new(g, color),
                |g| g.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Show { group } => {
            let list = view.list().await?;
            let id = util::resolve_group(&list, kind, &group)?;
            let found = find(&list, &id, kind)?;
            print_group(&found, global, color)
        }

        GroupsCommand::Create {
            name,
            description,
            permissions,
            members,
        } => {
            let mut form = view.form();
            form.open_create();
            form.set_name(name);
            form.set_description(description);
            form.set_permissions(util::permissions(&permissions));
            form.set_members(util::members(&members));
            let created = form.submit().await?;
            print_group(&created, global, color)
        }

        GroupsCommand::Update {
            group,
            name,
            description,
            permissions,
        } => {
            let list = view.list().await?;
            let id = util::resolve_group(&list, kind, &group)?;
            let existing = find(&list, &id, kind)?;

            let mut form = view.form();
            form.open_edit(existing);
            if let Some(name) = name {
                form.set_name(name);
            }
            if description.is_some() {
                form.set_description(description);
            }
            if !permissions.is_empty() {
                form.set_permissions(util::permissions(&permissions));
            }
            let updated = form.submit().await?;
            print_group(&updated, global, color)
        }

        GroupsCommand::Delete { groups } => {
            let targets = select(view, &groups).await?;
            let prompt = format!("Delete {} {}(s)?", targets.len(), kind);
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            view.bulk().choose(BulkAction::Delete)?;
            view.bulk().confirm()?;
            let outcome = view.bulk().submit().await?;
            print_outcome(&outcome, global, color)
        }

        GroupsCommand::MassUpdate {
            groups,
            description,
            permissions,
        } => {
            let patch = GroupPatch {
                name: None,
                description,
                permissions: (!permissions.is_empty()).then(|| util::permissions(&permissions)),
            };
            select(view, &groups).await?;
            view.bulk().choose(BulkAction::Update(patch))?;
            let outcome = view.bulk().submit().await?;
            print_outcome(&outcome, global, color)
        }

        GroupsCommand::Clone { groups } => {
            select(view, &groups).await?;
            view.bulk().choose(BulkAction::Clone)?;
            let outcome = view.bulk().submit().await?;
            print_outcome(&outcome, global, color)
        }

        GroupsCommand::Merge { groups, name } => {
            let targets = select(view, &groups).await?;
            let prompt = format!(
                "Merge {} {}s into one and delete the originals?",
                targets.len(),
                kind
            );
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            view.bulk().choose(BulkAction::Merge { name })?;
            let outcome = view.bulk().submit().await?;
            print_outcome(&outcome, global, color)
        }

        GroupsCommand::Propagate {
            groups,
            permissions,
        } => {
            select(view, &groups).await?;
            let patch = SettingsPatch::new(util::permissions(&permissions));
            let count = view.propagation().propagate(&patch).await?;
            print_count(count, global);
            Ok(())
        }

        GroupsCommand::AddMembers { groups, members } => {
            let list = view.list().await?;
            let ids = util::resolve_groups(&list, kind, &groups)?;
            let count = view.add_members(&ids, &util::members(&members)).await?;
            print_count(count, global);
            Ok(())
        }

        GroupsCommand::RemoveMembers { groups, members } => {
            let list = view.list().await?;
            let ids = util::resolve_groups(&list, kind, &groups)?;
            let count = view.remove_members(&ids, &util::members(&members)).await?;
            print_count(count, global);
            Ok(())
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Load the list, resolve `identifiers`, and make them the selection.
async fn select(view: &GroupView, identifiers: &[String]) -> Result<Vec<GroupId>, CliError> {
    let list = view.list().await?;
    let ids = util::resolve_groups(&list, view.kind(), identifiers)?;
    view.selection().clear();
    view.selection().select_all(&ids);
    Ok(ids)
}

fn find(list: &GroupList, id: &GroupId, kind: GroupKind) -> Result<Arc<Group>, CliError> {
    list.iter()
        .find(|g| &g.id == id)
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: kind.to_string(),
            identifier: id.to_string(),
            list_command: format!("{} list", util::command_name(kind)),
        })
}

fn print_group(group: &Group, global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    let out = output::render_single(
        global.output,
        group,
        |g| detail(g, color),
        |g| g.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Groups a bulk action produced go to stdout; counts are already on
/// stderr via the notification sink.
fn print_outcome(outcome: &BulkOutcome, global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    let out = match outcome {
        BulkOutcome::Cloned { clones } => {
            let groups: Vec<&Group> = clones.iter().map(|c| &c.group).collect();
            output::render_list(
                global.output,
                &groups,
                |g| GroupRow::new(g, color),
                |g| g.id.to_string(),
            )?
        }
        BulkOutcome::Merged { group, .. } if global.output == OutputFormat::Table => {
            detail(group, color)
        }
        BulkOutcome::Merged { group, .. } if global.output == OutputFormat::Plain => {
            group.id.to_string()
        }
        BulkOutcome::Deleted { .. } | BulkOutcome::Updated { .. }
            if matches!(global.output, OutputFormat::Table | OutputFormat::Plain) =>
        {
            String::new()
        }
        other => output::render_single(global.output, other, |_| String::new(), |_| String::new())?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_count(count: usize, global: &GlobalOpts) {
    if global.output == OutputFormat::Plain {
        output::print_output(&count.to_string(), global.quiet);
    }
}
