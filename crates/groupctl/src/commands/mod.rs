//! Command dispatch: bridges CLI args -> console views -> output formatting.

pub mod config_cmd;
pub mod groups;
pub mod util;

use groupctl_core::{Console, GroupKind};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a console-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    console: &Console,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::HostGroups(args) => {
            groups::handle(console, GroupKind::HostGroup, args, global).await
        }
        Command::TemplateGroups(args) => {
            groups::handle(console, GroupKind::TemplateGroup, args, global).await
        }
        // Config and Completions never reach the console
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(_) => Ok(()),
    }
}
