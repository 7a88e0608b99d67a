//! Clap derive structures for the `groupctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// groupctl -- manage host groups and template groups from the command line
#[derive(Debug, Parser)]
#[command(
    name = "groupctl",
    version,
    about = "Manage host groups and template groups of a monitoring server",
    long_about = "Administer the host groups and template groups of a monitoring \
        server project.\n\n\
        Supports listing with search and size filters, create/update/delete, \
        and bulk actions: mass update, clone, merge, membership changes, and \
        permission propagation.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "GROUPCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "GROUPCTL_SERVER", global = true)]
    pub server: Option<String>,

    /// Project the groups belong to (overrides profile)
    #[arg(long, short = 'P', env = "GROUPCTL_PROJECT", global = true)]
    pub project: Option<String>,

    /// API token
    #[arg(long, env = "GROUPCTL_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GROUPCTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GROUPCTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "GROUPCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage host groups
    #[command(alias = "hg")]
    HostGroups(GroupsArgs),

    /// Manage template groups
    #[command(alias = "tg")]
    TemplateGroups(GroupsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GROUPS (shared by host-groups and template-groups)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Permission level granted to a user group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PermissionArg {
    Deny,
    Read,
    #[value(alias = "rw")]
    ReadWrite,
}

/// Size bucket filter for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SizeArg {
    #[default]
    All,
    /// No members
    Empty,
    /// 1-5 members
    Small,
    /// 6-15 members
    Medium,
    /// More than 15 members
    Large,
}

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List groups
    #[command(alias = "ls")]
    List {
        /// Case-insensitive substring of the name or description
        #[arg(long, short = 'f')]
        search: Option<String>,

        /// Only groups of this size
        #[arg(long, value_enum, default_value = "all")]
        size: SizeArg,
    },

    /// Show one group with its members
    #[command(alias = "get")]
    Show {
        /// Group ID or exact name
        group: String,
    },

    /// Create a new group
    Create {
        /// Group name
        #[arg(long)]
        name: String,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Permission to grant (repeatable)
        #[arg(long = "permission", value_enum)]
        permissions: Vec<PermissionArg>,

        /// Member ID to link (repeatable)
        #[arg(long = "member")]
        members: Vec<String>,
    },

    /// Update a single group
    Update {
        /// Group ID or exact name
        group: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description (empty string clears it)
        #[arg(long)]
        description: Option<String>,

        /// Replace permissions (repeatable)
        #[arg(long = "permission", value_enum)]
        permissions: Vec<PermissionArg>,
    },

    /// Delete groups
    #[command(alias = "rm")]
    Delete {
        /// Group IDs or exact names
        #[arg(required = true)]
        groups: Vec<String>,
    },

    /// Apply the same change to several groups
    MassUpdate {
        /// Group IDs or exact names
        #[arg(required = true)]
        groups: Vec<String>,

        /// New description (empty string clears it)
        #[arg(long)]
        description: Option<String>,

        /// Replace permissions (repeatable)
        #[arg(long = "permission", value_enum)]
        permissions: Vec<PermissionArg>,
    },

    /// Create a "-clone" copy of each group
    Clone {
        /// Group IDs or exact names
        #[arg(required = true)]
        groups: Vec<String>,
    },

    /// Merge groups into one new group and remove the originals
    Merge {
        /// Group IDs or exact names (at least two)
        #[arg(required = true, num_args = 2..)]
        groups: Vec<String>,

        /// Name of the merged group
        #[arg(long)]
        name: Option<String>,
    },

    /// Push permissions to groups and their subgroups
    Propagate {
        /// Group IDs or exact names
        #[arg(required = true)]
        groups: Vec<String>,

        /// Permission to propagate (repeatable)
        #[arg(long = "permission", value_enum, required = true)]
        permissions: Vec<PermissionArg>,
    },

    /// Link members to groups
    AddMembers {
        /// Group IDs or exact names
        #[arg(required = true)]
        groups: Vec<String>,

        /// Member ID to link (repeatable)
        #[arg(long = "member", required = true)]
        members: Vec<String>,
    },

    /// Unlink members from groups
    RemoveMembers {
        /// Group IDs or exact names
        #[arg(required = true)]
        groups: Vec<String>,

        /// Member ID to unlink (repeatable)
        #[arg(long = "member", required = true)]
        members: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (tokens masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a profile's API token in the system keyring
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
