//! Clap derive structures for the `devtrack` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// devtrack -- kubectl-style CLI for deviation tracking
#[derive(Debug, Parser)]
#[command(
    name = "devtrack",
    version,
    about = "Track and manage deviations from the command line",
    long_about = "Administrative client for deviation records (issues and incidents\n\
        with status, priority, assignment and due dates) stored behind the\n\
        devtrack REST backend.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "DEVTRACK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "DEVTRACK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DEVTRACK_OUTPUT",
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "DEVTRACK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "DEVTRACK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Domain value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Open,
    InProgress,
    UnderReview,
    Closed,
    Rejected,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortOrderArg {
    Asc,
    Desc,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List deviations
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one deviation
    Get {
        /// Deviation id
        id: String,
    },

    /// Create a deviation
    #[command(alias = "new")]
    Create(CreateArgs),

    /// Update fields of a deviation
    #[command(alias = "edit")]
    Update(UpdateArgs),

    /// Delete a deviation
    #[command(alias = "rm")]
    Delete {
        /// Deviation id
        id: String,
    },

    /// Show server-side deviation statistics
    Stats,

    /// Read-only public view of one deviation
    View {
        /// Deviation id
        id: String,
    },

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── List ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u32>,

    /// Records per page (defaults to the profile's page size)
    #[arg(long, short = 'l')]
    pub page_size: Option<u32>,

    /// Field to sort by (server-side)
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort direction
    #[arg(long)]
    pub sort_order: Option<SortOrderArg>,

    /// Only show deviations with this status
    #[arg(long, short = 's')]
    pub status: Option<StatusArg>,

    /// Only show deviations with this priority
    #[arg(long)]
    pub priority: Option<PriorityArg>,

    /// Case-insensitive search over title and description
    #[arg(long, short = 'f')]
    pub search: Option<String>,

    /// Append status and priority counts
    #[arg(long)]
    pub summary: bool,
}

// ── Create / Update ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Short title (3-200 characters)
    #[arg(long, short = 't', required_unless_present = "from_file")]
    pub title: Option<String>,

    /// Full description (at least 10 characters)
    #[arg(long, short = 'd', required_unless_present = "from_file")]
    pub description: Option<String>,

    /// Priority
    #[arg(long, default_value = "medium")]
    pub priority: PriorityArg,

    /// Category
    #[arg(long, short = 'c', required_unless_present = "from_file")]
    pub category: Option<String>,

    /// Assignee
    #[arg(long)]
    pub assigned_to: Option<String>,

    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub due_date: Option<String>,

    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Read the create payload from a JSON file
    #[arg(
        long,
        short = 'F',
        conflicts_with_all = ["title", "description", "category", "assigned_to", "due_date", "tags"]
    )]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Deviation id
    pub id: String,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub status: Option<StatusArg>,

    #[arg(long)]
    pub priority: Option<PriorityArg>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Assignee (empty string unassigns)
    #[arg(long)]
    pub assigned_to: Option<String>,

    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub due_date: Option<String>,

    /// Replace tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Option<Vec<String>>,

    /// Read the update payload from a JSON file
    #[arg(
        long,
        short = 'F',
        conflicts_with_all = [
            "title", "description", "status", "priority", "category",
            "assigned_to", "due_date", "tags",
        ]
    )]
    pub from_file: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display the resolved configuration
    Show,

    /// Print the configuration file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
