//! Clap derive structures for the `cybertrap` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! workspace crates so `build.rs` can include it for man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cybertrap -- manage scan targets, nuclei templates and scans
#[derive(Debug, Parser)]
#[command(
    name = "cybertrap",
    version,
    about = "Manage security scan targets, templates and scans from the command line",
    long_about = "Command-line client for the CyberTrap scan-management backend.\n\n\
        Register target domains, browse scan templates, start scans right away\n\
        or schedule them for a later date, and inspect results.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "CYBERTRAP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, env = "CYBERTRAP_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides profile and keyring)
    #[arg(long, env = "CYBERTRAP_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CYBERTRAP_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CYBERTRAP_TIMEOUT", global = true)]
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
    /// Manage scan target domains
    #[command(alias = "d", alias = "targets")]
    Domains(DomainsArgs),

    /// Browse scan templates
    #[command(alias = "t")]
    Templates(TemplatesArgs),

    /// List, inspect and start scans
    #[command(alias = "s")]
    Scans(ScansArgs),

    /// Manage scheduled scans
    #[command(alias = "sched")]
    Schedule(ScheduleArgs),

    /// Log in through the hosted identity provider and store the token
    Login(LoginArgs),

    /// Remove the stored token for the active profile
    Logout,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Sorting and pagination shared by every list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Field to sort by (see each command's help for field names)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page to show (1-based)
    #[arg(long, default_value = "1", conflicts_with = "all")]
    pub page: usize,

    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Show every row instead of one page
    #[arg(long, short = 'a')]
    pub all: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DOMAINS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DomainsArgs {
    #[command(subcommand)]
    pub command: DomainsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DomainsCommand {
    /// List registered domains (sort fields: domain, uploaded-at, owner)
    #[command(alias = "ls")]
    List {
        /// Only domains whose name contains this text
        #[arg(long)]
        filter_domain: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Register a single domain
    Add {
        /// Hostname, e.g. example.com
        name: String,
    },

    /// Delete a domain
    #[command(alias = "rm")]
    Delete {
        /// Domain ID or hostname
        domain: String,
    },

    /// Upload a newline-delimited text file of domains
    Upload {
        /// Path to a .txt file with one hostname per line
        file: PathBuf,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TEMPLATES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommand,
}

#[derive(Debug, Subcommand)]
pub enum TemplatesCommand {
    /// List templates (sort fields: name, template-id, type, description, created-at)
    #[command(alias = "ls")]
    List {
        /// Only templates whose name contains this text
        #[arg(long)]
        filter_name: Option<String>,

        /// Only templates of exactly this type
        #[arg(long)]
        filter_type: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SCANS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ScansArgs {
    #[command(subcommand)]
    pub command: ScansCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScansCommand {
    /// List scans (sort fields: domain, template, status, date)
    #[command(alias = "ls")]
    List {
        /// Only scans whose domain contains this text
        #[arg(long)]
        domain: Option<String>,

        /// Only scans that ran a template id containing this text
        #[arg(long)]
        template: Option<String>,

        /// Only scans with exactly this status
        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Show one scan with its result URLs
    Get {
        /// Scan ID
        id: String,
    },

    /// List multi-scan summaries (sort fields: name, status, date, total)
    Multi {
        /// Only groups with exactly this status
        #[arg(long)]
        status: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Start scans now
    Start(ScanTargetArgs),
}

/// Domain and template selection for `scans start`.
#[derive(Debug, Args)]
pub struct ScanTargetArgs {
    /// Domain ID or hostname (repeatable)
    #[arg(long = "domain", required_unless_present = "all_domains")]
    pub domains: Vec<String>,

    /// Scan every registered domain with every template
    #[arg(long, conflicts_with_all = ["domains", "templates", "all_templates"])]
    pub all_domains: bool,

    /// Template ID (repeatable)
    #[arg(long = "template", required_unless_present_any = ["all_domains", "all_templates"])]
    pub templates: Vec<String>,

    /// Run every template
    #[arg(long, conflicts_with = "templates")]
    pub all_templates: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SCHEDULE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    /// List scheduled scans (sort fields: domain, template, date)
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Schedule a scan for a future date
    Create {
        /// Domain ID or hostname
        #[arg(long, required_unless_present = "all_domains")]
        domain: Option<String>,

        /// Schedule a scan of every domain with every template
        #[arg(long, conflicts_with_all = ["domain", "templates", "all_templates"])]
        all_domains: bool,

        /// Template ID (repeatable)
        #[arg(long = "template", required_unless_present_any = ["all_domains", "all_templates"])]
        templates: Vec<String>,

        /// Run every template
        #[arg(long, conflicts_with = "templates")]
        all_templates: bool,

        /// Date to run the scan, YYYY-MM-DD
        #[arg(long)]
        date: String,
    },

    /// Delete a scheduled scan
    #[command(alias = "rm")]
    Delete {
        /// Scheduled scan ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Authorization code from the redirect (prompted for when omitted)
    #[arg(long)]
    pub code: Option<String>,
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

    /// Display current configuration (secrets masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Key: api_url, token, token_env, timeout, oauth.domain,
        /// oauth.client_id, oauth.client_secret, oauth.redirect_uri
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a token for the active profile in the system keyring
    SetToken,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
