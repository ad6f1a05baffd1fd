//! Clap derive structures for the `bambou` CLI.
//!
//! Resources are addressed by their REST category (`enterprises`,
//! `domains`, ...); `me` is the API root.

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// bambou -- talk to a Nuage VSD from the command line
#[derive(Debug, Parser)]
#[command(
    name = "bambou",
    version,
    about = "Fetch, create, update and watch Nuage VSD objects",
    long_about = "A generic client for the Nuage VSD REST API.\n\n\
        Every command authenticates against the API root (/me) first,\n\
        then works on objects addressed by category and ID.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "BAMBOU_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL, e.g. https://vsd:8443/nuage/api/v6 (overrides profile)
    #[arg(long, env = "BAMBOU_URL", global = true)]
    pub url: Option<String>,

    /// Username for password authentication (password from BAMBOU_PASSWORD)
    #[arg(long, short = 'u', env = "BAMBOU_USERNAME", global = true)]
    pub username: Option<String>,

    /// Organization to log into
    #[arg(long, env = "BAMBOU_ORGANIZATION", global = true)]
    pub organization: Option<String>,

    /// PEM file with client certificate and key (certificate authentication)
    #[arg(long, env = "BAMBOU_CERTIFICATE", global = true)]
    pub certificate: Option<PathBuf>,

    /// Output format [default: `defaults.output` from the config file, else json]
    #[arg(long, short = 'o', env = "BAMBOU_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates (lab VSDs only)
    #[arg(long, short = 'k', env = "BAMBOU_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "BAMBOU_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// The output format once flags and config have been merged.
    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Object IDs, one per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch one object (or the API root with `me`)
    #[command(alias = "get")]
    Fetch(FetchArgs),

    /// List the children of an object
    #[command(alias = "ls")]
    Children(ChildrenArgs),

    /// Create an object below a parent
    Create(CreateArgs),

    /// Update an object
    #[command(alias = "update")]
    Save(SaveArgs),

    /// Delete an object
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Replace the member list of a parent (e.g. users of a group)
    Assign(AssignArgs),

    /// Stream push notifications until interrupted
    Events(EventsArgs),

    /// Inspect and edit CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Object references ────────────────────────────────────────────────

/// `CATEGORY/ID`, or `me` for the API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub category: String,
    pub id: Option<String>,
}

impl ObjectRef {
    pub fn is_root(&self) -> bool {
        self.id.is_none()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(ref id) => write!(f, "{}/{id}", self.category),
            None => f.write_str(&self.category),
        }
    }
}

/// Parse `CATEGORY/ID` or `me`.
pub fn parse_object_ref(s: &str) -> Result<ObjectRef, String> {
    if s == "me" {
        return Ok(ObjectRef {
            category: "me".into(),
            id: None,
        });
    }

    match s.split_once('/') {
        Some((category, id)) if !category.is_empty() && !id.is_empty() && !id.contains('/') => {
            Ok(ObjectRef {
                category: category.into(),
                id: Some(id.into()),
            })
        }
        _ => Err(format!("expected CATEGORY/ID or 'me', got '{s}'")),
    }
}

// ── Resource commands ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Object to fetch: CATEGORY/ID or `me`
    #[arg(value_parser = parse_object_ref)]
    pub object: ObjectRef,
}

#[derive(Debug, Args)]
pub struct ChildrenArgs {
    /// Child category to list (e.g. `domains`)
    pub category: String,

    /// Parent object: CATEGORY/ID or `me`
    #[arg(long, default_value = "me", value_parser = parse_object_ref)]
    pub parent: ObjectRef,

    /// Server-side filter expression (e.g. `name == "web"`)
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Attribute to order by
    #[arg(long)]
    pub order_by: Option<String>,

    /// Zero-based page index
    #[arg(long)]
    pub page: Option<u32>,

    /// Objects per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Group results by these attributes
    #[arg(long, value_delimiter = ',')]
    pub group_by: Vec<String>,

    /// Print the server's total count on stderr
    #[arg(long)]
    pub count: bool,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Category of the new object (e.g. `domains`)
    pub category: String,

    /// Object attributes as JSON, or @FILE to read them from a file
    #[arg(long, short = 'd')]
    pub data: String,

    /// Parent object: CATEGORY/ID or `me`
    #[arg(long, default_value = "me", value_parser = parse_object_ref)]
    pub parent: ObjectRef,
}

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Object to update: CATEGORY/ID
    #[arg(value_parser = parse_object_ref)]
    pub object: ObjectRef,

    /// Attributes to change as JSON, or @FILE to read them from a file
    #[arg(long, short = 'd')]
    pub data: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Object to delete: CATEGORY/ID
    #[arg(value_parser = parse_object_ref)]
    pub object: ObjectRef,
}

#[derive(Debug, Args)]
pub struct AssignArgs {
    /// Category of the assigned objects (e.g. `users`)
    pub category: String,

    /// IDs making up the new member list (none clears it)
    pub ids: Vec<String>,

    /// Parent object: CATEGORY/ID
    #[arg(long, value_parser = parse_object_ref)]
    pub parent: ObjectRef,
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Only show events for these entity types (repeatable)
    #[arg(long, short = 't')]
    pub entity_type: Vec<String>,

    /// Exit after this many events
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,

    /// Write a profile from --url/--username/--organization/--certificate/--insecure
    Init(ConfigInitArgs),

    /// Store a profile password in the system keyring (read from stdin)
    SetPassword(SetPasswordArgs),
}

#[derive(Debug, Args)]
pub struct ConfigInitArgs {
    /// Profile name [default: --profile, else the default profile]
    pub name: Option<String>,

    /// Make this the default profile
    #[arg(long)]
    pub default: bool,
}

#[derive(Debug, Args)]
pub struct SetPasswordArgs {
    /// Profile name [default: --profile, else the default profile]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
