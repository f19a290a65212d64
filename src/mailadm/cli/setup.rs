use clap::{Args, Parser, Subcommand};
use mailadm::model::{BroadcastStatus, Quota, Role};
use std::path::PathBuf;

/// Returns the version string, with the git hash appended for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234" otherwise
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("MAILADM_GIT_HASH");
    const IS_RELEASE: &str = env!("MAILADM_IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{}", VERSION, GIT_HASH)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "mailadm", bin_name = "mailadm", version = get_version())]
#[command(about = "Manage email-hosting domains, mailboxes, users and broadcasts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding dataset.json and config.json
    #[arg(long, global = true, env = "MAILADM_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Search, filter, sort and paging options shared by every listing.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Case-insensitive text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Column filter, repeatable (e.g. --filter status=Active)
    #[arg(short, long = "filter", value_name = "COLUMN=VALUE")]
    pub filters: Vec<String>,

    /// Column to sort by
    #[arg(long, value_name = "COLUMN")]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (defaults to the page_size setting)
    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage hosted domains
    #[command(subcommand, alias = "d", display_order = 1)]
    Domains(DomainCommands),

    /// Manage mailboxes
    #[command(subcommand, alias = "m", display_order = 2)]
    Mailboxes(MailboxCommands),

    /// Manage team members
    #[command(subcommand, alias = "u", display_order = 3)]
    Users(UserCommands),

    /// Manage email campaigns
    #[command(subcommand, alias = "b", display_order = 4)]
    Broadcasts(BroadcastCommands),

    /// Usage reports and the activity log
    #[command(subcommand, alias = "r", display_order = 5)]
    Reports(ReportCommands),

    /// Overview of the whole account
    #[command(display_order = 6)]
    Dashboard,

    /// Create the data directory with sample data
    #[command(display_order = 10)]
    Init,

    /// Replace all data with the sample dataset
    #[command(display_order = 11)]
    Reset {
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Get or set configuration
    #[command(display_order = 12)]
    Config {
        /// Configuration key (e.g., page_size)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DomainCommands {
    /// List domains
    #[command(alias = "ls")]
    List(ListArgs),

    /// Register a domain (starts as Pending DNS)
    Add { name: String },

    /// Delete domains
    #[command(alias = "rm")]
    Remove {
        /// Ids or names (e.g. 1 3-4 example.com)
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Suspend or reactivate domains
    Toggle {
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Verify a domain's DNS records
    Verify { selector: String },

    /// Show the DNS records a domain needs
    Dns { selector: String },

    /// Domain counts by status
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum MailboxCommands {
    /// List mailboxes
    #[command(alias = "ls")]
    List(ListArgs),

    /// Create a mailbox
    Add {
        /// Local part of the address
        username: String,

        /// Domain the mailbox lives on
        domain: String,

        /// Storage quota in GB, or "unlimited"
        #[arg(long, short, default_value = "5")]
        quota: Quota,
    },

    /// Change a mailbox's storage quota
    Quota {
        /// Id or email address
        selector: String,

        /// Storage quota in GB, or "unlimited"
        quota: Quota,
    },

    /// Delete mailboxes
    #[command(alias = "rm")]
    Remove {
        /// Ids or email addresses
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Suspend or reactivate mailboxes
    Toggle {
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Mailbox counts and storage totals
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List team members
    #[command(alias = "ls")]
    List(ListArgs),

    /// Invite a team member
    Add {
        name: String,
        email: String,

        /// Owner, Admin or Member
        #[arg(long, short, default_value = "Member")]
        role: Role,
    },

    /// Change a team member's name, email or role
    Edit {
        /// Id or email address
        selector: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, short)]
        role: Option<Role>,
    },

    /// Remove team members
    #[command(alias = "rm")]
    Remove {
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Suspend or reactivate team members
    Toggle {
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Team counts by role and status
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum BroadcastCommands {
    /// List campaigns
    #[command(alias = "ls")]
    List(ListArgs),

    /// Create a campaign
    Add {
        name: String,

        /// Sent, Draft or Scheduled
        #[arg(long, short, default_value = "Draft")]
        status: BroadcastStatus,
    },

    /// Rename a campaign or change its status
    Edit {
        /// Id or campaign name
        selector: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, short)]
        status: Option<BroadcastStatus>,
    },

    /// Delete campaigns
    #[command(alias = "rm")]
    Remove {
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Headline totals
    Summary,

    /// Storage usage per domain
    Usage(ListArgs),

    /// Users with the most storage
    Top(ListArgs),

    /// Account activity log
    Activity(ListArgs),

    /// Export the full report as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}
