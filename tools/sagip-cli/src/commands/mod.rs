//! CLI command implementations.

pub mod account;
pub mod centers;
pub mod config;
pub mod hazards;
pub mod logs;
pub mod routes;

use clap::{Args, Subcommand};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Account email (prompted when missing).
    #[arg(short, long)]
    pub email: Option<String>,

    /// Account password (prompted when missing).
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Arguments for the register command.
#[derive(Args)]
pub struct RegisterArgs {
    /// Account email.
    #[arg(short, long)]
    pub email: String,

    /// Given name.
    #[arg(long)]
    pub first_name: String,

    /// Family name.
    #[arg(long)]
    pub last_name: String,

    /// Backend role code, e.g. CITIZEN or EVAC_CENTER_STAFF.
    #[arg(long)]
    pub role: Option<String>,

    /// Contact number.
    #[arg(long)]
    pub contact: Option<String>,

    /// Municipality ID.
    #[arg(long)]
    pub municipality: Option<u64>,

    /// Password (prompted when missing).
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Arguments for the whoami command.
#[derive(Args)]
pub struct WhoamiArgs {
    /// Only show the stored session, without contacting the server.
    #[arg(long)]
    pub local: bool,
}

/// Arguments for the navigate command.
#[derive(Args)]
pub struct NavigateArgs {
    /// Path to navigate to.
    pub path: String,
}

/// Arguments for the centers command.
#[derive(Args)]
pub struct CentersArgs {
    #[command(subcommand)]
    pub command: Option<CentersCommand>,

    /// List centers registered on the server instead of the demo set.
    #[arg(long)]
    pub remote: bool,
}

#[derive(Subcommand)]
pub enum CentersCommand {
    /// List centers.
    List,
    /// Show one center.
    Show {
        /// Center ID.
        id: u64,
    },
    /// Forecast congestion at a center.
    Risk {
        /// Center ID.
        id: u64,

        /// Look-back window in minutes.
        #[arg(long)]
        window: Option<u32>,

        /// Forecast horizon in minutes.
        #[arg(long)]
        horizon: Option<u32>,
    },
}

/// Arguments for the logs command.
#[derive(Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommand,
}

#[derive(Subcommand)]
pub enum LogsCommand {
    /// List evacuation logs.
    List {
        /// Only logs of this center.
        #[arg(long)]
        center: Option<u64>,

        /// Sort field, e.g. -date_recorded.
        #[arg(long)]
        ordering: Option<String>,

        /// Result page.
        #[arg(long)]
        page: Option<u32>,
    },
    /// Record a head count.
    Create {
        /// Center ID.
        #[arg(long)]
        center: u64,

        /// Families arriving.
        #[arg(long, default_value = "0")]
        families_in: u32,

        /// Individuals arriving.
        #[arg(long, default_value = "0")]
        individuals_in: u32,

        /// Families leaving.
        #[arg(long, default_value = "0")]
        families_out: u32,

        /// Individuals leaving.
        #[arg(long, default_value = "0")]
        individuals_out: u32,

        /// Vulnerable individuals among arrivals.
        #[arg(long, default_value = "0")]
        vulnerable: u32,

        /// Free-form remarks.
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Delete a log.
    Delete {
        /// Log ID.
        id: u64,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Per-staff totals.
    Summary,
    /// Most recent log of a center.
    Latest {
        /// Center ID.
        center: u64,
    },
}

/// Arguments for the hazards command.
#[derive(Args)]
pub struct HazardsArgs {
    #[command(subcommand)]
    pub command: HazardsCommand,
}

#[derive(Subcommand)]
pub enum HazardsCommand {
    /// List hazard types.
    Types,
    /// Report a hazard.
    Report {
        /// Hazard type, e.g. flood or road-damage.
        #[arg(short = 't', long = "type")]
        hazard_type: String,

        /// Short title.
        #[arg(long)]
        title: String,

        /// Latitude.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude.
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// low, medium, high or critical.
        #[arg(short, long, default_value = "medium")]
        severity: String,

        /// Longer description.
        #[arg(short, long)]
        description: Option<String>,

        /// Street address or landmark.
        #[arg(short, long)]
        address: Option<String>,

        /// Municipality ID; the reporter's own when unset.
        #[arg(long)]
        municipality: Option<u64>,

        /// Contact name.
        #[arg(long)]
        contact_name: Option<String>,

        /// Contact phone.
        #[arg(long)]
        contact_phone: Option<String>,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Get a config value.
    Get {
        /// Config key (dot-separated).
        key: String,
    },
    /// Set a config value.
    Set {
        /// Config key (dot-separated).
        key: String,
        /// Value to set.
        value: String,
    },
    /// Create a sagip.toml in the current directory.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,

        /// API base URL to write.
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Validate configuration.
    Validate,
}
