//! Command-line surface.
//!
//! Each subcommand is a view of the dashboard. A run initializes the session,
//! navigates to the view through the route guard, performs the requested
//! action and prints the resulting screen.
//!
//! ```bash
//! stockdesk companies list
//! stockdesk companies create --name Acme --sector Tech --country USA
//! stockdesk stock-markets update 42 --open 15
//! STOCKDESK_IDENTITY__USERNAME=client stockdesk home
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::guard::View;
use crate::models::ResourceId;

#[derive(Debug, Parser)]
#[command(
    name = "stockdesk",
    author,
    version,
    about = "Companies and stock market records behind a Keycloak login"
)]
pub struct Cli {
    /// Configuration file; missing files fall back to defaults and environment.
    #[arg(
        long,
        global = true,
        env = "STOCKDESK_CONFIG",
        default_value = "config.yaml"
    )]
    pub config: PathBuf,

    /// Disable colored output.
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show who is signed in.
    Home,
    /// Sign in with the configured credentials.
    Login,
    /// End the session, locally and at the identity provider.
    Logout,
    /// Print the account registration link.
    Register,
    /// Manage companies.
    #[command(subcommand)]
    Companies(CompanyCommand),
    /// Manage stock market records.
    #[command(subcommand)]
    StockMarkets(StockCommand),
    /// Administrator dashboard.
    Admin,
    /// Print the configuration JSON schema.
    Schema,
}

#[derive(Debug, Subcommand)]
pub enum CompanyCommand {
    List,
    Show {
        /// Company id, as typed.
        id: String,
    },
    Create(CompanyFields),
    Update {
        id: ResourceId,
        #[command(flatten)]
        fields: CompanyFields,
    },
    Delete {
        /// Company id, as typed.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

/// Company form fields. Omitted fields keep their current value.
#[derive(Debug, Default, Args)]
pub struct CompanyFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub sector: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum StockCommand {
    List {
        /// Only records of this company.
        #[arg(long)]
        company: Option<ResourceId>,
    },
    Create(StockFields),
    Update {
        id: ResourceId,
        #[command(flatten)]
        fields: StockFields,
    },
    Delete {
        /// Record id, as typed.
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
}

/// Stock form fields. Omitted fields keep their current value.
#[derive(Debug, Default, Args)]
pub struct StockFields {
    /// Trading day, YYYY-MM-DD.
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long = "open")]
    pub open_value: Option<String>,
    #[arg(long = "close")]
    pub close_value: Option<String>,
    /// Leave empty to clear.
    #[arg(long)]
    pub volume: Option<String>,
    #[arg(long = "company")]
    pub company_id: Option<String>,
}

impl Command {
    /// The view this command lands on, if it is a view at all.
    pub fn view(&self) -> Option<View> {
        match self {
            Command::Home | Command::Logout | Command::Register => Some(View::Home),
            Command::Login => Some(View::Login),
            Command::Companies(_) => Some(View::Companies),
            Command::StockMarkets(_) => Some(View::StockMarkets),
            Command::Admin => Some(View::Admin),
            Command::Schema => None,
        }
    }
}
