//! Command-line argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use property_admin::api::{Filters, SortField, SortOrder};
use property_admin::config::{ENV_API_URL, ENV_NONCE, ENV_PER_PAGE};
use property_admin::models::labels::normalize_state;
use property_admin::models::permissions::Role;
use property_admin::PropertyStatus;

#[derive(Parser)]
#[command(name = "property-admin")]
#[command(author, version, about = "Manage property listings through the WordPress REST API")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(Args, Clone, Debug)]
pub struct GlobalOpts {
    /// REST API base URL
    #[arg(long, global = true, env = ENV_API_URL)]
    pub api_url: Option<String>,

    /// Anti-forgery nonce sent with every request
    #[arg(long, global = true, env = ENV_NONCE, hide_env_values = true)]
    pub nonce: Option<String>,

    /// Page size for list views
    #[arg(long, global = true, env = ENV_PER_PAGE)]
    pub per_page: Option<u32>,

    /// WordPress role of the current user
    #[arg(long, global = true, env = "PROPERTY_ADMIN_ROLE", default_value = "administrator")]
    pub role: Role,

    /// WordPress user id of the current user
    #[arg(long, global = true, env = "PROPERTY_ADMIN_USER_ID", default_value_t = 0)]
    pub user_id: i64,

    /// Session name scoping the persisted selection
    #[arg(long, global = true, env = "PROPERTY_ADMIN_SESSION", default_value = "default")]
    pub session: String,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the CSV import template
    Template {
        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Import properties from a CSV file
    Import {
        file: PathBuf,

        /// Write rejected rows to this CSV report
        #[arg(long)]
        errors_report: Option<PathBuf>,
    },

    /// Export properties matching the filters to CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Directory for the export file
        #[arg(long, short = 'o', default_value = ".")]
        dir: PathBuf,

        /// Export only the selected properties of the given page
        #[arg(long)]
        selected: bool,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// List one page of properties
    List {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, value_enum, default_value_t = SortArg::Date)]
        sort_by: SortArg,

        #[arg(long, value_enum, default_value_t = OrderArg::Desc)]
        order: OrderArg,
    },

    /// Change the status of properties (default: the current selection)
    BulkStatus {
        #[arg(long)]
        status: PropertyStatus,

        ids: Vec<i64>,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Reassign properties to another patent (default: the current selection)
    BulkPatent {
        #[arg(long)]
        patent: String,

        ids: Vec<i64>,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Delete properties (default: the current selection)
    BulkDelete {
        ids: Vec<i64>,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Show or change the persisted selection
    #[command(subcommand)]
    Select(SelectCommands),

    /// List the distinct patents in use
    Patents,

    /// Download technical sheets for properties
    Sheets {
        ids: Vec<i64>,

        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Upload a file attachment and print its id
    Upload { file: PathBuf },
}

#[derive(Subcommand)]
pub enum SelectCommands {
    /// Add identifiers to the selection
    Add { ids: Vec<i64> },
    /// Remove identifiers from the selection
    Remove { ids: Vec<i64> },
    /// Flip identifiers in or out of the selection
    Toggle { ids: Vec<i64> },
    /// Replace the selection with exactly these identifiers
    Set { ids: Vec<i64> },
    /// Forget the selection
    Clear,
    /// Print the selection
    Show,
}

#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub status: Option<PropertyStatus>,

    /// State name or value (e.g. "Nuevo León" or nuevo_leon)
    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub patent: Option<String>,
}

impl FilterArgs {
    pub fn into_filters(self) -> Filters {
        Filters {
            search: self.search,
            status: self.status,
            state: self.state.map(|s| normalize_state(&s)),
            patent: self.patent,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortArg {
    Date,
    Title,
    Price,
    Status,
    Patent,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Date => SortField::Date,
            SortArg::Title => SortField::Title,
            SortArg::Price => SortField::Price,
            SortArg::Status => SortField::Status,
            SortArg::Patent => SortField::Patent,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}
