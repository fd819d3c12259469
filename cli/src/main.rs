mod commands;
mod config;
mod logging;
mod menu_client;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use bistro_core::models::ProfileUpdate;

use crate::commands::{
    cmd_categories, cmd_logout, cmd_menu, cmd_onboard, cmd_profile_show, cmd_profile_update,
    cmd_status, open_service,
};
use crate::config::Config;
use crate::logging::{Verbosity, init_logging};
use crate::menu_client::HttpMenuClient;

#[derive(Parser)]
#[command(
    name = "bistro",
    version,
    about = "A local-first restaurant menu companion",
    long_about = "Browse the restaurant menu from a local cache.\n\n\
        The menu is downloaded once and kept on disk; searching and filtering \
        work offline afterwards. Logging out clears the cache."
)]
struct Cli {
    /// Directory for the menu cache and profile
    #[arg(long, global = true, env = "BISTRO_DATA_DIR", value_name = "PATH")]
    data_dir: Option<PathBuf>,
    /// URL of the menu document
    #[arg(long, global = true, env = "BISTRO_MENU_URL", value_name = "URL")]
    menu_url: Option<String>,
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create your profile (required before browsing)
    Onboard {
        /// First name (letters only)
        #[arg(long)]
        first_name: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the menu, optionally filtered by category and search term
    Menu {
        /// Category to include; repeat for several (case-insensitive)
        #[arg(short, long = "category", value_name = "CATEGORY")]
        categories: Vec<String>,
        /// Only dishes whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List menu categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Clear your profile and the cached menu
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show onboarding and cache status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the stored profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change profile fields; omitted fields are left as they are
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Phone number (10 digits); pass "" to remove
        #[arg(long)]
        phone: Option<String>,
        /// Profile image URI; pass "" to remove
        #[arg(long, value_name = "URI")]
        image: Option<String>,
        #[arg(long, value_name = "BOOL")]
        order_statuses: Option<bool>,
        #[arg(long, value_name = "BOOL")]
        password_changes: Option<bool>,
        #[arg(long, value_name = "BOOL")]
        special_offers: Option<bool>,
        #[arg(long, value_name = "BOOL")]
        newsletter: Option<bool>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(Verbosity::from_flags(cli.quiet, cli.verbose));

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.data_dir, cli.menu_url)?;
    let mut svc = open_service(&config)?;

    match cli.command {
        Commands::Onboard {
            first_name,
            email,
            json,
        } => cmd_onboard(&svc, &first_name, &email, json),
        Commands::Menu {
            categories,
            search,
            json,
        } => {
            let client = HttpMenuClient::new(&config)?;
            cmd_menu(&mut svc, &client, &categories, search.as_deref(), json).await
        }
        Commands::Categories { json } => {
            let client = HttpMenuClient::new(&config)?;
            cmd_categories(&mut svc, &client, json).await
        }
        Commands::Profile { command } => match command {
            ProfileCommands::Show { json } => cmd_profile_show(&svc, json),
            ProfileCommands::Update {
                first_name,
                email,
                phone,
                image,
                order_statuses,
                password_changes,
                special_offers,
                newsletter,
                json,
            } => cmd_profile_update(
                &svc,
                ProfileUpdate {
                    first_name,
                    email,
                    phone,
                    profile_image: image,
                    notifications: None,
                },
                commands::NotificationFlags {
                    order_statuses,
                    password_changes,
                    special_offers,
                    newsletter,
                },
                json,
            ),
        },
        Commands::Logout { json } => cmd_logout(&svc, json),
        Commands::Status { json } => cmd_status(&svc, &config, json),
    }
}
