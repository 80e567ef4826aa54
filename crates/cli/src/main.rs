//! Slick CLI - Database migrations and back-office bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Apply the schema
//! slick-cli migrate
//!
//! # Promote an existing account (default role: super_admin)
//! slick-cli admin grant -e owner@slick.ph
//! slick-cli admin grant -e staff@slick.ph -r moderator
//!
//! # Promote the oldest account
//! slick-cli admin grant-first
//!
//! # Create an account and make it an admin in one go
//! slick-cli admin create -e owner@slick.ph -p 'long passphrase' -n "Shop Owner"
//!
//! # Insert the showcase catalog, or a custom one
//! slick-cli seed
//! slick-cli seed --file catalog.yaml
//! ```
//!
//! All commands read `DATABASE_URL` (a `.env` file is honoured).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use slick_core::AdminRole;

mod commands;

#[derive(Parser)]
#[command(name = "slick-cli")]
#[command(author, version, about = "Slick CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Insert the product catalog, skipping slugs that already exist
    Seed {
        /// YAML catalog to load instead of the built-in showcase products
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Make an existing account an admin
    Grant {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Admin role (`super_admin`, `admin`, `moderator`)
        #[arg(short, long, default_value = "super_admin")]
        role: AdminRole,
    },
    /// Make the oldest account an admin
    GrantFirst {
        #[arg(short, long, default_value = "super_admin")]
        role: AdminRole,
    },
    /// Create an account and make it an admin
    Create {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long, default_value = "super_admin")]
        role: AdminRole,
    },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "slick_cli=info,slick_admin=info,sqlx=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Admin { action } => match action {
            AdminAction::Grant { email, role } => {
                commands::admin::grant(&pool, &email, role).await?;
            }
            AdminAction::GrantFirst { role } => {
                commands::admin::grant_first(&pool, role).await?;
            }
            AdminAction::Create {
                email,
                password,
                name,
                role,
            } => {
                commands::admin::create(&pool, &email, &password, name.as_deref(), role).await?;
            }
        },
        Commands::Seed { file } => {
            let catalog = match file {
                Some(path) => commands::seed::load_catalog(&path).await?,
                None => commands::seed::showcase_catalog(),
            };
            commands::seed::run(&pool, &catalog).await?;
        }
    }

    Ok(())
}
