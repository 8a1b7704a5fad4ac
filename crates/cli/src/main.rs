//! Menuhub CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! mh-cli migrate
//!
//! # Insert a demo company, store and menu
//! mh-cli seed
//!
//! # Create or update a user
//! mh-cli user create -k user_2abc -e owner@example.com -n "Ana Souza" -r owner
//!
//! # Change a user's role
//! mh-cli user role -k user_2abc -r super_admin
//! ```
//!
//! # Environment Variables
//!
//! - `MENUHUB_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mh-cli")]
#[command(author, version, about = "Menuhub CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert demo data
    Seed,
    /// Manage platform users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user, or update the one with the same key
    Create {
        /// Identity provider user key
        #[arg(short, long)]
        key: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Full name
        #[arg(short, long)]
        name: Option<String>,

        /// Role (`super_admin`, `owner`, `manager`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
    /// Change a user's role
    Role {
        /// Identity provider user key
        #[arg(short, long)]
        key: String,

        /// New role
        #[arg(short, long)]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::demo().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                key,
                email,
                name,
                role,
            } => {
                commands::user::create(&key, email.as_deref(), name.as_deref(), &role).await?;
            }
            UserAction::Role { key, role } => commands::user::set_role(&key, &role).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
