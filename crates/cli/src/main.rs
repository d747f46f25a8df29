//! SupplierDB CLI - Database migrations and tenant management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sdb-cli migrate
//!
//! # List tenants with their record counts
//! sdb-cli tenant list
//!
//! # Show the namespace a company name maps to
//! sdb-cli tenant derive "Acme Co."
//!
//! # Export a tenant's suppliers to a spreadsheet
//! sdb-cli tenant export acme-co -o acme-co-suppliers.xlsx
//! ```
//!
//! # Environment Variables
//!
//! - `SUPPLIERDB_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sdb-cli")]
#[command(author, version, about = "SupplierDB CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect and export tenants
    Tenant {
        #[command(subcommand)]
        action: TenantAction,
    },
}

#[derive(Subcommand)]
enum TenantAction {
    /// List every tenant namespace with its record count
    List,
    /// Print the namespace a company name derives to
    Derive {
        /// Company name as entered at signup
        company_name: String,
    },
    /// Export a tenant's distinct records as .xlsx
    Export {
        /// Tenant namespace
        namespace: String,

        /// Output file (default: `<namespace>-suppliers.xlsx`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Tenant { action } => match action {
            TenantAction::List => commands::tenant::list().await?,
            TenantAction::Derive { company_name } => commands::tenant::derive(&company_name)?,
            TenantAction::Export { namespace, output } => {
                commands::tenant::export(&namespace, output).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tenant_export() {
        let cli = Cli::try_parse_from(["sdb-cli", "tenant", "export", "acme-co", "-o", "out.xlsx"])
            .unwrap_or_else(|e| panic!("parse failed: {e}"));

        match cli.command {
            Commands::Tenant {
                action: TenantAction::Export { namespace, output },
            } => {
                assert_eq!(namespace, "acme-co");
                assert_eq!(output, Some(PathBuf::from("out.xlsx")));
            }
            _ => panic!("expected tenant export"),
        }
    }
}
