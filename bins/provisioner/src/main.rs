//! Chart of accounts maintenance for Coopledger.
//!
//! Usage:
//!   provisioner reindex --org <ID> --branch <ID> --actor <ID>
//!   provisioner insert-index --org <ID> --branch <ID> [--gl <TYPE>] --name <NAME>
//!   provisioner reconstruct --org <ID> --branch <ID> --account <ID> --as-of <RFC3339>
//!
//! Configuration comes from `config/default`, `config/{RUN_MODE}` and
//! `COOPLEDGER__*` environment variables.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use coopledger_core::account::GeneralLedgerType;
use coopledger_db::{LedgerStores, connect_with};
use coopledger_shared::AppConfig;
use coopledger_shared::config::LoggingConfig;
use coopledger_shared::types::{AccountId, BranchId, OrganizationId, UserId};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Chart of accounts maintenance commands.
#[derive(Parser, Debug)]
#[command(name = "provisioner", about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Renumber every account of a branch densely in chart order.
    Reindex {
        /// Organization id.
        #[arg(long)]
        org: Uuid,
        /// Branch id.
        #[arg(long)]
        branch: Uuid,
        /// User recorded on the account history.
        #[arg(long)]
        actor: Uuid,
    },
    /// Print the index a new account would take.
    InsertIndex {
        /// Organization id.
        #[arg(long)]
        org: Uuid,
        /// Branch id.
        #[arg(long)]
        branch: Uuid,
        /// General-ledger group; omit for unclassified accounts.
        #[arg(long, value_parser = parse_general_ledger_type)]
        gl: Option<GeneralLedgerType>,
        /// Name of the new account.
        #[arg(long)]
        name: String,
    },
    /// Print an account as it was at a point in time, as JSON.
    Reconstruct {
        /// Organization id.
        #[arg(long)]
        org: Uuid,
        /// Branch id.
        #[arg(long)]
        branch: Uuid,
        /// Account id.
        #[arg(long)]
        account: Uuid,
        /// Point in time (RFC 3339).
        #[arg(long)]
        as_of: DateTime<Utc>,
    },
}

fn parse_general_ledger_type(value: &str) -> Result<GeneralLedgerType, String> {
    value.parse()
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let fmt = if logging.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    tracing_subscriber::registry().with(filter).with(fmt).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");
    let stores = LedgerStores::new(db);

    match cli.command {
        Command::Reindex { org, branch, actor } => {
            let outcome = stores
                .index
                .reindex_all(
                    OrganizationId::from_uuid(org),
                    BranchId::from_uuid(branch),
                    UserId::from_uuid(actor),
                )
                .await?;
            println!(
                "Reindexed {} accounts ({} changed)",
                outcome.assignments.len(),
                outcome.changed()
            );
        }
        Command::InsertIndex {
            org,
            branch,
            gl,
            name,
        } => {
            let index = stores
                .index
                .compute_insert_index(
                    OrganizationId::from_uuid(org),
                    BranchId::from_uuid(branch),
                    gl,
                    &name,
                )
                .await?;
            println!("{index}");
        }
        Command::Reconstruct {
            org,
            branch,
            account,
            as_of,
        } => {
            let account = stores
                .history
                .reconstruct(
                    AccountId::from_uuid(account),
                    OrganizationId::from_uuid(org),
                    BranchId::from_uuid(branch),
                    as_of,
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_insert_index_without_group_is_unclassified() {
        let cli = Cli::try_parse_from([
            "provisioner",
            "insert-index",
            "--org",
            "00000000-0000-0000-0000-000000000001",
            "--branch",
            "00000000-0000-0000-0000-000000000002",
            "--name",
            "Suspense",
        ])
        .unwrap();
        match cli.command {
            Command::InsertIndex { gl, name, .. } => {
                assert_eq!(gl, None);
                assert_eq!(name, "Suspense");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_group_is_rejected() {
        let result = Cli::try_parse_from([
            "provisioner",
            "insert-index",
            "--org",
            "00000000-0000-0000-0000-000000000001",
            "--branch",
            "00000000-0000-0000-0000-000000000002",
            "--gl",
            "Goodwill",
            "--name",
            "Suspense",
        ]);
        assert!(result.is_err());
    }
}
