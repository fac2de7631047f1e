//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use catalog_core::config::DatabaseProvider;
use catalog_core::error::AppError;
use catalog_database::DatabasePool;
use catalog_database::migration::run_migrations;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;

    if config.database.provider != DatabaseProvider::Postgres {
        output::print_warning("The memory store has no schema; nothing to migrate.");
        return Ok(());
    }
    config.validate()?;

    match &args.command {
        MigrateCommand::Run => {
            let pool = DatabasePool::connect(&config.database).await?;
            println!("Running database migrations...");
            let result = run_migrations(pool.pool()).await;
            pool.close().await;
            result?;
            output::print_success("All migrations applied successfully.");
        }
    }

    Ok(())
}
