//! CLI command definitions and dispatch.

pub mod admin;
pub mod config;
pub mod migrate;
pub mod serve;
pub mod stats;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use catalog_core::config::AppConfig;
use catalog_core::error::AppError;
use catalog_database::Store;

/// Product catalog service
#[derive(Debug, Parser)]
#[command(name = "catalog", version, about, long_about = None)]
pub struct Cli {
    /// Environment overlay to load from `config/{env}`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Admin account management
    Admin(admin::AdminArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Print catalog inventory statistics
    Stats,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.env).await,
            Commands::Migrate(args) => migrate::execute(args, &self.env).await,
            Commands::Admin(args) => admin::execute(args, &self.env, self.format).await,
            Commands::Config(args) => config::execute(args, &self.env, self.format).await,
            Commands::Stats => stats::execute(&self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: load and validate configuration, then open the store
pub async fn open_store(env: &str) -> Result<(AppConfig, Store), AppError> {
    let config = load_config(env)?;
    config.validate()?;
    let store = Store::connect(&config.database).await?;
    Ok((config, store))
}
